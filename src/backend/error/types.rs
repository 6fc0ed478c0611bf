/**
 * API Error Types
 *
 * This module defines the error returned by handlers and guards.
 *
 * # Error Categories
 *
 * - `BAD_REQUEST` (400) - validation failures, malformed bodies
 * - `UNAUTHORIZED` (401) - missing, invalid or expired credentials
 * - `FORBIDDEN` (403) - authenticated but not allowed
 * - `NOT_FOUND` (404) - absent resources and unknown routes
 * - `METHOD_NOT_ALLOWED` (405) - known route, unsupported method
 * - `SERVER_ERROR` (500) - store or identity provider failures
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

/// The error categories exposed to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    ServerError,
}

impl ErrorCategory {
    /// Machine-readable code placed in the `error` field
    pub fn code(self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::ServerError => "SERVER_ERROR",
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message used when the caller has nothing more specific to say
    pub fn default_message(self) -> &'static str {
        match self {
            Self::BadRequest => "Invalid request data",
            Self::Unauthorized => "Authentication required",
            Self::Forbidden => "You do not have permission to perform this action",
            Self::NotFound => "Resource not found",
            Self::MethodNotAllowed => "Method not allowed for this resource",
            Self::ServerError => "An unexpected error occurred",
        }
    }
}

/// Error returned by HTTP handlers and access guards
///
/// Each variant carries the message shown to the client. `ServerError`
/// additionally carries an internal detail that is logged but never sent.
///
/// # Usage
///
/// ```rust
/// use activityhub::backend::error::ApiError;
///
/// let err = ApiError::unauthorized("Invalid email or password");
/// assert_eq!(err.status_code().as_u16(), 401);
/// ```
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    MethodNotAllowed { message: String },

    /// Store or identity provider failure
    #[error("{message}: {detail}")]
    ServerError {
        /// Client-facing message
        message: String,
        /// Internal detail, logged only
        detail: String,
    },

    /// Validation error from the shared module
    #[error(transparent)]
    Shared(#[from] SharedError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a server error and log its detail
    pub fn server(message: impl Into<String>, detail: impl ToString) -> Self {
        let message = message.into();
        let detail = detail.to_string();
        tracing::error!(%message, %detail, "server error");
        Self::ServerError { message, detail }
    }

    /// An error of the given category carrying its default message
    pub fn from_category(category: ErrorCategory) -> Self {
        let message = category.default_message();
        match category {
            ErrorCategory::BadRequest => Self::bad_request(message),
            ErrorCategory::Unauthorized => Self::unauthorized(message),
            ErrorCategory::Forbidden => Self::forbidden(message),
            ErrorCategory::NotFound => Self::not_found(message),
            ErrorCategory::MethodNotAllowed => Self::MethodNotAllowed {
                message: message.to_string(),
            },
            ErrorCategory::ServerError => Self::server(message, "unspecified"),
        }
    }

    /// The single outcome callers see for any rejected token
    pub fn invalid_token() -> Self {
        Self::unauthorized("Invalid or expired token")
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::BadRequest { .. } | Self::Shared(_) => ErrorCategory::BadRequest,
            Self::Unauthorized { .. } => ErrorCategory::Unauthorized,
            Self::Forbidden { .. } => ErrorCategory::Forbidden,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::MethodNotAllowed { .. } => ErrorCategory::MethodNotAllowed,
            Self::ServerError { .. } => ErrorCategory::ServerError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.category().status()
    }

    /// The client-facing message
    pub fn message(&self) -> String {
        match self {
            Self::BadRequest { message }
            | Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::NotFound { message }
            | Self::MethodNotAllowed { message }
            | Self::ServerError { message, .. } => message.clone(),
            Self::Shared(err) => err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_table() {
        let cases = [
            (ErrorCategory::BadRequest, 400, "BAD_REQUEST"),
            (ErrorCategory::Unauthorized, 401, "UNAUTHORIZED"),
            (ErrorCategory::Forbidden, 403, "FORBIDDEN"),
            (ErrorCategory::NotFound, 404, "NOT_FOUND"),
            (ErrorCategory::MethodNotAllowed, 405, "METHOD_NOT_ALLOWED"),
            (ErrorCategory::ServerError, 500, "SERVER_ERROR"),
        ];
        for (category, status, code) in cases {
            assert_eq!(category.status().as_u16(), status);
            assert_eq!(category.code(), code);
        }
    }

    #[test]
    fn test_default_messages() {
        let error = ApiError::from_category(ErrorCategory::Forbidden);
        assert_eq!(
            error.message(),
            "You do not have permission to perform this action"
        );
        let error = ApiError::from_category(ErrorCategory::ServerError);
        assert_eq!(error.message(), "An unexpected error occurred");
    }

    #[test]
    fn test_server_error_hides_detail() {
        let error = ApiError::server("Error registering user", "connection reset");
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message(), "Error registering user");
        assert!(error.to_string().contains("connection reset"));
    }

    #[test]
    fn test_from_shared_error() {
        let error: ApiError = SharedError::missing("email").into();
        assert_eq!(error.category(), ErrorCategory::BadRequest);
        assert_eq!(error.message(), "Missing required field: email");
    }
}
