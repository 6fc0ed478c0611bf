//! Shared Error Types
//!
//! Errors raised while validating user input before anything reaches the
//! backing store. The backend maps every variant to a `BAD_REQUEST`
//! response.
//!
//! # Usage
//!
//! ```rust
//! use activityhub::shared::error::SharedError;
//!
//! let error = SharedError::validation("email", "Invalid email format");
//! assert_eq!(error.to_string(), "Invalid email format");
//! ```
use thiserror::Error;

/// Validation failures shared by the local and external identity paths
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// A required field was absent or empty
    #[error("Missing required field: {field}")]
    MissingField {
        /// The field that was missing
        field: String,
    },

    /// A field was present but its value is not acceptable
    #[error("{message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// A role string that is not one of `child`, `parent`, `admin`
    #[error("Invalid role. Must be one of: child, parent, admin")]
    InvalidRole {
        /// The rejected value
        value: String,
    },
}

impl SharedError {
    /// Create a new missing-field error
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new invalid-role error
    pub fn invalid_role(value: impl Into<String>) -> Self {
        Self::InvalidRole {
            value: value.into(),
        }
    }

    /// The field this error refers to
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field } | Self::ValidationError { field, .. } => field,
            Self::InvalidRole { .. } => "role",
        }
    }
}
