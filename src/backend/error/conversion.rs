/**
 * Error Conversion
 *
 * `IntoResponse` for `ApiError`, plus conversions from the store, directory
 * and request-body errors so handlers can use `?` throughout.
 */

use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::backend::directory::DirectoryError;
use crate::backend::error::types::{ApiError, ErrorCategory};
use crate::backend::store::StoreError;

/// JSON error payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl From<&ApiError> for ErrorBody {
    fn from(error: &ApiError) -> Self {
        let category = error.category();
        Self {
            error: category.code().to_string(),
            message: error.message(),
            status_code: category.status().as_u16(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody::from(&self);
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<DirectoryError> for ApiError {
    fn from(error: DirectoryError) -> Self {
        match error {
            DirectoryError::EmailTaken => Self::bad_request("User with this email already exists"),
            DirectoryError::MissingParent => {
                Self::bad_request("Parent ID is required for child users")
            }
            DirectoryError::Store(source) => source.into(),
            DirectoryError::Corrupt { .. } => {
                Self::server(ErrorCategory::ServerError.default_message(), error)
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        Self::server("Database operation failed", error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(%rejection, "rejected request body");
        Self::bad_request("Invalid JSON data")
    }
}
