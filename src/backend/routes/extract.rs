/**
 * Request Body Extraction
 *
 * Handlers validate fields themselves so each failure carries its own
 * message, so bodies are taken as a raw JSON object rather than a typed
 * struct.
 */

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde_json::{Map, Value};

use crate::backend::error::ApiError;

const INVALID_JSON: &str = "Invalid JSON data";

/// A JSON object request body; anything else is `400 Invalid JSON data`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonObject(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(request, state).await?;
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ApiError::bad_request(INVALID_JSON)),
        }
    }
}
