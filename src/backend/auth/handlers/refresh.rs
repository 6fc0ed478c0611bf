/**
 * Token Refresh Handler
 *
 * POST /api/token/refresh with `{refresh_token}`. Only the external
 * identity backend supports refresh; the local backend answers 400.
 */
use axum::{extract::State, response::Json};
use std::sync::Arc;

use crate::backend::auth::handlers::types::{RefreshRequest, RefreshResponse};
use crate::backend::auth::identity::IdentityBackend;
use crate::backend::error::ApiError;
use crate::backend::routes::extract::JsonObject;

pub async fn refresh_token(
    State(identity): State<Arc<dyn IdentityBackend>>,
    JsonObject(body): JsonObject,
) -> Result<Json<RefreshResponse>, ApiError> {
    let request = RefreshRequest::from_json(&body)?;
    let tokens = identity.refresh(&request.refresh_token).await?;
    tracing::info!(backend = identity.name(), "tokens refreshed");
    Ok(Json(RefreshResponse {
        message: "Token refreshed successfully",
        tokens,
    }))
}
