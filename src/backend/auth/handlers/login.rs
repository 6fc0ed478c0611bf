/**
 * Login Handler
 *
 * POST /api/login
 *
 * Unknown email and wrong password produce the same
 * `401 Invalid email or password` so the endpoint cannot be used to probe
 * which accounts exist.
 */
use axum::{extract::State, response::Json};
use std::sync::Arc;

use crate::backend::auth::handlers::types::{LoginRequest, LoginResponse};
use crate::backend::auth::identity::IdentityBackend;
use crate::backend::error::ApiError;
use crate::backend::routes::extract::JsonObject;

/// Login handler
///
/// # Example Response
///
/// ```json
/// {
///   "message": "Login successful",
///   "token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
///   "user": { "user_id": "6f1c...", "email": "pat@example.com", "role": "parent", ... }
/// }
/// ```
///
/// With the external identity backend the body also carries `tokens`
/// (`access_token`, `id_token`, `refresh_token`, `expires_in`).
pub async fn login(
    State(identity): State<Arc<dyn IdentityBackend>>,
    JsonObject(body): JsonObject,
) -> Result<Json<LoginResponse>, ApiError> {
    let request = LoginRequest::from_json(&body)?;
    tracing::info!(email = %request.email, "login request");

    let outcome = identity.login(&request.email, &request.password).await?;
    Ok(Json(LoginResponse {
        message: "Login successful",
        outcome,
    }))
}
