/**
 * Register Handler
 *
 * POST /api/register
 *
 * # Registration Process
 *
 * 1. Reject an empty body
 * 2. Validate fields (required, email format, password length, role, parent)
 * 3. Hand the registration to the configured identity backend
 * 4. Return the created profile with `201 Created`
 */
use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::auth::handlers::types::RegisterResponse;
use crate::backend::auth::service::Registration;
use crate::backend::error::ApiError;
use crate::backend::routes::extract::JsonObject;
use crate::backend::server::state::AppState;

/// Register handler
///
/// # Errors
///
/// * `400 Bad Request` - Invalid body, failed validation, duplicate email or
///   unknown parent
/// * `500 Internal Server Error` - Store or identity provider failure
///
/// # Example Request
///
/// ```http
/// POST /api/register HTTP/1.1
/// Content-Type: application/json
///
/// {
///   "email": "kid@example.com",
///   "name": "Kid",
///   "password": "password123",
///   "role": "child",
///   "parent_id": "6f1c..."
/// }
/// ```
pub async fn register(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    if body.is_empty() {
        return Err(ApiError::bad_request("Invalid JSON data"));
    }
    let registration = Registration::from_json(&body, state.password_min_length)?;
    tracing::info!(
        email = %registration.email,
        role = %registration.role,
        backend = state.identity.name(),
        "registration request"
    );

    let user = state.identity.register(registration).await?;
    tracing::info!(user_id = %user.user_id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            user,
        }),
    ))
}
