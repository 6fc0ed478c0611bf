/**
 * Get Current User Handler
 *
 * GET /api/users/me, behind the token guard. Returns the caller's own
 * profile without credential material.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::UserResponse;
use crate::backend::auth::identity::IdentityContext;
use crate::backend::directory::UserDirectory;
use crate::backend::error::ApiError;

/// # Errors
///
/// * `401 Unauthorized` - No identity context (the route is unguarded)
/// * `404 Not Found` - The token is valid but the profile is gone
pub async fn get_me(
    State(directory): State<UserDirectory>,
    caller: IdentityContext,
) -> Result<Json<UserResponse>, ApiError> {
    let user = directory.get_by_id(&caller.subject).await?.ok_or_else(|| {
        tracing::warn!(subject = %caller.subject, "token subject has no profile");
        ApiError::not_found("User not found")
    })?;
    Ok(Json(UserResponse { user }))
}
