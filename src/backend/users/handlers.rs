/**
 * User Handlers
 *
 * Profile read/update/delete and the parent's child listing. Per-user
 * routes admit the user themself, an admin, or the user's own parent.
 */

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Serialize;

use crate::backend::auth::handlers::types::UserResponse;
use crate::backend::auth::identity::IdentityContext;
use crate::backend::directory::UserDirectory;
use crate::backend::error::ApiError;
use crate::backend::routes::extract::JsonObject;
use crate::shared::{Role, UserProfile, UserUpdate};

#[derive(Serialize, Debug)]
pub struct ChildrenResponse {
    pub children: Vec<UserProfile>,
}

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Serialize, Debug)]
pub struct UpdateResponse {
    pub message: &'static str,
    pub user: UserProfile,
}

/// What the caller wants to do with someone's profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileAccess {
    Read,
    Update,
}

impl ProfileAccess {
    fn denied_message(self) -> &'static str {
        match self {
            ProfileAccess::Read => "You do not have permission to access this user's profile",
            ProfileAccess::Update => "You do not have permission to update this user's profile",
        }
    }
}

/// Self, admin, or the target's own parent
pub async fn authorize_profile_access(
    directory: &UserDirectory,
    caller: &IdentityContext,
    target_id: &str,
    access: ProfileAccess,
) -> Result<(), ApiError> {
    if caller.subject == target_id || caller.role == Role::Admin {
        return Ok(());
    }
    if caller.role == Role::Parent && directory.is_parent_of(&caller.subject, target_id).await? {
        return Ok(());
    }
    tracing::warn!(
        subject = %caller.subject,
        role = %caller.role,
        target = %target_id,
        ?access,
        "profile access denied"
    );
    Err(ApiError::forbidden(access.denied_message()))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(directory): State<UserDirectory>,
    caller: IdentityContext,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    authorize_profile_access(&directory, &caller, &user_id, ProfileAccess::Read).await?;
    let user = directory
        .get_by_id(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(UserResponse { user }))
}

/// PUT /api/users/{id}
///
/// Only allow-listed fields are applied; anything else in the body is
/// ignored. The body is only inspected once the caller may update the
/// profile.
pub async fn update_user(
    State(directory): State<UserDirectory>,
    caller: IdentityContext,
    Path(user_id): Path<String>,
    body: Result<JsonObject, ApiError>,
) -> Result<Json<UpdateResponse>, ApiError> {
    authorize_profile_access(&directory, &caller, &user_id, ProfileAccess::Update).await?;
    let JsonObject(body) = body?;
    if body.is_empty() {
        return Err(ApiError::bad_request("No data provided for update"));
    }

    let update = UserUpdate::from_json(&body)?;
    let user = directory
        .update(&user_id, &update)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found or no valid updates provided"))?;
    tracing::info!(user_id = %user.user_id, by = %caller.subject, "profile updated");

    Ok(Json(UpdateResponse {
        message: "User profile updated successfully",
        user,
    }))
}

/// DELETE /api/users/{id}, admin only
///
/// Removes the profile; relationship records stay behind.
pub async fn delete_user(
    State(directory): State<UserDirectory>,
    caller: IdentityContext,
    Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !directory.delete(&user_id).await? {
        return Err(ApiError::not_found("User not found"));
    }
    tracing::info!(user_id = %user_id, by = %caller.subject, "user deleted");
    Ok(Json(MessageResponse {
        message: "User deleted successfully",
    }))
}

/// GET /api/users/children, parent level
pub async fn get_children(
    State(directory): State<UserDirectory>,
    caller: IdentityContext,
) -> Result<Json<ChildrenResponse>, ApiError> {
    let children = directory.children_of(&caller.subject).await?;
    tracing::debug!(parent = %caller.subject, count = children.len(), "listed children");
    Ok(Json(ChildrenResponse { children }))
}
