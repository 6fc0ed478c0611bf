/**
 * Authentication Middleware
 *
 * Installs an `AccessPolicy` in front of a route group. The bearer token is
 * read from the `Authorization` header, checked by the configured identity
 * backend, and the resulting `IdentityContext` is attached to the request
 * extensions for handlers to extract.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::backend::auth::identity::{IdentityBackend, IdentityContext};
use crate::backend::error::{ApiError, ErrorCategory};
use crate::backend::middleware::guard::AccessPolicy;
use crate::backend::server::state::AppState;

/// Middleware state: the policy to enforce and who verifies tokens
#[derive(Debug, Clone)]
pub struct PolicyState {
    identity: Arc<dyn IdentityBackend>,
    policy: Arc<AccessPolicy>,
}

impl PolicyState {
    pub fn new(app_state: &AppState, policy: AccessPolicy) -> Self {
        Self {
            identity: Arc::clone(&app_state.identity),
            policy: Arc::new(policy),
        }
    }
}

/// Policy middleware
///
/// Use with `axum::middleware::from_fn_with_state(PolicyState, enforce_policy)`.
/// Responds with the guard's error and never reaches the handler when any
/// guard fails.
pub async fn enforce_policy(
    State(state): State<PolicyState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let context = state
        .policy
        .evaluate(authorization, state.identity.as_ref())
        .await?;

    if let Some(context) = context {
        tracing::debug!(subject = %context.subject, role = %context.role, "request authorized");
        request.extensions_mut().insert(context);
    }
    Ok(next.run(request).await)
}

/// Handlers behind a token guard take `IdentityContext` as an argument
impl<S> FromRequestParts<S> for IdentityContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IdentityContext>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("IdentityContext not found in request extensions");
                ApiError::from_category(ErrorCategory::Unauthorized)
            })
    }
}
