/**
 * API Route Handlers
 *
 * # Routes
 *
 * ## Public
 * - `GET /api/hello` - Liveness
 * - `POST /api/register` - User registration
 * - `POST /api/login` - User login
 * - `POST /api/token/refresh` - Provider token refresh
 *
 * ## Token required
 * - `GET /api/users/me` - Own profile
 * - `GET /api/users/{id}` - Self, admin, or the user's parent
 * - `PUT /api/users/{id}` - Same access rule
 *
 * ## Role required
 * - `GET /api/users/children` - Parent level
 * - `DELETE /api/users/{id}` - Admin level
 *
 * `/api/users/me` and `/api/users/children` are static segments and win over
 * the `{id}` capture.
 */

use axum::{
    middleware::from_fn_with_state,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};

use crate::backend::auth::{get_me, login, refresh_token, register};
use crate::backend::middleware::{enforce_policy, AccessPolicy, PolicyState};
use crate::backend::server::state::AppState;
use crate::backend::users::{delete_user, get_children, get_user, update_user};

/// GET /api/hello
pub async fn hello() -> Json<Value> {
    Json(json!({
        "message": "Hello World from ActivityHub API!",
        "status": "success",
    }))
}

/// Configure API routes
///
/// Each protected route carries its own access policy as a route layer, so
/// unmatched methods fall through to the JSON `405` without touching the token.
pub fn configure_api_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    let guarded = |policy: AccessPolicy| {
        from_fn_with_state(PolicyState::new(app_state, policy), enforce_policy)
    };

    router
        .route("/api/hello", get(hello))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/token/refresh", post(refresh_token))
        .route(
            "/api/users/me",
            get(get_me).route_layer(guarded(AccessPolicy::token_required())),
        )
        .route(
            "/api/users/children",
            get(get_children).route_layer(guarded(AccessPolicy::parent_level())),
        )
        .route(
            "/api/users/{id}",
            get(get_user)
                .put(update_user)
                .route_layer(guarded(AccessPolicy::token_required()))
                .merge(delete(delete_user).route_layer(guarded(AccessPolicy::admin_level()))),
        )
}
