/**
 * Router Configuration
 *
 * Combines the API routes, the JSON 404 fallback and the HTTP tracing
 * layer into a single Axum router.
 *
 * # Route Order
 *
 * 1. API routes (public, token-guarded and role-guarded)
 * 2. Fallback handlers (404 and 405 as JSON error payloads)
 */

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::backend::error::{ApiError, ErrorCategory};
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Unknown paths get the same error payload as every other failure
async fn not_found() -> ApiError {
    ApiError::from_category(ErrorCategory::NotFound)
}

/// Known path, unsupported method
async fn method_not_allowed() -> ApiError {
    ApiError::from_category(ErrorCategory::MethodNotAllowed)
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_api_routes(Router::new(), &app_state);

    let router = router
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TraceLayer::new_for_http());

    router.with_state(app_state)
}
