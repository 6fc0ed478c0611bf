/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct holds:
 * - The configured identity backend (local or external provider)
 * - The user directory over the configured key-value store
 * - Request validation settings
 *
 * Everything inside is cheap to clone: the backend sits behind an `Arc` and
 * the directory only holds `Arc`s to its store and clock.
 *
 * # Example
 *
 * ```rust,ignore
 * use activityhub::backend::server::state::AppState;
 * use axum::extract::State;
 *
 * async fn handler(State(state): State<AppState>) {
 *     let children = state.directory.children_of("parent-id").await;
 * }
 * ```
 */

use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::auth::identity::IdentityBackend;
use crate::backend::directory::UserDirectory;

/// Application state shared by every handler and guard
#[derive(Debug, Clone)]
pub struct AppState {
    /// Register/login/refresh and bearer token verification
    pub identity: Arc<dyn IdentityBackend>,

    /// Profile and relationship records
    pub directory: UserDirectory,

    /// Minimum accepted password length at registration
    pub password_min_length: usize,
}

impl AppState {
    pub fn new(
        identity: Arc<dyn IdentityBackend>,
        directory: UserDirectory,
        password_min_length: usize,
    ) -> Self {
        Self {
            identity,
            directory,
            password_min_length,
        }
    }
}

impl FromRef<AppState> for Arc<dyn IdentityBackend> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.identity)
    }
}

impl FromRef<AppState> for UserDirectory {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.directory.clone()
    }
}
