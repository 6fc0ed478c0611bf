//! Backend Module
//!
//! This module contains all server-side code for ActivityHub. It provides an
//! Axum HTTP server for registration, login and parent/child profile
//! management, backed by either the local password/JWT scheme or a managed
//! identity provider.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Server initialization, application state, store loading
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`auth`** - Password hashing, session tokens, identity backends, auth handlers
//! - **`middleware`** - Access guards and the identity extractor
//! - **`users`** - Profile handlers (`/api/users/...`)
//! - **`directory`** - User records over the key-value store
//! - **`store`** - Key-value store trait with memory and SQLite backends
//! - **`error`** - `ApiError` and its JSON response
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication
//! ├── middleware/     - Guards
//! ├── users/          - Profile handlers
//! ├── directory/      - User directory
//! ├── store/          - Persistence
//! └── error/          - Error types
//! ```
//!
//! # Request Flow
//!
//! request → access policy (token + role guards) → handler →
//! identity backend / user directory → response. Every failure branch is an
//! [`ApiError`] rendered as `{error, message, statusCode}`.
//!
//! This module is only compiled when the `ssr` feature is enabled.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Authentication and identity backends
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Profile handlers
pub mod users;

/// User directory over the key-value store
pub mod directory;

/// Key-value persistence
pub mod store;

/// Re-export commonly used types
pub use server::create_app;
pub use error::ApiError;
