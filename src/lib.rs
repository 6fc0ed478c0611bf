//! ActivityHub - Main Library
//!
//! ActivityHub is the backend of a family activity-tracking application.
//! Parents register, create child accounts, and manage their children's
//! profiles; every protected endpoint is gated by a bearer token.
//!
//! # Module Structure
//!
//! - **`shared`** - Types that do not depend on the server stack
//!   - User profiles, roles, update field table
//!   - Configuration loading
//!   - Clock abstraction
//!   - Validation error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server, routes and access guards
//!   - Password hashing and session tokens
//!   - External identity provider verification (JWKS)
//!   - User directory over a key-value store
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - enables the backend modules and the
//!   `activityhub-server` binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use activityhub::backend::server::init::create_app;
//! use activityhub::shared::config::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let app = create_app(config).await?;
//! // Serve `app` with axum::serve
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
