//! Server Module
//!
//! Initialization and configuration of the Axum HTTP server.
//!
//! # Architecture
//!
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`config`** - Opening the configured store backend
//! - **`init`** - Identity backend selection and app creation
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Store loading
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration**: `AppConfig` validated (secret present, provider ids set)
//! 2. **Store**: in-memory or SQLite, per `STORE_BACKEND`
//! 3. **Identity**: local password/JWT or the external provider, per `AUTH_BACKEND`
//! 4. **Router Creation**: routes, guards and tracing layer
//!
//! # Example
//!
//! ```rust,no_run
//! use activityhub::backend::server::create_app;
//! use activityhub::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(AppConfig::load()?).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Store loading
pub mod config;

/// Server initialization
pub mod init;

pub use state::AppState;
pub use init::{build_identity, build_state, create_app, InitError};
