//! Authentication Handlers Module
//!
//! HTTP handlers for the authentication endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs       - Module exports and documentation
//! ├── types.rs     - Request parsing and response types
//! ├── register.rs  - User registration handler
//! ├── login.rs     - User authentication handler
//! ├── refresh.rs   - Token refresh handler
//! └── me.rs        - Get current user handler
//! ```
//!
//! # Handlers
//!
//! - **`register`** - POST /api/register
//! - **`login`** - POST /api/login
//! - **`refresh_token`** - POST /api/token/refresh
//! - **`get_me`** - GET /api/users/me (token required)

/// Request and response types
pub mod types;

/// Register handler
pub mod register;

/// Login handler
pub mod login;

/// Token refresh handler
pub mod refresh;

/// Get current user handler
pub mod me;

pub use types::{LoginRequest, LoginResponse, RefreshRequest, RegisterResponse, UserResponse};

pub use register::register;
pub use login::login;
pub use refresh::refresh_token;
pub use me::get_me;
