//! Authentication Module
//!
//! Password hashing, session tokens, external provider integration and the
//! HTTP handlers for registration, login and token refresh.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── password.rs     - Salted SHA-256 password hashing
//! ├── sessions.rs     - HS256 session token issue/validate
//! ├── external/       - JWKS cache, token verifier, provider client
//! ├── service.rs      - Registration validation, local login
//! ├── identity.rs     - IdentityBackend trait (local / cognito)
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Register**: fields validated → backend creates the account → profile returned
//! 2. **Login**: credentials checked by the backend → bearer token returned
//! 3. **Protected routes**: a guard verifies the bearer token with the same
//!    backend and attaches the caller's identity to the request
//!
//! # Security
//!
//! - Local password hashes are `salt$hex(sha256(salt || password))`,
//!   compared in constant time
//! - Unknown user and wrong password are indistinguishable to the client
//! - External tokens are accepted only after every claim check and the RSA
//!   signature have passed

/// Password hashing
pub mod password;

/// Session token issue and validation
pub mod sessions;

/// Managed identity provider integration
pub mod external;

/// Registration validation and the local user service
pub mod service;

/// Identity backends
pub mod identity;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use identity::{CognitoIdentity, IdentityBackend, IdentityContext, LocalIdentity, LoginOutcome};
pub use service::{Registration, UserService};
pub use sessions::{Claims, TokenError, TokenIssuer};
pub use handlers::{get_me, login, refresh_token, register};
