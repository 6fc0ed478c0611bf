//! Backend Error Module
//!
//! This module defines the error type returned by every HTTP handler and
//! guard. Errors are grouped into five categories, each with a fixed status
//! code and a default client-facing message.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - ApiError and ErrorCategory
//! └── conversion.rs - IntoResponse and conversions from component errors
//! ```
//!
//! # Response Format
//!
//! ```json
//! {
//!   "error": "UNAUTHORIZED",
//!   "message": "Invalid or expired token",
//!   "statusCode": 401
//! }
//! ```
//!
//! Server errors never expose their detail to the client; the detail is
//! logged with `tracing::error!` when the error is constructed.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use conversion::ErrorBody;
pub use types::{ApiError, ErrorCategory};
