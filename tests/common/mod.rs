//! Common test utilities and helpers
//!
//! - In-process app harness
//! - Registration/login helpers
//! - Error response assertions

#![allow(dead_code)]

pub mod assertions;
pub mod auth_helpers;
pub mod test_app;

pub use assertions::*;
pub use auth_helpers::*;
pub use test_app::*;
