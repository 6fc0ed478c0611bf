//! Shared Module
//!
//! This module contains types that are independent of the HTTP stack:
//! the user model, configuration, the clock abstraction and validation
//! errors. Everything here compiles without the `ssr` feature.

/// User model, roles and the updatable field table
pub mod user;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Wall-clock abstraction
pub mod clock;

/// Re-export commonly used types for convenience
pub use user::{NewUser, Role, UpdatableField, User, UserProfile, UserUpdate};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use clock::{Clock, ManualClock, SystemClock};
