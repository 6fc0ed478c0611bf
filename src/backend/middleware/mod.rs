//! Middleware Module
//!
//! This module contains the HTTP middleware for the backend server.
//! Middleware functions process requests before they reach handlers.
//!
//! # Architecture
//!
//! - **`guard`** - Access policies: ordered token and role checks
//! - **`auth`** - The axum middleware that enforces a policy and the
//!   `IdentityContext` extractor
//!
//! # Example
//!
//! ```rust,ignore
//! use activityhub::backend::middleware::{enforce_policy, AccessPolicy, PolicyState};
//! use axum::middleware::from_fn_with_state;
//!
//! let children = get(get_children).route_layer(from_fn_with_state(
//!     PolicyState::new(&state, AccessPolicy::parent_level()),
//!     enforce_policy,
//! ));
//! ```

pub mod guard;
pub mod auth;

pub use guard::{bearer_token, AccessPolicy, Guard, RoleSet};
pub use auth::{enforce_policy, PolicyState};
