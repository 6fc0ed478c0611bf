//! Users Module
//!
//! HTTP handlers for profile management and the parent/child listing.
//! Storage lives in `backend::directory`; these handlers add the access
//! rules and response shapes.

pub mod handlers;

pub use handlers::{
    authorize_profile_access, delete_user, get_children, get_user, update_user, ProfileAccess,
};
