/**
 * Authentication Handler Types
 *
 * Request parsing and response bodies shared by the register, login,
 * refresh and me handlers.
 */

use serde::Serialize;
use serde_json::{Map, Value};

use crate::backend::auth::external::ProviderTokens;
use crate::backend::auth::identity::LoginOutcome;
use crate::backend::auth::service::required_str;
use crate::shared::{SharedError, UserProfile};

/// Login request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_json(body: &Map<String, Value>) -> Result<Self, SharedError> {
        Ok(Self {
            email: required_str(body, "email")?.trim().to_lowercase(),
            password: required_str(body, "password")?.to_string(),
        })
    }
}

/// Token refresh request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl RefreshRequest {
    pub fn from_json(body: &Map<String, Value>) -> Result<Self, SharedError> {
        Ok(Self {
            refresh_token: required_str(body, "refresh_token")?.trim().to_string(),
        })
    }
}

/// `201` body of a successful registration
#[derive(Serialize, Debug)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: UserProfile,
}

/// Login response: `{message, user, token, tokens?}`
#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub outcome: LoginOutcome,
}

#[derive(Serialize, Debug)]
pub struct RefreshResponse {
    pub message: &'static str,
    pub tokens: ProviderTokens,
}

/// `{user}`
#[derive(Serialize, Debug)]
pub struct UserResponse {
    pub user: UserProfile,
}
