//! User Model
//!
//! Identity records for parents, children and administrators, the public
//! projection returned to clients, and the table of fields a profile update
//! is allowed to touch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::shared::error::SharedError;

/// User role
///
/// Roles are ordered: `Child < Parent < Admin`. Guards that accept a role
/// also accept every role above it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Child,
    Parent,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Child, Role::Parent, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Child => "child",
            Role::Parent => "parent",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SharedError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "child" => Ok(Role::Child),
            "parent" => Ok(Role::Parent),
            "admin" => Ok(Role::Admin),
            other => Err(SharedError::invalid_role(other)),
        }
    }
}

/// Full user record as stored, including credential material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    /// Always lower-cased
    pub email: String,
    pub name: String,
    pub role: Role,
    /// `salt$digest`; `None` for users managed by the external identity provider
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Present iff `role == Child`
    pub parent_id: Option<String>,
}

impl User {
    /// Public projection without credential material
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            user_id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            parent_id: self.parent_id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn into_profile(self) -> UserProfile {
        UserProfile {
            user_id: self.id,
            email: self.email,
            name: self.name,
            role: self.role,
            parent_id: self.parent_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// User profile safe to return to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

/// Input to the user directory's create operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Caller-supplied id (external provider subject); generated when `None`
    pub id: Option<String>,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password_hash: Option<String>,
    pub parent_id: Option<String>,
}

/// Profile fields that may change after creation.
///
/// Identity, email, credential material and creation time are immutable;
/// anything not listed here is ignored by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdatableField {
    Name,
}

impl UpdatableField {
    pub const ALL: [UpdatableField; 1] = [UpdatableField::Name];

    /// Field name as it appears in request bodies
    pub fn api_name(self) -> &'static str {
        match self {
            UpdatableField::Name => "name",
        }
    }

    /// Attribute name in the stored record
    pub fn attribute(self) -> &'static str {
        match self {
            UpdatableField::Name => "Name",
        }
    }

    pub fn from_api_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.api_name() == name)
    }
}

/// A partial profile update
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
}

impl UserUpdate {
    /// Build an update from a JSON object, keeping only allow-listed fields.
    ///
    /// Unknown keys are ignored. A listed key with a non-string or blank
    /// value is a validation error.
    pub fn from_json(body: &Map<String, Value>) -> Result<Self, SharedError> {
        let mut update = UserUpdate::default();
        for (key, value) in body {
            let Some(field) = UpdatableField::from_api_name(key) else {
                continue;
            };
            let text = value
                .as_str()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .ok_or_else(|| {
                    SharedError::validation(key.clone(), format!("Field '{key}' must be a non-empty string"))
                })?;
            match field {
                UpdatableField::Name => update.name = Some(text.to_string()),
            }
        }
        Ok(update)
    }

    /// The effective changes as `(field, value)` pairs
    pub fn changes(&self) -> Vec<(UpdatableField, Value)> {
        UpdatableField::ALL
            .into_iter()
            .filter_map(|field| match field {
                UpdatableField::Name => self
                    .name
                    .as_ref()
                    .map(|name| (field, Value::String(name.clone()))),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.changes().is_empty()
    }
}
