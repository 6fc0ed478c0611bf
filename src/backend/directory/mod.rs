//! User Directory
//!
//! User profiles and parent/child relationships over a [`KeyValueStore`].
//!
//! Email uniqueness is enforced by the store: a profile is written with
//! [`PutCondition::IfIndexKeyAbsent`] on its email index key, so two racing
//! registrations for the same address cannot both succeed.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

use crate::backend::store::{Attributes, Item, KeyValueStore, PutCondition, StoreError};
use crate::shared::{Clock, NewUser, Role, User, UserProfile, UserUpdate};

/// Key layout and record conversions
pub mod records;

use records::{attr, PROFILE_SK};

/// Directory errors
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Another profile already owns this email
    #[error("email already registered")]
    EmailTaken,

    /// A child was created without a parent
    #[error("child user without parent id")]
    MissingParent,

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A stored record could not be decoded
    #[error("corrupt record {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct UserDirectory {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Stored timestamps have second precision
    fn now(&self) -> DateTime<Utc> {
        let now = self.clock.now();
        DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
    }

    /// Create a profile, and for children the edge from their parent
    pub async fn create_user(&self, new_user: NewUser) -> Result<UserProfile, DirectoryError> {
        let parent_id = new_user.parent_id.filter(|id| !id.trim().is_empty());
        if new_user.role == Role::Child && parent_id.is_none() {
            return Err(DirectoryError::MissingParent);
        }

        let now = self.now();
        let user = User {
            id: new_user
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            email: new_user.email.trim().to_lowercase(),
            name: new_user.name,
            role: new_user.role,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
            // Only children keep a parent link
            parent_id: parent_id.filter(|_| new_user.role == Role::Child),
        };

        match self
            .store
            .put(records::profile_item(&user), PutCondition::IfIndexKeyAbsent)
            .await
        {
            Ok(()) => {}
            Err(StoreError::ConditionFailed) => {
                tracing::warn!(email = %user.email, "registration rejected: email already registered");
                return Err(DirectoryError::EmailTaken);
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to write user profile");
                return Err(err.into());
            }
        }

        if let Some(parent_id) = &user.parent_id {
            let edge = records::edge_item(parent_id, &user.id, now);
            if let Err(err) = self.store.put(edge, PutCondition::Overwrite).await {
                tracing::error!(error = %err, %parent_id, child_id = %user.id, "failed to write parent edge");
                if let Err(rollback) = self.store.delete(&records::user_pk(&user.id), PROFILE_SK).await {
                    tracing::error!(error = %rollback, child_id = %user.id, "failed to roll back child profile");
                }
                return Err(err.into());
            }
        }

        tracing::info!(user_id = %user.id, role = %user.role, "user created");
        Ok(user.into_profile())
    }

    async fn load_user(&self, id: &str) -> Result<Option<User>, DirectoryError> {
        let pk = records::user_pk(id);
        let item = self.store.get(&pk, PROFILE_SK).await.map_err(|err| {
            tracing::error!(error = %err, user_id = id, "failed to read user profile");
            err
        })?;
        item.map(|item| decode(&item)).transpose()
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<UserProfile>, DirectoryError> {
        Ok(self.load_user(id).await?.map(User::into_profile))
    }

    /// Full record including credential material; case-insensitive
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        let items = self
            .store
            .query_index(&records::email_index_key(email.trim()))
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "failed to query email index");
                err
            })?;
        items
            .iter()
            .find(|item| records::is_profile(item))
            .map(decode)
            .transpose()
    }

    pub async fn get_profile_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserProfile>, DirectoryError> {
        Ok(self.get_by_email(email).await?.map(User::into_profile))
    }

    /// Apply an allow-listed update; `None` if the user is unknown or nothing changes
    pub async fn update(
        &self,
        id: &str,
        update: &UserUpdate,
    ) -> Result<Option<UserProfile>, DirectoryError> {
        let changes = update.changes();
        if changes.is_empty() {
            return Ok(None);
        }

        let mut attributes: Attributes = changes
            .into_iter()
            .map(|(field, value)| (field.attribute().to_string(), value))
            .collect();
        attributes.insert(attr::UPDATED_AT.to_string(), self.now().timestamp().into());

        let updated = self
            .store
            .update_attributes(&records::user_pk(id), PROFILE_SK, attributes)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, user_id = id, "failed to update user profile");
                err
            })?;
        updated
            .map(|item| decode(&item).map(User::into_profile))
            .transpose()
    }

    /// Remove a profile. Relationship edges are left in place.
    pub async fn delete(&self, id: &str) -> Result<bool, DirectoryError> {
        let removed = self
            .store
            .delete(&records::user_pk(id), PROFILE_SK)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, user_id = id, "failed to delete user profile");
                err
            })?;
        if removed {
            tracing::info!(user_id = id, "user deleted");
        }
        Ok(removed)
    }

    /// Profiles of every child linked to `parent_id`; dangling edges are skipped
    pub async fn children_of(&self, parent_id: &str) -> Result<Vec<UserProfile>, DirectoryError> {
        let edges = self
            .store
            .query_prefix(&records::user_pk(parent_id), records::CHILD_PREFIX)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, parent_id, "failed to query children");
                err
            })?;

        let mut children = Vec::with_capacity(edges.len());
        for edge in &edges {
            let Some(child_id) = records::edge_child_id(edge) else {
                continue;
            };
            match self.get_by_id(child_id).await? {
                Some(child) => children.push(child),
                None => tracing::debug!(parent_id, child_id, "skipping dangling child edge"),
            }
        }
        Ok(children)
    }

    pub async fn is_parent_of(&self, parent_id: &str, child_id: &str) -> Result<bool, DirectoryError> {
        let edge = self
            .store
            .get(&records::user_pk(parent_id), &records::child_sk(child_id))
            .await?;
        Ok(edge.is_some())
    }
}

fn decode(item: &Item) -> Result<User, DirectoryError> {
    records::user_from_item(item).map_err(|reason| {
        tracing::error!(pk = %item.pk, sk = %item.sk, %reason, "corrupt user record");
        DirectoryError::Corrupt {
            key: format!("{}/{}", item.pk, item.sk),
            reason,
        }
    })
}
