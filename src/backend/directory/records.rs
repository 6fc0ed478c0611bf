/**
 * Directory Records
 *
 * Key layout and attribute names for user profiles and parent/child edges,
 * and the conversions between [`User`] and stored [`Item`]s.
 *
 * | record  | pk              | sk               | gsi1pk             | gsi1sk             |
 * |---------|-----------------|------------------|--------------------|--------------------|
 * | profile | `USER#{id}`     | `PROFILE`        | `EMAIL#{email}`    | `USER`             |
 * | edge    | `USER#{parent}` | `CHILD#{child}`  | `CHILD#{child}`    | `PARENT#{parent}`  |
 */

use chrono::{DateTime, Utc};

use crate::backend::store::Item;
use crate::shared::{Role, User};

pub const PROFILE_SK: &str = "PROFILE";
pub const USER_INDEX_SK: &str = "USER";
pub const CHILD_PREFIX: &str = "CHILD#";

pub const ENTITY_USER: &str = "USER";
pub const ENTITY_RELATIONSHIP: &str = "RELATIONSHIP";

/// Stored attribute names
pub mod attr {
    pub const ENTITY_TYPE: &str = "EntityType";
    pub const USER_ID: &str = "UserId";
    pub const EMAIL: &str = "Email";
    pub const NAME: &str = "Name";
    pub const ROLE: &str = "Role";
    pub const PASSWORD_HASH: &str = "PasswordHash";
    pub const CREATED_AT: &str = "CreatedAt";
    pub const UPDATED_AT: &str = "UpdatedAt";
    pub const PARENT_ID: &str = "ParentId";
    pub const CHILD_ID: &str = "ChildId";
}

pub fn user_pk(id: &str) -> String {
    format!("USER#{id}")
}

pub fn email_index_key(email: &str) -> String {
    format!("EMAIL#{}", email.to_lowercase())
}

pub fn child_sk(child_id: &str) -> String {
    format!("{CHILD_PREFIX}{child_id}")
}

pub fn parent_index_sk(parent_id: &str) -> String {
    format!("PARENT#{parent_id}")
}

pub fn profile_item(user: &User) -> Item {
    let mut item = Item::new(user_pk(&user.id), PROFILE_SK)
        .with_index(email_index_key(&user.email), USER_INDEX_SK)
        .with_attribute(attr::ENTITY_TYPE, ENTITY_USER)
        .with_attribute(attr::USER_ID, user.id.as_str())
        .with_attribute(attr::EMAIL, user.email.as_str())
        .with_attribute(attr::NAME, user.name.as_str())
        .with_attribute(attr::ROLE, user.role.as_str())
        .with_attribute(attr::CREATED_AT, user.created_at.timestamp())
        .with_attribute(attr::UPDATED_AT, user.updated_at.timestamp());
    if let Some(hash) = &user.password_hash {
        item = item.with_attribute(attr::PASSWORD_HASH, hash.as_str());
    }
    if let Some(parent_id) = &user.parent_id {
        item = item.with_attribute(attr::PARENT_ID, parent_id.as_str());
    }
    item
}

pub fn edge_item(parent_id: &str, child_id: &str, created_at: DateTime<Utc>) -> Item {
    Item::new(user_pk(parent_id), child_sk(child_id))
        .with_index(child_sk(child_id), parent_index_sk(parent_id))
        .with_attribute(attr::ENTITY_TYPE, ENTITY_RELATIONSHIP)
        .with_attribute(attr::PARENT_ID, parent_id)
        .with_attribute(attr::CHILD_ID, child_id)
        .with_attribute(attr::CREATED_AT, created_at.timestamp())
}

/// Child id of an edge record
pub fn edge_child_id(item: &Item) -> Option<&str> {
    item.attribute_str(attr::CHILD_ID)
        .or_else(|| item.sk.strip_prefix(CHILD_PREFIX))
}

pub fn is_profile(item: &Item) -> bool {
    item.sk == PROFILE_SK && item.attribute_str(attr::ENTITY_TYPE) == Some(ENTITY_USER)
}

/// Decode a profile record
pub fn user_from_item(item: &Item) -> Result<User, String> {
    let text = |name: &str| {
        item.attribute_str(name)
            .map(str::to_string)
            .ok_or_else(|| format!("missing attribute {name}"))
    };
    let timestamp = |name: &str| {
        item.attribute_i64(name)
            .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
            .ok_or_else(|| format!("missing or invalid timestamp {name}"))
    };

    let role: Role = text(attr::ROLE)?
        .parse()
        .map_err(|err| format!("{err}"))?;

    Ok(User {
        id: text(attr::USER_ID)?,
        email: text(attr::EMAIL)?,
        name: text(attr::NAME)?,
        role,
        password_hash: item.attribute_str(attr::PASSWORD_HASH).map(str::to_string),
        created_at: timestamp(attr::CREATED_AT)?,
        updated_at: timestamp(attr::UPDATED_AT)?,
        parent_id: item.attribute_str(attr::PARENT_ID).map(str::to_string),
    })
}
