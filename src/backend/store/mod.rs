//! Key-Value Store
//!
//! Single-table persistence: every record is addressed by a partition key and
//! a sort key, may carry one secondary-index key pair (`gsi1pk`/`gsi1sk`), and
//! stores its attributes as a JSON object.
//!
//! Two backends implement [`KeyValueStore`]:
//!
//! - [`MemoryStore`] - `tokio::sync::RwLock` over a `BTreeMap`, for tests and development
//! - [`SqliteStore`] - `sqlx` SQLite pool
//!
//! Conditional puts are atomic within each backend; the user directory relies
//! on [`PutCondition::IfIndexKeyAbsent`] to keep emails unique.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// In-memory backend
pub mod memory;

/// SQLite backend
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// JSON attributes of a stored record
pub type Attributes = Map<String, Value>;

/// A stored record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub pk: String,
    pub sk: String,
    pub gsi1pk: Option<String>,
    pub gsi1sk: Option<String>,
    pub attributes: Attributes,
}

impl Item {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
            gsi1pk: None,
            gsi1sk: None,
            attributes: Attributes::new(),
        }
    }

    /// Set the secondary-index key pair
    pub fn with_index(mut self, gsi1pk: impl Into<String>, gsi1sk: impl Into<String>) -> Self {
        self.gsi1pk = Some(gsi1pk.into());
        self.gsi1sk = Some(gsi1sk.into());
        self
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    pub fn attribute_i64(&self, name: &str) -> Option<i64> {
        self.attributes.get(name).and_then(Value::as_i64)
    }
}

/// Precondition for a put
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutCondition {
    /// Unconditional write
    Overwrite,
    /// Fail if a record with the same `(pk, sk)` exists
    IfAbsent,
    /// Fail if a record with the same `(pk, sk)` exists, or any record
    /// carries the same `gsi1pk`
    IfIndexKeyAbsent,
    /// Fail unless a record with the same `(pk, sk)` exists
    IfExists,
}

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The put precondition did not hold; nothing was written
    #[error("conditional write failed")]
    ConditionFailed,

    #[error("invalid table name: {0:?}")]
    InvalidTableName(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("malformed stored attributes: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// Narrow interface to the key-value store
#[async_trait]
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Write a record if `condition` holds
    async fn put(&self, item: Item, condition: PutCondition) -> Result<(), StoreError>;

    async fn get(&self, pk: &str, sk: &str) -> Result<Option<Item>, StoreError>;

    /// Remove a record; `false` if it did not exist
    async fn delete(&self, pk: &str, sk: &str) -> Result<bool, StoreError>;

    /// Records in partition `pk` whose sort key starts with `sk_prefix`, ordered by sort key
    async fn query_prefix(&self, pk: &str, sk_prefix: &str) -> Result<Vec<Item>, StoreError>;

    /// Records whose secondary-index partition key equals `gsi1pk`
    async fn query_index(&self, gsi1pk: &str) -> Result<Vec<Item>, StoreError>;

    /// Merge `changes` into the attributes of an existing record.
    ///
    /// Returns the updated record, or `None` if it does not exist.
    async fn update_attributes(
        &self,
        pk: &str,
        sk: &str,
        changes: Attributes,
    ) -> Result<Option<Item>, StoreError>;
}
