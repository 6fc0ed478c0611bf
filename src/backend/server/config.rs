/**
 * Server Configuration
 *
 * Turns the loaded `AppConfig` into the runtime services the server needs:
 * the key-value store behind the user directory. Unlike an optional
 * service, a misconfigured store stops startup: serving auth requests
 * without the directory is never useful.
 */

use std::sync::Arc;

use crate::backend::store::{KeyValueStore, MemoryStore, SqliteStore, StoreError};
use crate::shared::config::{StoreBackendKind, StoreConfig};

/// Open the configured store backend
///
/// # Errors
///
/// * `StoreError::Backend` - sqlite selected without a database URL
/// * `StoreError::InvalidTableName` - the table name is not a plain identifier
/// * `StoreError::Database` - the database could not be opened or migrated
pub async fn load_store(config: &StoreConfig) -> Result<Arc<dyn KeyValueStore>, StoreError> {
    match config.backend {
        StoreBackendKind::Memory => {
            tracing::warn!("Using the in-memory store; users are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackendKind::Sqlite => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| StoreError::backend("DATABASE_URL is required for the sqlite store"))?;
            let store = SqliteStore::connect(url, &config.table).await?;
            tracing::info!(table = %config.table, "SQLite store ready");
            Ok(Arc::new(store))
        }
    }
}
