/**
 * SQLite Store
 *
 * One table per logical store, keyed `(pk, sk)` with nullable `gsi1pk` /
 * `gsi1sk` columns and the attributes as a JSON text column. Every write is
 * a single statement so conditional puts stay atomic under concurrent
 * writers.
 */

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use super::{Attributes, Item, KeyValueStore, PutCondition, StoreError};

/// Row shape shared by every `SELECT`/`RETURNING`
#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    pk: String,
    sk: String,
    gsi1pk: Option<String>,
    gsi1sk: Option<String>,
    attributes: String,
}

impl TryFrom<ItemRow> for Item {
    type Error = StoreError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        Ok(Item {
            pk: row.pk,
            sk: row.sk,
            gsi1pk: row.gsi1pk,
            gsi1sk: row.gsi1sk,
            attributes: serde_json::from_str(&row.attributes)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    /// Quoted table identifier
    table: String,
}

impl SqliteStore {
    /// Connect to `database_url` and create the table if needed
    pub async fn connect(database_url: &str, table: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // SQLite admits one writer at a time, and a read-then-write statement
        // on a second connection can fail with SQLITE_BUSY instead of waiting.
        // A single long-lived connection also keeps `:memory:` databases alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool, table).await
    }

    /// Wrap an existing pool and create the table if needed
    pub async fn with_pool(pool: SqlitePool, table: &str) -> Result<Self, StoreError> {
        let store = Self {
            pool,
            table: quote_table_name(table)?,
        };
        store.ensure_schema(table).await?;
        Ok(store)
    }

    async fn ensure_schema(&self, raw_table: &str) -> Result<(), StoreError> {
        let create_table = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                pk TEXT NOT NULL,
                sk TEXT NOT NULL,
                gsi1pk TEXT,
                gsi1sk TEXT,
                attributes TEXT NOT NULL,
                PRIMARY KEY (pk, sk)
            )",
            self.table
        );
        sqlx::query(&create_table).execute(&self.pool).await?;

        let create_index = format!(
            "CREATE INDEX IF NOT EXISTS \"{raw_table}_gsi1\" ON {} (gsi1pk, gsi1sk)",
            self.table
        );
        sqlx::query(&create_index).execute(&self.pool).await?;

        tracing::debug!(table = raw_table, "sqlite store schema ready");
        Ok(())
    }
}

/// Table names come from configuration and are spliced into SQL, so only a
/// conservative character set is accepted.
fn quote_table_name(table: &str) -> Result<String, StoreError> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
    if !valid {
        return Err(StoreError::InvalidTableName(table.to_string()));
    }
    Ok(format!("\"{table}\""))
}

const COLUMNS: &str = "pk, sk, gsi1pk, gsi1sk, attributes";

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn put(&self, item: Item, condition: PutCondition) -> Result<(), StoreError> {
        let attributes = serde_json::to_string(&item.attributes)?;
        let table = &self.table;

        let result = match condition {
            PutCondition::Overwrite => {
                let sql = format!(
                    "INSERT INTO {table} ({COLUMNS}) VALUES (?, ?, ?, ?, ?)
                     ON CONFLICT (pk, sk) DO UPDATE SET
                        gsi1pk = excluded.gsi1pk,
                        gsi1sk = excluded.gsi1sk,
                        attributes = excluded.attributes"
                );
                sqlx::query(&sql)
                    .bind(&item.pk)
                    .bind(&item.sk)
                    .bind(&item.gsi1pk)
                    .bind(&item.gsi1sk)
                    .bind(&attributes)
                    .execute(&self.pool)
                    .await?
            }
            PutCondition::IfAbsent => {
                let sql = format!(
                    "INSERT INTO {table} ({COLUMNS}) VALUES (?, ?, ?, ?, ?)
                     ON CONFLICT (pk, sk) DO NOTHING"
                );
                sqlx::query(&sql)
                    .bind(&item.pk)
                    .bind(&item.sk)
                    .bind(&item.gsi1pk)
                    .bind(&item.gsi1sk)
                    .bind(&attributes)
                    .execute(&self.pool)
                    .await?
            }
            PutCondition::IfIndexKeyAbsent => {
                let sql = format!(
                    "INSERT INTO {table} ({COLUMNS})
                     SELECT ?, ?, ?, ?, ?
                     WHERE ? IS NULL OR NOT EXISTS (SELECT 1 FROM {table} WHERE gsi1pk = ?)
                     ON CONFLICT (pk, sk) DO NOTHING"
                );
                sqlx::query(&sql)
                    .bind(&item.pk)
                    .bind(&item.sk)
                    .bind(&item.gsi1pk)
                    .bind(&item.gsi1sk)
                    .bind(&attributes)
                    .bind(&item.gsi1pk)
                    .bind(&item.gsi1pk)
                    .execute(&self.pool)
                    .await?
            }
            PutCondition::IfExists => {
                let sql = format!(
                    "UPDATE {table} SET gsi1pk = ?, gsi1sk = ?, attributes = ?
                     WHERE pk = ? AND sk = ?"
                );
                sqlx::query(&sql)
                    .bind(&item.gsi1pk)
                    .bind(&item.gsi1sk)
                    .bind(&attributes)
                    .bind(&item.pk)
                    .bind(&item.sk)
                    .execute(&self.pool)
                    .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(StoreError::ConditionFailed);
        }
        Ok(())
    }

    async fn get(&self, pk: &str, sk: &str) -> Result<Option<Item>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM {} WHERE pk = ? AND sk = ?", self.table);
        sqlx::query_as::<_, ItemRow>(&sql)
            .bind(pk)
            .bind(sk)
            .fetch_optional(&self.pool)
            .await?
            .map(Item::try_from)
            .transpose()
    }

    async fn delete(&self, pk: &str, sk: &str) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE pk = ? AND sk = ?", self.table);
        let result = sqlx::query(&sql)
            .bind(pk)
            .bind(sk)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn query_prefix(&self, pk: &str, sk_prefix: &str) -> Result<Vec<Item>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE pk = ? AND instr(sk, ?) = 1 ORDER BY sk",
            self.table
        );
        sqlx::query_as::<_, ItemRow>(&sql)
            .bind(pk)
            .bind(sk_prefix)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Item::try_from)
            .collect()
    }

    async fn query_index(&self, gsi1pk: &str) -> Result<Vec<Item>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE gsi1pk = ? ORDER BY gsi1sk, pk, sk",
            self.table
        );
        sqlx::query_as::<_, ItemRow>(&sql)
            .bind(gsi1pk)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Item::try_from)
            .collect()
    }

    async fn update_attributes(
        &self,
        pk: &str,
        sk: &str,
        changes: Attributes,
    ) -> Result<Option<Item>, StoreError> {
        let patch = serde_json::to_string(&changes)?;
        let sql = format!(
            "UPDATE {} SET attributes = json_patch(attributes, ?)
             WHERE pk = ? AND sk = ?
             RETURNING {COLUMNS}",
            self.table
        );
        sqlx::query_as::<_, ItemRow>(&sql)
            .bind(patch)
            .bind(pk)
            .bind(sk)
            .fetch_optional(&self.pool)
            .await?
            .map(Item::try_from)
            .transpose()
    }
}
