/**
 * In-Memory Store
 *
 * A `BTreeMap` keyed by `(pk, sk)` behind a `tokio::sync::RwLock`. Each
 * operation holds the lock for its whole check-and-write, which makes
 * conditional puts atomic.
 */

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{Attributes, Item, KeyValueStore, PutCondition, StoreError};

type Key = (String, String);

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<BTreeMap<Key, Item>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

fn key(pk: &str, sk: &str) -> Key {
    (pk.to_string(), sk.to_string())
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn put(&self, item: Item, condition: PutCondition) -> Result<(), StoreError> {
        let mut items = self.items.write().await;
        let item_key = key(&item.pk, &item.sk);
        let exists = items.contains_key(&item_key);

        let allowed = match condition {
            PutCondition::Overwrite => true,
            PutCondition::IfAbsent => !exists,
            PutCondition::IfExists => exists,
            PutCondition::IfIndexKeyAbsent => {
                !exists
                    && item.gsi1pk.as_ref().map_or(true, |index_key| {
                        !items
                            .values()
                            .any(|other| other.gsi1pk.as_ref() == Some(index_key))
                    })
            }
        };
        if !allowed {
            return Err(StoreError::ConditionFailed);
        }

        items.insert(item_key, item);
        Ok(())
    }

    async fn get(&self, pk: &str, sk: &str) -> Result<Option<Item>, StoreError> {
        Ok(self.items.read().await.get(&key(pk, sk)).cloned())
    }

    async fn delete(&self, pk: &str, sk: &str) -> Result<bool, StoreError> {
        Ok(self.items.write().await.remove(&key(pk, sk)).is_some())
    }

    async fn query_prefix(&self, pk: &str, sk_prefix: &str) -> Result<Vec<Item>, StoreError> {
        let items = self.items.read().await;
        let start = key(pk, sk_prefix);
        Ok(items
            .range(start..)
            .take_while(|((item_pk, item_sk), _)| item_pk == pk && item_sk.starts_with(sk_prefix))
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn query_index(&self, gsi1pk: &str) -> Result<Vec<Item>, StoreError> {
        let items = self.items.read().await;
        Ok(items
            .values()
            .filter(|item| item.gsi1pk.as_deref() == Some(gsi1pk))
            .cloned()
            .collect())
    }

    async fn update_attributes(
        &self,
        pk: &str,
        sk: &str,
        changes: Attributes,
    ) -> Result<Option<Item>, StoreError> {
        let mut items = self.items.write().await;
        let Some(item) = items.get_mut(&key(pk, sk)) else {
            return Ok(None);
        };
        item.attributes.extend(changes);
        Ok(Some(item.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::contract;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_put_and_get() {
        contract::put_and_get(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_conditions() {
        contract::conditions(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_prefix_and_index_queries() {
        contract::prefix_and_index_queries(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = MemoryStore::new();
        contract::update_and_delete(&store).await;
        assert!(store.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_index_claims() {
        contract::concurrent_index_claims(Arc::new(MemoryStore::new())).await;
    }
}
