//! PersistenceCache - the address -> color table as one durable record

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::storage::{KeyValueStore, StorageError};

/// Identifier -> color. Sorted so the stored JSON is stable.
pub type AssignmentTable = BTreeMap<String, String>;

/// Allocations not yet merged into the table
pub type PendingBuffer = BTreeMap<String, String>;

#[derive(Clone)]
pub struct PersistenceCache {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl PersistenceCache {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self { store, key: key.into() }
    }

    pub fn key(&self) -> &str { &self.key }

    /// Read the stored table. Missing, unreadable or malformed records all
    /// yield an empty table; failures are logged, never returned.
    pub async fn load(&self) -> AssignmentTable {
        match self.try_load().await {
            Ok(Some(table)) => {
                tracing::debug!(key = %self.key, entries = table.len(), "color assignments loaded");
                table
            }
            Ok(None) => AssignmentTable::new(),
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "error loading color assignments");
                AssignmentTable::new()
            }
        }
    }

    async fn try_load(&self) -> Result<Option<AssignmentTable>, StorageError> {
        match self.store.get(&self.key).await? {
            Some(raw) if !raw.trim().is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
            _ => Ok(None),
        }
    }

    /// Replace the stored record with `table`. Returns whether the write
    /// landed; failures are logged and not retried.
    pub async fn save(&self, table: &AssignmentTable) -> bool {
        let result = match serde_json::to_string(table) {
            Ok(raw) => self.store.set(&self.key, &raw).await,
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(key = %self.key, entries = table.len(), error = %e, "error saving color assignments");
                false
            }
        }
    }
}

/// Pending entries win on collision.
pub fn merge_into(table: &mut AssignmentTable, pending: PendingBuffer) {
    table.extend(pending);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const KEY: &str = "btcon_qr_color_assignments";

    #[tokio::test]
    async fn load_absent_is_empty() {
        let cache = PersistenceCache::new(Arc::new(MemoryStore::new()), KEY);
        assert!(cache.load().await.is_empty());
    }

    #[tokio::test]
    async fn load_malformed_is_empty() {
        for raw in ["not json", "[1,2,3]", r#"{"addr": 5}"#] {
            let cache = PersistenceCache::new(Arc::new(MemoryStore::with_record(KEY, raw)), KEY);
            assert!(cache.load().await.is_empty(), "{raw}");
        }
    }

    #[tokio::test]
    async fn save_then_load() {
        let store = MemoryStore::new();
        let cache = PersistenceCache::new(Arc::new(store.clone()), KEY);
        let table = AssignmentTable::from([
            ("bc1qa".to_string(), "hsl(10, 60%, 40%)".to_string()),
            ("bc1qb".to_string(), "hsl(20, 70%, 50%)".to_string()),
        ]);

        assert!(cache.save(&table).await);
        assert_eq!(cache.load().await, table);
        assert_eq!(
            store.record(KEY).as_deref(),
            Some(r#"{"bc1qa":"hsl(10, 60%, 40%)","bc1qb":"hsl(20, 70%, 50%)"}"#)
        );
    }

    #[tokio::test]
    async fn save_failure_reports_false() {
        let store = MemoryStore::new();
        store.reject_writes(true);
        let cache = PersistenceCache::new(Arc::new(store), KEY);
        assert!(!cache.save(&AssignmentTable::new()).await);
    }

    #[test]
    fn pending_wins_on_collision() {
        let mut table = AssignmentTable::from([("a".to_string(), "old".to_string())]);
        merge_into(&mut table, PendingBuffer::from([
            ("a".to_string(), "new".to_string()),
            ("b".to_string(), "other".to_string()),
        ]));
        assert_eq!(table["a"], "new");
        assert_eq!(table.len(), 2);
    }
}
