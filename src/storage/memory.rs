//! In-process store. Clones share the same records.

use super::{KeyValueStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<String, String>>>,
    writes: Arc<AtomicUsize>,
    reject_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// Store pre-populated with one record
    pub fn with_record(key: &str, value: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut records) = store.records.write() {
            records.insert(key.to_string(), value.into());
        }
        store
    }

    /// Number of successful `set` calls so far
    pub fn write_count(&self) -> usize { self.writes.load(Ordering::SeqCst) }

    /// Make every following `set` fail with `Unavailable`
    pub fn reject_writes(&self, reject: bool) { self.reject_writes.store(reject, Ordering::SeqCst); }

    /// Raw record, bypassing the async interface
    pub fn record(&self, key: &str) -> Option<String> {
        self.records.read().ok()?.get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let records = self.records.read().map_err(|_| StorageError::Unavailable("lock".into()))?;
        Ok(records.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes rejected".into()));
        }
        let mut records = self.records.write().map_err(|_| StorageError::Unavailable("lock".into()))?;
        records.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
