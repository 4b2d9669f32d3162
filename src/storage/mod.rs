//! Storage - durable key/value records
//!
//! Every persisted structure is a single string value under a fixed key.
//! Backends only need `get` and `set`; callers own (de)serialization.
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`MemoryStore`] | tests, ephemeral sessions |
//! | [`FileStore`] | native apps, one file per key |

#[cfg(feature = "native")]
mod file;
mod memory;

#[cfg(feature = "native")]
pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Durable string records addressed by key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the record at `key`, `None` if it was never written.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the record at `key`.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}
