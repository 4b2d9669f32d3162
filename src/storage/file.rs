//! FileStore - one JSON file per key under a root directory.
//!
//! Writes go to `<key>.json.tmp` first and are renamed into place, so a
//! crash mid-write leaves the previous record intact.

use super::{KeyValueStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path { &self.root }

    fn record_path(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.record_path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.record_path(key)?;
        tokio::fs::create_dir_all(&self.root).await?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::debug!(key, path = %path.display(), bytes = value.len(), "record written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_record_is_none() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileStore::open(dir.path());
        assert!(store.get("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_creates_root_and_replaces() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileStore::open(dir.path().join("nested").join("root"));

        store.set("colors", r#"{"a":"b"}"#).await.unwrap();
        store.set("colors", r#"{"c":"d"}"#).await.unwrap();

        assert_eq!(store.get("colors").await.unwrap().as_deref(), Some(r#"{"c":"d"}"#));
        assert!(!store.root().join("colors.json.tmp").exists());
    }

    #[tokio::test]
    async fn rejects_path_like_keys() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileStore::open(dir.path());
        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(store.get(key).await, Err(StorageError::InvalidKey(_))), "{key}");
        }
    }
}
