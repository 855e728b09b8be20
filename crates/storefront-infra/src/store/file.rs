//! JSON-file store - the server-side stand-in for browser local storage.
//!
//! The whole map is held in memory and rewritten to disk on every mutation
//! (write to a temporary file, then rename). The file is only read when the
//! store is opened, so two processes sharing one file overwrite each other:
//! last writer wins.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;

use storefront_core::ports::{KeyValueStore, StoreError};

pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                StoreError::Serialization(format!("{}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StoreError::Io(format!("{}: {}", path.display(), e))),
        };

        tracing::info!(path = %path.display(), keys = entries.len(), "Opened JSON file store");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(entries)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Io(e.to_string()))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // Hold the write lock across the flush so writes hit disk in order.
        // Memory only changes once the file does.
        let mut entries = self.entries.write().await;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("storefront-store-{}-{}", std::process::id(), name))
            .join("storage.json")
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let path = temp_path("reopen");
        let _ = tokio::fs::remove_file(&path).await;

        let store = JsonFileStore::open(&path).await.unwrap();
        store.set("analysis", r#"{"count":1}"#).await.unwrap();
        store.set("other", "x").await.unwrap();
        store.delete("other").await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get("analysis").await.unwrap(),
            Some(r#"{"count":1}"#.to_string())
        );
        assert_eq!(reopened.get("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_file_opens_empty() {
        let path = temp_path("missing");
        let _ = tokio::fs::remove_file(&path).await;

        let store = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(store.get("anything").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_rejected() {
        let path = temp_path("corrupt");
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, "{ nope").await.unwrap();

        let result = JsonFileStore::open(&path).await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_store_unchanged() {
        let path = temp_path("unwritable");
        let dir = path.parent().unwrap().to_path_buf();
        let _ = tokio::fs::remove_dir_all(&dir).await;
        let _ = tokio::fs::remove_file(&dir).await;

        let store = JsonFileStore::open(&path).await.unwrap();
        store.set("kept", "v0").await.unwrap();

        // Replace the store's directory with a plain file so writes fail.
        tokio::fs::remove_dir_all(&dir).await.unwrap();
        tokio::fs::write(&dir, "not a directory").await.unwrap();

        assert!(store.set("analysis", "v1").await.is_err());
        assert_eq!(store.get("analysis").await.unwrap(), None);

        assert!(store.delete("kept").await.is_err());
        assert_eq!(store.get("kept").await.unwrap(), Some("v0".to_string()));

        tokio::fs::remove_file(&dir).await.unwrap();
    }
}
