//! # Key-Value Stores
//!
//! - [`InMemoryStore`]: process-local map, for tests and ephemeral runs.
//! - [`JsonFileStore`]: one JSON object on disk, rewritten atomically
//!   (temp file + rename) on every mutation. The in-memory view only
//!   changes once the file write has succeeded.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::ChannelError;
use crate::ports::KeyValueStore;

/// In-memory [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key.
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.write().insert(key.into(), value.into());
        self
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ChannelError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), ChannelError> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ChannelError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// File-backed [`KeyValueStore`].
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
    // Serializes copy + write + swap so the file never goes backwards
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ChannelError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path).await {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                ChannelError::Storage(format!("corrupt store {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(ChannelError::Storage(format!(
                    "cannot read {}: {e}",
                    path.display()
                )))
            }
        };
        debug!(path = %path.display(), keys = entries.len(), "Opened key-value store");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
            write_lock: Mutex::new(()),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `apply` to a copy of the map, write the copy to disk, then make
    /// it the live map. On error the live map is left as it was. `apply`
    /// returns false when nothing changed.
    async fn commit(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<(), ChannelError> {
        let _guard = self.write_lock.lock().await;
        let mut next = self.entries.read().clone();
        if !apply(&mut next) {
            return Ok(());
        }
        self.write_file(&next).await?;
        *self.entries.write() = next;
        Ok(())
    }

    async fn write_file(&self, entries: &BTreeMap<String, String>) -> Result<(), ChannelError> {
        let serialized = serde_json::to_string_pretty(entries)
            .map_err(|e| ChannelError::Storage(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ChannelError::Storage(format!("create {}: {e}", parent.display())))?;
        }

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, serialized)
            .await
            .map_err(|e| ChannelError::Storage(format!("write {}: {e}", temp_path.display())))?;
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| ChannelError::Storage(format!("rename temp file: {e}")))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ChannelError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), ChannelError> {
        self.commit(|next| {
            next.insert(key.to_string(), value);
            true
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), ChannelError> {
        self.commit(|next| next.remove(key).is_some()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_roundtrip() {
        let store = InMemoryStore::new().with_entry("a", "1");
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));

        store.set("b", "2".into()).await.unwrap();
        store.remove("a").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        store.set("salesChannel", "chan-1".into()).await.unwrap();
        store.set("isOnboarded", "true".into()).await.unwrap();
        store.remove("isOnboarded").await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get("salesChannel").await.unwrap().as_deref(),
            Some("chan-1")
        );
        assert_eq!(reopened.get("isOnboarded").await.unwrap(), None);
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = JsonFileStore::open(&path).await;
        assert!(matches!(result, Err(ChannelError::Storage(_))));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_entries_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("sub");
        let path = parent.join("store.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        store.set("salesChannel", "chan-1".into()).await.unwrap();

        // A regular file where the parent directory should be
        std::fs::remove_dir_all(&parent).unwrap();
        std::fs::write(&parent, b"in the way").unwrap();

        let result = store.set("salesChannel", "chan-2".into()).await;
        assert!(matches!(result, Err(ChannelError::Storage(_))));
        assert_eq!(
            store.get("salesChannel").await.unwrap().as_deref(),
            Some("chan-1")
        );

        let result = store.remove("salesChannel").await;
        assert!(matches!(result, Err(ChannelError::Storage(_))));
        assert_eq!(
            store.get("salesChannel").await.unwrap().as_deref(),
            Some("chan-1")
        );

        // Removing an absent key never touches the disk
        store.remove("missing").await.unwrap();
    }
}
