use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use async_trait::async_trait;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
    sync::Mutex,
};
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// Minimal text key-value storage. [super::entry_store::EntryStore] keeps the whole entry list
/// under one key.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` if nothing is stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Stores every key as a separate file inside a directory.
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key_to_file_name(key))
    }

    async fn read_locked(path: &Path) -> Result<String, std::io::Error> {
        let mut file = File::open(path).await?;
        file.lock_shared()?;
        let mut content = String::new();
        let read = file.read_to_string(&mut content).await;
        file.unlock_async().await?;
        read?;
        Ok(content)
    }
}

/// Keys can contain characters that are not safe in file names (`@habit_tracker_entries`).
fn key_to_file_name(key: &str) -> String {
    let mut name = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>();
    name.push_str(".json");
    name
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        debug!("Reading {path:?}");
        match Self::read_locked(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)?,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        // Written next to the target and renamed over it, so a reader never sees half a value.
        let tmp_path = path.with_extension("tmp");
        debug!("Writing {path:?}");

        let mut file = File::create(&tmp_path).await?;
        file.write_all(value.as_bytes()).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp_path, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        debug!("Removing {path:?}");
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)?,
        }
    }
}

/// Keeps values in memory only. Useful as a scratch store and in tests.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::{key_to_file_name, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};

    #[test]
    fn test_key_to_file_name() {
        assert_eq!(
            key_to_file_name("@habit_tracker_entries"),
            "_habit_tracker_entries.json"
        );
        assert_eq!(key_to_file_name("a/../b"), "a____b.json");
    }

    #[tokio::test]
    async fn test_file_store_basic() -> Result<()> {
        let dir = tempdir()?;
        let store = FileKeyValueStore::new(dir.path().join("store"))?;

        assert_eq!(store.get("key").await?, None);

        store.set("key", "first").await?;
        assert_eq!(store.get("key").await?.as_deref(), Some("first"));

        store.set("key", "second").await?;
        assert_eq!(store.get("key").await?.as_deref(), Some("second"));

        store.remove("key").await?;
        assert_eq!(store.get("key").await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_leaves_no_temporary_files() -> Result<()> {
        let dir = tempdir()?;
        let store = FileKeyValueStore::new(dir.path().to_path_buf())?;
        store.set("@entries", "[]").await?;

        let files = std::fs::read_dir(dir.path())?
            .map(|v| v.map(|v| v.file_name().to_string_lossy().to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(files, vec!["_entries.json".to_string()]);

        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_remove_missing() -> Result<()> {
        let dir = tempdir()?;
        let store = FileKeyValueStore::new(dir.path().to_path_buf())?;
        store.remove("never written").await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_memory_store_basic() -> Result<()> {
        let store = MemoryKeyValueStore::new();
        store.set("key", "value").await?;
        assert_eq!(store.get("key").await?.as_deref(), Some("value"));
        store.remove("key").await?;
        store.remove("key").await?;
        assert_eq!(store.get("key").await?, None);
        Ok(())
    }
}
