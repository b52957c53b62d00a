use std::{future::Future, ops::Deref};

use anyhow::Result;
use tracing::{debug, error, instrument};

use super::{entities::Entry, key_value::KeyValueStore};

/// Key under which the whole entry list is persisted.
pub const STORAGE_KEY: &str = "@habit_tracker_entries";

/// Interface for the durable entry list.
///
/// None of the operations return errors. Failures are logged and reported as an empty list or as
/// `false`, so callers can't tell "nothing stored" apart from "storage failed".
pub trait EntryRepository {
    /// Returns entries in persisted order.
    fn get_all(&self) -> impl Future<Output = Vec<Entry>> + Send;

    /// Puts `entry` in front of the stored list, replacing an entry with the same id.
    fn save(&self, entry: &Entry) -> impl Future<Output = bool> + Send;

    /// Removing an id that isn't stored succeeds.
    fn delete(&self, id: &str) -> impl Future<Output = bool> + Send;

    fn clear_all(&self) -> impl Future<Output = bool> + Send;
}

impl<T: Deref + Sync> EntryRepository for T
where
    T::Target: EntryRepository,
{
    fn get_all(&self) -> impl Future<Output = Vec<Entry>> + Send {
        self.deref().get_all()
    }

    fn save(&self, entry: &Entry) -> impl Future<Output = bool> + Send {
        self.deref().save(entry)
    }

    fn delete(&self, id: &str) -> impl Future<Output = bool> + Send {
        self.deref().delete(id)
    }

    fn clear_all(&self) -> impl Future<Output = bool> + Send {
        self.deref().clear_all()
    }
}

/// The main realization of [EntryRepository]. Every mutation reads the full list, changes it and
/// writes it back under [STORAGE_KEY].
pub struct EntryStore<K> {
    kv: K,
}

impl<K: KeyValueStore> EntryStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    async fn read_entries(&self) -> Result<Vec<Entry>> {
        match self.kv.get(STORAGE_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(vec![]),
        }
    }

    async fn write_entries(&self, entries: &[Entry]) -> Result<()> {
        let raw = serde_json::to_string(entries)?;
        self.kv.set(STORAGE_KEY, &raw).await
    }

    async fn save_inner(&self, entry: &Entry) -> Result<()> {
        // A failed read must not turn into overwriting everything with a single entry.
        let current = self.read_entries().await?;
        let mut updated = Vec::with_capacity(current.len() + 1);
        updated.push(entry.clone());
        updated.extend(current.into_iter().filter(|v| v.id != entry.id));
        self.write_entries(&updated).await
    }

    async fn delete_inner(&self, id: &str) -> Result<()> {
        let current = self.read_entries().await?;
        let before = current.len();
        let updated = current
            .into_iter()
            .filter(|v| v.id != id)
            .collect::<Vec<_>>();
        if updated.len() == before {
            debug!("Entry {id} is not stored, nothing to delete");
        }
        self.write_entries(&updated).await
    }
}

impl<K: KeyValueStore> EntryRepository for EntryStore<K> {
    #[instrument(skip(self))]
    async fn get_all(&self) -> Vec<Entry> {
        self.read_entries()
            .await
            .inspect_err(|e| error!("Failed to fetch entries {e:?}"))
            .unwrap_or_default()
    }

    #[instrument(skip(self, entry), fields(id = %entry.id))]
    async fn save(&self, entry: &Entry) -> bool {
        self.save_inner(entry)
            .await
            .inspect_err(|e| error!("Failed to save entry {e:?}"))
            .is_ok()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> bool {
        self.delete_inner(id)
            .await
            .inspect_err(|e| error!("Failed to delete entry {e:?}"))
            .is_ok()
    }

    #[instrument(skip(self))]
    async fn clear_all(&self) -> bool {
        self.kv
            .remove(STORAGE_KEY)
            .await
            .inspect_err(|e| error!("Failed to clear entries {e:?}"))
            .is_ok()
    }
}
