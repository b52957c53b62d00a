//! In-memory mirror of the entry list shared by every view.
//!
//! [EntryState] owns an [EntryRepository] and keeps a snapshot of the entries. Mutations are
//! applied to the snapshot first and only then persisted, so the change is visible to readers
//! before the write finishes. What happens when the write fails is decided by
//! [PersistencePolicy].

use std::future::Future;

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::storage::{entities::Entry, entry_store::EntryRepository};

/// What to do with an optimistic change when the repository reports that persisting it failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersistencePolicy {
    /// Trust the in-memory state. It may diverge from storage until the next reload.
    #[default]
    KeepOptimistic,
    /// Undo the in-memory change.
    Rollback,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateSnapshot {
    pub entries: Vec<Entry>,
    pub is_loading: bool,
}

pub struct EntryState<R> {
    repository: R,
    snapshot: watch::Sender<StateSnapshot>,
    policy: PersistencePolicy,
}

impl<R: EntryRepository> EntryState<R> {
    pub fn new(repository: R) -> Self {
        Self::with_policy(repository, PersistencePolicy::default())
    }

    pub fn with_policy(repository: R, policy: PersistencePolicy) -> Self {
        let (snapshot, _) = watch::channel(StateSnapshot::default());
        Self {
            repository,
            snapshot,
            policy,
        }
    }

    /// Current entries, most recently added first.
    pub fn entries(&self) -> Vec<Entry> {
        self.snapshot.borrow().entries.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot.borrow().is_loading
    }

    /// Change feed for views that need to react to updates.
    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.snapshot.subscribe()
    }

    /// Replaces the in-memory list with whatever the repository holds. Safe to call repeatedly.
    #[instrument(skip(self))]
    pub async fn load_entries(&self) {
        self.snapshot.send_modify(|s| s.is_loading = true);
        let entries = self.repository.get_all().await;
        debug!("Loaded {} entries", entries.len());
        self.snapshot.send_modify(|s| {
            s.entries = entries;
            s.is_loading = false;
        });
    }

    /// Prepends `entry` right away and returns the pending write. The future resolves to whether
    /// the repository stored the entry.
    pub fn add_entry(&self, entry: Entry) -> impl Future<Output = bool> + '_ {
        self.snapshot.send_modify(|s| s.entries.insert(0, entry.clone()));

        async move {
            let persisted = self.repository.save(&entry).await;
            if persisted {
                info!("Added entry {}", entry.id);
            } else {
                warn!("Entry {} was not persisted", entry.id);
                if self.policy == PersistencePolicy::Rollback {
                    // Only the prepended copy goes. It is the front-most one with this id.
                    self.snapshot.send_modify(|s| {
                        if let Some(index) = s.entries.iter().position(|v| v.id == entry.id) {
                            s.entries.remove(index);
                        }
                    });
                }
            }
            persisted
        }
    }

    /// Removes the entry right away and returns the pending write. Unknown ids only reach the
    /// repository, which treats them as a no-op.
    pub fn delete_entry(&self, id: &str) -> impl Future<Output = bool> + '_ {
        let id = id.to_string();
        let mut removed = None;
        self.snapshot.send_modify(|s| {
            if let Some(index) = s.entries.iter().position(|v| v.id == id) {
                removed = Some((index, s.entries.remove(index)));
            }
        });

        async move {
            let persisted = self.repository.delete(&id).await;
            if persisted {
                info!("Deleted entry {id}");
            } else {
                warn!("Deletion of entry {id} was not persisted");
                if let (PersistencePolicy::Rollback, Some((index, entry))) = (self.policy, removed)
                {
                    self.snapshot.send_modify(|s| {
                        let index = index.min(s.entries.len());
                        s.entries.insert(index, entry);
                    });
                }
            }
            persisted
        }
    }

    /// Empties the list right away and returns the pending write.
    pub fn clear_entries(&self) -> impl Future<Output = bool> + '_ {
        let mut previous = vec![];
        self.snapshot
            .send_modify(|s| previous = std::mem::take(&mut s.entries));

        async move {
            let persisted = self.repository.clear_all().await;
            if persisted {
                info!("Cleared {} entries", previous.len());
            } else {
                warn!("Clearing entries was not persisted");
                if self.policy == PersistencePolicy::Rollback {
                    self.snapshot.send_modify(|s| s.entries.extend(previous));
                }
            }
            persisted
        }
    }
}
