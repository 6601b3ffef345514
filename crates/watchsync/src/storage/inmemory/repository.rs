//! In-memory storage backend.
//!
//! Used by tests and local setups. Both tables live behind a single lock so
//! the owner-upsert + mutation pair of every write is one atomic scope,
//! matching the transactional backends.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use watchsync_core::auth::UserIdentity;
use watchsync_core::media::{
    sorting::apply_filter, EntryPatch, NewEntry, TrackedEntry, UserRecord,
};
use watchsync_core::storage::{
    EntryStore, ListFilter, RepositoryError, Result, UserStore,
};

#[derive(Debug, Default)]
struct Tables {
    entries: HashMap<String, TrackedEntry>,
    users: HashMap<String, UserRecord>,
}

impl Tables {
    /// Idempotent owner upsert, part of every write.
    fn upsert_user(&mut self, owner: &UserIdentity) {
        let now = Utc::now();
        match self.users.get_mut(&owner.uid) {
            Some(user) => {
                if owner.email.is_some() {
                    user.email = owner.email.clone();
                }
                if owner.display_name.is_some() {
                    user.display_name = owner.display_name.clone();
                }
                if owner.picture_url.is_some() {
                    user.photo_url = owner.picture_url.clone();
                }
                user.updated_at = now;
            }
            None => {
                self.users.insert(
                    owner.uid.clone(),
                    UserRecord {
                        uid: owner.uid.clone(),
                        email: owner.email.clone(),
                        display_name: owner.display_name.clone(),
                        photo_url: owner.picture_url.clone(),
                        created_at: now,
                        updated_at: now,
                    },
                );
            }
        }
    }
}

/// In-memory storage backend.
///
/// Data is not persisted and is lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntryStore for InMemoryStore {
    async fn create_entry(&self, owner: &UserIdentity, new: &NewEntry) -> Result<TrackedEntry> {
        let mut tables = self.tables.write().await;
        tables.upsert_user(owner);

        let duplicate = tables
            .entries
            .values()
            .any(|e| e.owner_id == owner.uid && e.media_id == new.media.id);
        if duplicate {
            return Err(RepositoryError::AlreadyTracked {
                owner_id: owner.uid.clone(),
                media_id: new.media.id,
            });
        }

        let entry = TrackedEntry::new(owner.uid.clone(), &new.media, new.status);
        tables.entries.insert(entry.id.clone(), entry.clone());
        Ok(entry)
    }

    async fn update_entry(
        &self,
        entry_id: &str,
        owner: &UserIdentity,
        patch: &EntryPatch,
    ) -> Result<TrackedEntry> {
        let mut tables = self.tables.write().await;
        tables.upsert_user(owner);

        let entry = tables
            .entries
            .get_mut(entry_id)
            .ok_or_else(|| RepositoryError::NotFound {
                entity_type: "TrackedEntry",
                id: entry_id.to_string(),
            })?;
        if entry.owner_id != owner.uid {
            return Err(RepositoryError::Forbidden {
                entity_type: "TrackedEntry",
                id: entry_id.to_string(),
            });
        }

        patch.apply(entry);
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete_entry(&self, entry_id: &str, owner: &UserIdentity) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.upsert_user(owner);

        match tables.entries.get(entry_id) {
            None => Err(RepositoryError::NotFound {
                entity_type: "TrackedEntry",
                id: entry_id.to_string(),
            }),
            Some(entry) if entry.owner_id != owner.uid => Err(RepositoryError::Forbidden {
                entity_type: "TrackedEntry",
                id: entry_id.to_string(),
            }),
            Some(_) => {
                tables.entries.remove(entry_id);
                Ok(())
            }
        }
    }

    async fn list_entries(&self, owner_id: &str, filter: &ListFilter) -> Result<Vec<TrackedEntry>> {
        let tables = self.tables.read().await;
        let entries: Vec<TrackedEntry> = tables
            .entries
            .values()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(apply_filter(entries, filter))
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn get_user(&self, uid: &str) -> Result<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(uid).cloned())
    }
}
