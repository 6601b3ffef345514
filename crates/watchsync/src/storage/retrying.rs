//! Retrying entry store decorator.
//!
//! Wraps any `EntryStore` with the exponential backoff policy and the
//! transient-error classifier. Terminal errors (not-found, forbidden,
//! conflict, invalid data) pass through on the first attempt.
//!
//! The wrapped store only commits on success, so a retried attempt can
//! never duplicate a write: either the previous attempt failed before
//! committing, or it succeeded and no retry happens.

use async_trait::async_trait;

use watchsync_core::auth::UserIdentity;
use watchsync_core::media::{EntryPatch, NewEntry, TrackedEntry};
use watchsync_core::retry::RetryPolicy;
use watchsync_core::storage::{EntryStore, ListFilter, RepositoryError, Result};

/// Backoff decorator over an entry store.
pub struct RetryingEntryStore<S>
where
    S: EntryStore,
{
    store: S,
    policy: RetryPolicy,
}

impl<S> RetryingEntryStore<S>
where
    S: EntryStore,
{
    /// Wraps a store with the default policy (3 attempts, 500ms base, 2s cap).
    pub fn new(store: S) -> Self {
        Self::with_policy(store, RetryPolicy::default())
    }

    pub fn with_policy(store: S, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }
}

#[async_trait]
impl<S> EntryStore for RetryingEntryStore<S>
where
    S: EntryStore + 'static,
{
    async fn create_entry(&self, owner: &UserIdentity, new: &NewEntry) -> Result<TrackedEntry> {
        self.policy
            .run(RepositoryError::is_transient, || {
                self.store.create_entry(owner, new)
            })
            .await
    }

    async fn update_entry(
        &self,
        entry_id: &str,
        owner: &UserIdentity,
        patch: &EntryPatch,
    ) -> Result<TrackedEntry> {
        self.policy
            .run(RepositoryError::is_transient, || {
                self.store.update_entry(entry_id, owner, patch)
            })
            .await
    }

    async fn delete_entry(&self, entry_id: &str, owner: &UserIdentity) -> Result<()> {
        self.policy
            .run(RepositoryError::is_transient, || {
                self.store.delete_entry(entry_id, owner)
            })
            .await
    }

    async fn list_entries(&self, owner_id: &str, filter: &ListFilter) -> Result<Vec<TrackedEntry>> {
        self.policy
            .run(RepositoryError::is_transient, || {
                self.store.list_entries(owner_id, filter)
            })
            .await
    }
}
