use async_trait::async_trait;

use crate::auth::UserIdentity;
use crate::media::{EntryPatch, NewEntry, TrackedEntry, UserRecord};

use super::{ListFilter, Result};

/// Repository for tracked entry operations.
///
/// Every write is the pair "ensure the owner row exists" + "the mutation",
/// executed atomically, which is why mutating methods take the full
/// [`UserIdentity`] rather than a bare uid: the first write a user ever
/// issues races with their provisioning, and the idempotent upsert absorbs
/// that race.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Creates a new entry for the owner.
    ///
    /// Fails with `AlreadyTracked` when the `(owner, media)` pair exists.
    async fn create_entry(&self, owner: &UserIdentity, new: &NewEntry) -> Result<TrackedEntry>;

    /// Applies a patch to an entry, bumping `updated_at`.
    ///
    /// Authorizes by entry id AND owner id; an id alone is not sufficient.
    async fn update_entry(
        &self,
        entry_id: &str,
        owner: &UserIdentity,
        patch: &EntryPatch,
    ) -> Result<TrackedEntry>;

    /// Deletes an entry, authorized by entry id AND owner id.
    async fn delete_entry(&self, entry_id: &str, owner: &UserIdentity) -> Result<()>;

    /// Lists the owner's entries in the canonical order: status rank
    /// ascending, then `updated_at` descending.
    async fn list_entries(&self, owner_id: &str, filter: &ListFilter) -> Result<Vec<TrackedEntry>>;
}

/// Repository for owner records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Gets an owner record by uid.
    async fn get_user(&self, uid: &str) -> Result<Option<UserRecord>>;
}
