//! The tracking service: the server-side core behind whatever transport
//! fronts it.
//!
//! Each call is bearer parse -> identity verification -> payload validation
//! -> store call. The store handed to the service is expected to be the
//! decorated stack (cached over retrying over a backend), but any
//! `EntryStore` works.

use thiserror::Error;

use watchsync_core::auth::{bearer_token, AuthError, IdentityVerifier, UserIdentity};
use watchsync_core::media::{
    validate_new_entry, validate_patch, EntryPatch, NewEntry, TrackedEntry, ValidationError,
};
use watchsync_core::storage::{EntryStore, ListFilter, RepositoryError};

/// Errors surfaced by the tracking service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    #[error("invalid payload: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    /// Returns true when a retry could plausibly succeed. Unauthorized,
    /// validation, conflict and not-found failures reproduce themselves.
    pub fn is_transient(&self) -> bool {
        matches!(self, ServiceError::Repository(e) if e.is_transient())
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Authenticated facade over an entry store.
pub struct TrackingService<V, S>
where
    V: IdentityVerifier,
    S: EntryStore,
{
    verifier: V,
    store: S,
}

impl<V, S> TrackingService<V, S>
where
    V: IdentityVerifier,
    S: EntryStore,
{
    pub fn new(verifier: V, store: S) -> Self {
        Self { verifier, store }
    }

    /// Resolves the `Authorization` header value to a verified identity.
    async fn authenticate(&self, authorization: Option<&str>) -> Result<UserIdentity> {
        let token = bearer_token(authorization)?;
        Ok(self.verifier.verify(token).await?)
    }

    /// Creates a tracked entry for the authenticated caller.
    pub async fn add_entry(
        &self,
        authorization: Option<&str>,
        new: NewEntry,
    ) -> Result<TrackedEntry> {
        let owner = self.authenticate(authorization).await?;
        validate_new_entry(&new)?;
        let entry = self.store.create_entry(&owner, &new).await?;
        tracing::debug!(entry_id = %entry.id, owner_id = %owner.uid, media_id = new.media.id, "tracked");
        Ok(entry)
    }

    /// Applies a patch to one of the caller's entries.
    pub async fn update_entry(
        &self,
        authorization: Option<&str>,
        entry_id: &str,
        patch: EntryPatch,
    ) -> Result<TrackedEntry> {
        let owner = self.authenticate(authorization).await?;
        validate_patch(&patch)?;
        Ok(self.store.update_entry(entry_id, &owner, &patch).await?)
    }

    /// Deletes one of the caller's entries.
    pub async fn delete_entry(&self, authorization: Option<&str>, entry_id: &str) -> Result<()> {
        let owner = self.authenticate(authorization).await?;
        Ok(self.store.delete_entry(entry_id, &owner).await?)
    }

    /// Lists the caller's entries in the canonical order.
    pub async fn list_entries(
        &self,
        authorization: Option<&str>,
        filter: ListFilter,
    ) -> Result<Vec<TrackedEntry>> {
        let owner = self.authenticate(authorization).await?;
        Ok(self.store.list_entries(&owner.uid, &filter).await?)
    }
}
