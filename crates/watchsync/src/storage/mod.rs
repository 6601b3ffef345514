//! Storage backends and decorators.
//!
//! Backends implement `watchsync_core::storage::EntryStore`; the decorators
//! layer caching and retries over any backend.

mod cached;
#[cfg(feature = "inmemory")]
mod inmemory;
mod retrying;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use cached::CachedEntryStore;
#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryStore;
pub use retrying::RetryingEntryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
