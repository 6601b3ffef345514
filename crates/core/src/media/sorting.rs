//! Pure list ordering and filtering for tracked entries.
//!
//! Every storage backend defers to these functions so the listing order is
//! identical regardless of backend, and the client projection can rely on it
//! for its initial render.

use crate::storage::ListFilter;

use super::types::TrackedEntry;

/// Sorts entries by status rank ascending, then `updated_at` descending.
///
/// The sort is stable: entries with equal status and timestamp keep their
/// relative order.
pub fn sort_entries(entries: &mut [TrackedEntry]) {
    entries.sort_by(|a, b| {
        a.status
            .sort_rank()
            .cmp(&b.status.sort_rank())
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });
}

/// Returns true when `title` contains `query`, ignoring case.
pub fn title_matches(title: &str, query: &str) -> bool {
    title.to_lowercase().contains(&query.to_lowercase())
}

/// Applies a listing filter and the canonical sort order.
pub fn apply_filter(mut entries: Vec<TrackedEntry>, filter: &ListFilter) -> Vec<TrackedEntry> {
    if let Some(ref query) = filter.search {
        let query = query.trim();
        if !query.is_empty() {
            entries.retain(|e| title_matches(&e.title, query));
        }
    }
    if let Some(status) = filter.status {
        entries.retain(|e| e.status == status);
    }
    sort_entries(&mut entries);
    entries
}
