//! Canonical cache key construction.
//!
//! Keys follow the `{namespace}:{param}={value}&{param}={value}` convention
//! with parameters sorted lexicographically, so semantically identical
//! parameter sets produce the same key regardless of insertion order. Cache
//! hits depend on this.

use crate::storage::ListFilter;

/// Builds a canonical cache key from a namespace and parameter pairs.
///
/// `None` values are dropped, the remaining parameters are sorted by name
/// and joined as `key=value` pairs with `&`.
pub fn make_key(namespace: &str, params: &[(&str, Option<&str>)]) -> String {
    let mut present: Vec<(&str, &str)> = params
        .iter()
        .filter_map(|(name, value)| value.map(|v| (*name, v)))
        .collect();
    present.sort_by(|a, b| a.0.cmp(b.0));

    let joined = present
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    format!("{namespace}:{joined}")
}

/// Returns the cache key for an owner's watchlist under a given filter.
pub fn watchlist_key(owner_id: &str, filter: &ListFilter) -> String {
    let status = filter.status.map(|s| s.as_str());
    make_key(
        "watchlist",
        &[
            ("userId", Some(owner_id)),
            ("search", filter.search.as_deref()),
            ("status", status),
        ],
    )
}

/// Returns the pattern matching every watchlist key of one owner.
///
/// The pattern can also match an owner whose uid extends this one; that
/// over-invalidation is harmless, it can never serve stale data.
pub fn watchlist_pattern(owner_id: &str) -> String {
    format!("watchlist:*userId={owner_id}*")
}
