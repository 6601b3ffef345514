//! Glob matching for cache keys.
//!
//! Patterns support `*` as a wildcard matching any run of characters,
//! including the empty run. This is the matching used by in-process cache
//! backends for pattern invalidation.

/// Checks if a cache key matches a glob pattern.
///
/// # Examples
///
/// ```
/// use watchsync_core::cache::pattern_matches;
///
/// assert!(pattern_matches("watchlist:userId=u1", "watchlist:userId=u1"));
/// assert!(pattern_matches("watchlist:*", "watchlist:userId=u1"));
/// assert!(pattern_matches(
///     "watchlist:*userId=u1*",
///     "watchlist:search=wire&userId=u1"
/// ));
/// assert!(!pattern_matches("watchlist:*", "user:u1"));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    matches_at(pattern.as_bytes(), key.as_bytes())
}

fn matches_at(pattern: &[u8], key: &[u8]) -> bool {
    match pattern.split_first() {
        None => key.is_empty(),
        Some((b'*', rest)) => {
            // Collapse runs of wildcards, then try every split point.
            let rest = skip_wildcards(rest);
            if rest.is_empty() {
                return true;
            }
            (0..=key.len()).any(|skip| matches_at(rest, &key[skip..]))
        }
        Some((ch, rest)) => key
            .split_first()
            .is_some_and(|(first, tail)| first == ch && matches_at(rest, tail)),
    }
}

fn skip_wildcards(pattern: &[u8]) -> &[u8] {
    let run = pattern.iter().take_while(|b| **b == b'*').count();
    &pattern[run..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(pattern_matches("user:u1", "user:u1"));
        assert!(!pattern_matches("user:u1", "user:u2"));
    }

    #[test]
    fn test_trailing_wildcard() {
        assert!(pattern_matches("watchlist:*", "watchlist:userId=u1"));
        assert!(pattern_matches("watchlist:*", "watchlist:"));
        assert!(!pattern_matches("watchlist:*", "user:u1"));
    }

    #[test]
    fn test_leading_wildcard() {
        assert!(pattern_matches("*userId=u1", "watchlist:userId=u1"));
        assert!(!pattern_matches("*userId=u1", "watchlist:userId=u2"));
    }

    #[test]
    fn test_inner_wildcard() {
        assert!(pattern_matches(
            "watchlist:*userId=u1*",
            "watchlist:search=wire&userId=u1"
        ));
        assert!(pattern_matches("watchlist:*userId=u1*", "watchlist:userId=u1"));
        assert!(!pattern_matches(
            "watchlist:*userId=u1*",
            "watchlist:userId=u2"
        ));
    }

    #[test]
    fn test_multiple_wildcards() {
        assert!(pattern_matches("*:*", "a:b"));
        assert!(pattern_matches("*=wire&*", "watchlist:search=wire&userId=u1"));
        assert!(!pattern_matches("*=wire&*", "watchlist:userId=u1"));
    }

    #[test]
    fn test_adjacent_wildcards_collapse() {
        assert!(pattern_matches("watchlist:**userId=u1", "watchlist:userId=u1"));
        assert!(pattern_matches("**", "anything"));
    }

    #[test]
    fn test_wildcard_only() {
        assert!(pattern_matches("*", ""));
        assert!(pattern_matches("*", "watchlist:userId=u1"));
    }

    #[test]
    fn test_empty_pattern() {
        assert!(pattern_matches("", ""));
        assert!(!pattern_matches("", "non-empty"));
    }

    #[test]
    fn test_empty_key() {
        assert!(!pattern_matches("watchlist:*", ""));
        assert!(!pattern_matches("a", ""));
    }
}
