use thiserror::Error;

/// Errors that can occur during repository operations.
///
/// The taxonomy matters: [`RepositoryError::is_transient`] is the retry
/// classifier, and `AlreadyTracked`, `Forbidden` and `NotFound` each carry a
/// distinct user-facing meaning that must not collapse into a generic
/// failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The row exists but belongs to a different owner.
    #[error("{entity_type} {id} does not belong to the caller")]
    Forbidden {
        entity_type: &'static str,
        id: String,
    },

    /// Uniqueness violation on `(owner_id, media_id)`.
    #[error("media {media_id} is already tracked by {owner_id}")]
    AlreadyTracked { owner_id: String, media_id: i64 },

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Authentication, connection, or operation timeout at the store.
    #[error("store timeout: {0}")]
    Timeout(String),

    /// Serialization failure or deadlock between concurrent transactions.
    #[error("store contention: {0}")]
    Contention(String),

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    /// Returns true for failures expected to resolve themselves on retry:
    /// connectivity blips, timeouts, and serialization/deadlock conflicts.
    ///
    /// Everything else (not-found, forbidden, conflict, malformed data)
    /// would reproduce the same outcome and must surface immediately.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RepositoryError::ConnectionFailed(_)
                | RepositoryError::Timeout(_)
                | RepositoryError::Contention(_)
        )
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
