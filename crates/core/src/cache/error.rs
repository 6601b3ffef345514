use thiserror::Error;

/// Errors that can occur during cache operations.
///
/// Cache failures are advisory: every caller of the cache is expected to
/// degrade to direct computation rather than surface these to users.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache connection failed: {0}")]
    ConnectionFailed(String),
    #[error("cache operation failed: {0}")]
    OperationFailed(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
