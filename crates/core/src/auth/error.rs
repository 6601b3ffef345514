use thiserror::Error;

/// Errors produced by credential verification.
///
/// Every variant maps to an unauthorized outcome; none of them are ever
/// retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer credential")]
    MissingCredential,

    #[error("malformed authorization header")]
    MalformedHeader,

    #[error("credential expired")]
    Expired,

    #[error("credential rejected: {0}")]
    Rejected(String),
}

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;
