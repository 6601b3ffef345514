//! Client error types.

use thiserror::Error;

/// Errors surfaced by the sync transport.
///
/// The taxonomy decides whether a failed mutation is retained for
/// [`retry_last_failed`](crate::session::SyncSession::retry_last_failed):
/// only failures a retry could plausibly fix are kept.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The media is already on the caller's list.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid payload: {0}")]
    Validation(String),

    /// The caller-supplied call timeout elapsed. Distinct from a server
    /// error: the server may or may not have applied the mutation.
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("server error: {0}")]
    Server(String),
}

impl TransportError {
    /// Returns true when retrying the operation could succeed.
    ///
    /// Unauthorized, forbidden, validation and conflict failures reproduce
    /// the same outcome, so retrying them is never offered.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout | TransportError::Network(_) | TransportError::Server(_)
        )
    }
}

/// Errors surfaced by the sync session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The entry's create has not been acknowledged yet, so there is no
    /// server id to address.
    #[error("entry {id} has not been acknowledged yet")]
    UnacknowledgedEntry { id: String },

    /// The entry is not in the local projection.
    #[error("unknown entry: {id}")]
    UnknownEntry { id: String },
}

impl ClientError {
    /// See [`TransportError::is_retryable`].
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Transport(e) if e.is_retryable())
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(TransportError::Timeout.is_retryable());
        assert!(TransportError::Network("reset".into()).is_retryable());
        assert!(TransportError::Server("500".into()).is_retryable());
    }

    #[test]
    fn test_terminal_kinds() {
        let terminal = [
            TransportError::Unauthorized("expired".into()),
            TransportError::Forbidden("not yours".into()),
            TransportError::Conflict("already tracked".into()),
            TransportError::NotFound("gone".into()),
            TransportError::Validation("rating".into()),
        ];
        for error in terminal {
            assert!(!error.is_retryable(), "{error} should be terminal");
        }
    }

    #[test]
    fn test_client_error_delegates() {
        assert!(ClientError::Transport(TransportError::Timeout).is_retryable());
        assert!(!ClientError::UnknownEntry { id: "x".into() }.is_retryable());
    }
}
