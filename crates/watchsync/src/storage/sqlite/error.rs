//! Error mapping from SQLite to the repository taxonomy.
//!
//! The classification matters downstream: `Contention` and
//! `ConnectionFailed` are transient and retried by the policy wrapping this
//! store; everything else surfaces on first occurrence.

use rusqlite::ErrorCode;

use watchsync_core::storage::RepositoryError;

/// Wraps a rusqlite error for use inside `Connection::call` closures.
pub fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Smuggles a domain error out of a `Connection::call` closure.
///
/// `map_store_error` unwraps it on the other side, so NotFound/Forbidden
/// raised inside a transaction keep their meaning.
pub fn domain_err(e: RepositoryError) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Other(Box::new(e))
}

/// Returns true when the error is a uniqueness-constraint violation.
pub fn is_unique_violation(e: &tokio_rusqlite::Error) -> bool {
    matches!(
        e,
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(err, _))
            if err.code == ErrorCode::ConstraintViolation
    )
}

/// Maps a tokio_rusqlite error to the repository taxonomy.
pub fn map_store_error(
    e: tokio_rusqlite::Error,
    entity_type: &'static str,
    id: String,
) -> RepositoryError {
    match e {
        tokio_rusqlite::Error::Other(boxed) => match boxed.downcast::<RepositoryError>() {
            Ok(domain) => *domain,
            Err(other) => RepositoryError::QueryFailed(other.to_string()),
        },
        tokio_rusqlite::Error::ConnectionClosed => {
            RepositoryError::ConnectionFailed("connection closed".to_string())
        }
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::QueryReturnedNoRows) => {
            RepositoryError::NotFound { entity_type, id }
        }
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(err, message)) => {
            let message = message.unwrap_or_else(|| err.to_string());
            match err.code {
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                    RepositoryError::Contention(message)
                }
                ErrorCode::OperationInterrupted => RepositoryError::Timeout(message),
                ErrorCode::CannotOpen | ErrorCode::NotADatabase => {
                    RepositoryError::ConnectionFailed(message)
                }
                _ => RepositoryError::QueryFailed(message),
            }
        }
        other => RepositoryError::QueryFailed(other.to_string()),
    }
}
