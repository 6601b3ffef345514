//! watchsync_client - optimistic sync client for the watchsync API.
//!
//! The session applies mutations to its local projection before the server
//! answers, rolls back from snapshots on failure, and retains the most
//! recent retryable failure for an explicit retry.

pub mod error;
pub mod session;
pub mod transport;

pub use error::{ClientError, Result, TransportError};
pub use session::{EntryState, SyncSession, LOCAL_ID_PREFIX};
pub use transport::{SyncTransport, WithTimeout, DEFAULT_CALL_TIMEOUT};
