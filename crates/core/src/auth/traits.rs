use async_trait::async_trait;

use super::{Result, UserIdentity};

/// Abstraction over bearer-credential verification.
///
/// Implementations map a raw credential to a stable user identity; token
/// issuance lives outside this system.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verifies a credential, failing with an [`AuthError`](super::AuthError)
    /// when it is missing, malformed, or expired.
    async fn verify(&self, credential: &str) -> Result<UserIdentity>;
}
