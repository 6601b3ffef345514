//! In-process credential verification.
//!
//! Token issuance lives outside this system; what the sync layer consumes
//! is the [`IdentityVerifier`] boundary. `StaticTokenVerifier` is the
//! shipped implementation: a fixed credential-to-identity map, used by
//! local setups and tests.

use std::collections::HashMap;

use async_trait::async_trait;

use watchsync_core::auth::{AuthError, IdentityVerifier, Result, UserIdentity};

/// Identity verifier backed by a static credential map.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, UserIdentity>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a credential for an identity.
    pub fn with_token(mut self, token: impl Into<String>, identity: UserIdentity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }
}

#[async_trait]
impl IdentityVerifier for StaticTokenVerifier {
    async fn verify(&self, credential: &str) -> Result<UserIdentity> {
        if credential.is_empty() {
            return Err(AuthError::MissingCredential);
        }
        self.tokens
            .get(credential)
            .cloned()
            .ok_or_else(|| AuthError::Rejected("unknown token".to_string()))
    }
}
