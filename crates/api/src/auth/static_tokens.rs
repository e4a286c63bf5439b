//! Fixed token table verifier for tests.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{IdentityVerifier, VerifiedIdentity, VerifyError};

/// Accepts only the tokens it was built with.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `token` to `uid`.
    pub fn with_token(mut self, token: impl Into<String>, uid: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), uid.into());
        self
    }
}

#[async_trait]
impl IdentityVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerifyError> {
        self.tokens
            .get(token)
            .map(|uid| VerifiedIdentity { uid: uid.clone() })
            .ok_or_else(|| VerifyError::InvalidToken("unknown token".to_string()))
    }

    fn name(&self) -> &str {
        "static"
    }
}
