//! Authentication and the ownership rules built on it.
//!
//! Every protected route takes an [`AuthUser`] extractor, which resolves the
//! bearer credential to a subject id through the configured
//! [`IdentityVerifier`] before any handler logic runs. Handlers then compare
//! that subject against the role the operation requires.

pub mod firebase;
#[cfg(test)]
pub mod static_tokens;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// A subject confirmed by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub uid: String,
}

/// Errors from credential verification.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The credential is malformed, expired, or rejected by the provider.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The provider could not be reached or answered unexpectedly.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Resolves bearer credentials to subject ids.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify `token` and return the subject it was issued to.
    async fn verify(&self, token: &str) -> std::result::Result<VerifiedIdentity, VerifyError>;

    /// Name used in logs.
    fn name(&self) -> &str;
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
}

impl AuthUser {
    /// Require the caller to be exactly `uid`.
    pub fn require(&self, uid: &str) -> Result<()> {
        self.require_any(&[uid])
    }

    /// Require the caller to be one of `uids`.
    pub fn require_any(&self, uids: &[&str]) -> Result<()> {
        if uids.iter().any(|uid| *uid == self.uid) {
            return Ok(());
        }
        warn!(subject = %self.uid, required = ?uids, "Access denied");
        Err(ApiError::Forbidden)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;

        match state.verifier.verify(token).await {
            Ok(identity) => {
                debug!(uid = %identity.uid, verifier = state.verifier.name(), "Authenticated");
                Ok(AuthUser { uid: identity.uid })
            }
            Err(VerifyError::InvalidToken(reason)) => {
                warn!(%reason, "Rejected bearer token");
                Err(ApiError::Unauthorized("Invalid or expired token".to_string()))
            }
            Err(err @ VerifyError::Unavailable(_)) => Err(ApiError::Internal(err.to_string())),
        }
    }
}

/// Extract the credential from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
