//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;

use crate::auth::IdentityVerifier;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Bearer credential verifier.
    pub verifier: Arc<dyn IdentityVerifier>,
    /// CORS allow-list, also reported by the health check.
    pub allowed_origins: Arc<[String]>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        db: Database,
        verifier: Arc<dyn IdentityVerifier>,
        allowed_origins: Vec<String>,
    ) -> Self {
        Self {
            db,
            verifier,
            allowed_origins: allowed_origins.into(),
        }
    }

    /// Whether `origin` is on the CORS allow-list.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }
}
