//! Database error types.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Stored document could not be encoded or decoded.
    #[error("document encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input rejected before reaching storage.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// The two users already share a connection.
    #[error("already connected: {a} and {b}")]
    AlreadyConnected { a: String, b: String },
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Map a unique-constraint violation to `AlreadyExists`, passing other errors through.
pub(crate) fn map_unique_violation(
    err: sqlx::Error,
    entity: &'static str,
    id: impl FnOnce() -> String,
) -> DatabaseError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return DatabaseError::AlreadyExists { entity, id: id() };
        }
    }
    DatabaseError::Sqlx(err)
}
