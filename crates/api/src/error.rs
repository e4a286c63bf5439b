//! Error types for the API and their HTTP mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::DatabaseError;
use thiserror::Error;

/// Errors that can occur while handling a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed, or rejected bearer credential.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but not as the subject this operation requires.
    #[error("Unauthorized access")]
    Forbidden,

    /// Missing fields or an unacceptable payload.
    #[error("{0}")]
    BadRequest(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Database(err) => match err {
                DatabaseError::Validation(v) => (StatusCode::BAD_REQUEST, v.to_string()),
                DatabaseError::NotFound { entity, .. } => {
                    (StatusCode::NOT_FOUND, format!("{} not found", entity))
                }
                DatabaseError::AlreadyExists { .. } => {
                    (StatusCode::CONFLICT, "Request already sent".to_string())
                }
                DatabaseError::AlreadyConnected { .. } => {
                    (StatusCode::CONFLICT, "Already connected".to_string())
                }
                other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
            },
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        // Not-found bodies use `message`, everything else `error`.
        let body = if status == StatusCode::NOT_FOUND {
            serde_json::json!({ "message": message })
        } else {
            serde_json::json!({ "error": message })
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
