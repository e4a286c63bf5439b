//! User bootstrap and the public directory.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use database::validation::validate_document_size;
use database::{DatabaseError, NewUser, User, UserSummary};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::routes::ApiJson;
use crate::state::AppState;

/// Login-time user fields.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
}

/// Create the caller's user record on first login; return it either way.
///
/// The whole body counts against the profile size cap, including fields that
/// are not stored, and is checked before an existing user is looked up.
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<Map<String, Value>>,
) -> Result<Json<User>> {
    validate_document_size(&body).map_err(DatabaseError::from)?;
    let req: CreateUserRequest = serde_json::from_value(Value::Object(body))
        .map_err(|e| ApiError::BadRequest(format!("Invalid user payload: {}", e)))?;

    let uid = req.uid.unwrap_or_default();
    auth.require(&uid)?;

    let new_user = NewUser {
        uid,
        name: req.name,
        email: req.email,
        photo_url: req.photo_url,
    };
    let user = database::user::create_user_if_absent(state.db.pool(), &new_user, Utc::now()).await?;
    Ok(Json(user))
}

/// List every user's public summary. No authentication.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserSummary>>> {
    let users = database::user::list_user_summaries(state.db.pool())
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "Failed to list users");
            ApiError::Internal("Failed to fetch users".to_string())
        })?;
    Ok(Json(users))
}
