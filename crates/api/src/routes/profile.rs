//! Profile reads and upserts.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use database::validation::validate_document_size;
use database::{DatabaseError, User};
use serde_json::{Map, Value};

use crate::auth::AuthUser;
use crate::error::Result;
use crate::routes::ApiJson;
use crate::state::AppState;

/// The caller's own profile.
pub async fn get_own_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(uid): Path<String>,
) -> Result<Json<User>> {
    auth.require(&uid)?;
    let user = database::user::get_user(state.db.pool(), &uid).await?;
    Ok(Json(user))
}

/// Any user's profile; authenticated, but not owner-restricted.
pub async fn get_public_profile(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(uid): Path<String>,
) -> Result<Json<User>> {
    let user = database::user::get_user(state.db.pool(), &uid).await?;
    Ok(Json(user))
}

/// Create or update the caller's profile.
pub async fn upsert_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(uid): Path<String>,
    ApiJson(patch): ApiJson<Map<String, Value>>,
) -> Result<Json<User>> {
    auth.require(&uid)?;
    validate_document_size(&patch).map_err(DatabaseError::from)?;

    let user = database::user::upsert_user(state.db.pool(), &uid, &patch, Utc::now()).await?;
    Ok(Json(user))
}
