//! Direct messaging. Not gated on connection state.

use axum::extract::{Path, State};
use axum::Json;
use database::expiry::now_millis;
use database::Message;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::routes::{present, ApiJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Send a message as `from`.
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<SendMessageRequest>,
) -> Result<Json<Message>> {
    let (from, to, text) = match (present(req.from), present(req.to), present(req.text)) {
        (Some(from), Some(to), Some(text)) => (from, to, text),
        _ => return Err(ApiError::BadRequest("Missing from, to, or text".to_string())),
    };
    auth.require(&from)?;

    let message =
        database::message::send_message(state.db.pool(), &from, &to, &text, now_millis()).await?;
    Ok(Json(message))
}

/// The conversation between two users; the caller must be one of them.
pub async fn list_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((uid1, uid2)): Path<(String, String)>,
) -> Result<Json<Vec<Message>>> {
    auth.require_any(&[&uid1, &uid2])?;
    let messages =
        database::message::list_conversation(state.db.pool(), &uid1, &uid2, now_millis()).await?;
    Ok(Json(messages))
}
