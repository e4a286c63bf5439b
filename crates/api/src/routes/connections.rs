//! Connection requests and the connection list.
//!
//! A request is created by its sender (`from`) and answered by its recipient
//! (`to`); everything else is refused with 403.

use axum::extract::{Path, State};
use axum::Json;
use database::expiry::now_millis;
use database::{AcceptOutcome, Connection, ConnectionRequest};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::routes::{present, ApiJson};
use crate::state::AppState;

/// Body of request, accept, and reject calls.
#[derive(Debug, Deserialize)]
pub struct PairRequest {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

impl PairRequest {
    fn into_pair(self) -> Result<(String, String)> {
        match (present(self.from), present(self.to)) {
            (Some(from), Some(to)) => Ok((from, to)),
            _ => Err(ApiError::BadRequest("Missing from or to".to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// All connections of the caller.
pub async fn list_connections(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(uid): Path<String>,
) -> Result<Json<Vec<Connection>>> {
    auth.require(&uid)?;
    let connections = database::connection::list_connections_of(state.db.pool(), &uid).await?;
    Ok(Json(connections))
}

/// Send a connection request as `from`.
pub async fn send_request(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<PairRequest>,
) -> Result<Json<ConnectionRequest>> {
    let (from, to) = req.into_pair()?;
    auth.require(&from)?;

    let request =
        database::connection_request::create_request(state.db.pool(), &from, &to, now_millis())
            .await?;
    Ok(Json(request))
}

/// Accept a request addressed to the caller.
///
/// Succeeds without effect if the request no longer exists.
pub async fn accept_request(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<PairRequest>,
) -> Result<Json<SuccessResponse>> {
    let (from, to) = req.into_pair()?;
    auth.require(&to)?;

    let outcome =
        database::connection_request::accept_request(state.db.pool(), &from, &to, now_millis())
            .await?;
    if outcome == AcceptOutcome::NoPendingRequest {
        info!(from = %from, to = %to, "Accept for missing request ignored");
    }
    Ok(Json(SuccessResponse { success: true }))
}

/// Reject a request addressed to the caller.
pub async fn reject_request(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<PairRequest>,
) -> Result<Json<SuccessResponse>> {
    let (from, to) = req.into_pair()?;
    auth.require(&to)?;

    database::connection_request::reject_request(state.db.pool(), &from, &to).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Live requests addressed to the caller.
pub async fn list_incoming_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(uid): Path<String>,
) -> Result<Json<Vec<ConnectionRequest>>> {
    auth.require(&uid)?;
    let requests =
        database::connection_request::list_requests_to(state.db.pool(), &uid, now_millis()).await?;
    Ok(Json(requests))
}
