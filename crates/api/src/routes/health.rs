//! Liveness endpoints.

use axum::extract::State;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct Health {
    pub status: String,
    pub timestamp: String,
    pub cors: CorsInfo,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsInfo {
    pub allowed_origins: Vec<String>,
}

pub async fn root() -> &'static str {
    "StudLyf Backend API is running!"
}

pub async fn root_alias() -> &'static str {
    "StudLyf Backend API is running! (root endpoint)"
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "OK".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        cors: CorsInfo {
            allowed_origins: state.allowed_origins.to_vec(),
        },
    })
}
