//! HTTP API for the StudLyf student network.
//!
//! Serves profiles, the connection graph, connection requests, and direct
//! messages over JSON, authenticated with Firebase ID tokens.

mod auth;
mod config;
mod cors;
mod error;
mod routes;
mod state;
mod sweeper;

use std::sync::Arc;

use database::Database;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::auth::firebase::FirebaseVerifier;
use crate::auth::IdentityVerifier;
use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting StudLyf API server");

    // Connect to database
    let db = Database::connect_with_pool_size(&config.database_url, config.database_pool_size).await?;
    db.migrate().await?;
    let users = database::user::count_users(db.pool()).await?;
    info!(users, "Database ready");

    // Identity provider
    let mut verifier = FirebaseVerifier::new(&config.service_account, config.firebase_api_key.clone());
    if let Some(url) = &config.firebase_lookup_url {
        verifier = verifier.with_lookup_url(url.clone());
    }
    info!(
        verifier = verifier.name(),
        project_id = %config.service_account.project_id,
        client_email = config.service_account.client_email.as_deref().unwrap_or("-"),
        "Identity verifier ready"
    );

    let sweeper = sweeper::spawn_expiry_sweeper(db.clone(), config.expiry_sweep_interval);

    // Build application state
    info!(origins = ?config.allowed_origins, "CORS allow-list");
    let state = AppState::new(db.clone(), Arc::new(verifier), config.allowed_origins.clone());
    let app = routes::app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    sweeper.abort();
    db.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
