//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::auth::firebase::ServiceAccount;

/// Origins allowed to make credentialed cross-origin requests by default.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "http://localhost:8080",
    "https://studlyf.in",
    "https://www.studlyf.in",
];

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Database pool size.
    pub database_pool_size: u32,
    /// Identity provider service account.
    pub service_account: ServiceAccount,
    /// Identity provider Web API key used for token lookup.
    pub firebase_api_key: String,
    /// Override for the token lookup endpoint (e.g. the Auth emulator).
    pub firebase_lookup_url: Option<String>,
    /// CORS allow-list.
    pub allowed_origins: Vec<String>,
    /// How often expired requests and messages are purged.
    pub expiry_sweep_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `HOST` | Bind host | `0.0.0.0` |
    /// | `PORT` | Bind port | `3000` |
    /// | `DATABASE_URL` | SQLite database URL | `sqlite:studlyf.db?mode=rwc` |
    /// | `DATABASE_POOL_SIZE` | Connection pool size | `20` |
    /// | `FIREBASE_SERVICE_ACCOUNT_BASE64` | Base64 service account JSON | (required) |
    /// | `FIREBASE_API_KEY` | Web API key | (required) |
    /// | `FIREBASE_LOOKUP_URL` | Token lookup endpoint | Identity Toolkit |
    /// | `CORS_ALLOWED_ORIGINS` | Comma-separated origins | see [`DEFAULT_ALLOWED_ORIGINS`] |
    /// | `EXPIRY_SWEEP_SECS` | Purge interval in seconds | `60` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let addr = format!("{}:{}", host, port)
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:studlyf.db?mode=rwc".to_string());

        let database_pool_size = parse_or("DATABASE_POOL_SIZE", database::Database::DEFAULT_POOL_SIZE)?;

        let encoded = env::var("FIREBASE_SERVICE_ACCOUNT_BASE64")
            .map_err(|_| ConfigError::Missing("FIREBASE_SERVICE_ACCOUNT_BASE64"))?;
        let service_account = ServiceAccount::from_base64(&encoded)
            .map_err(|e| ConfigError::InvalidServiceAccount(e.to_string()))?;

        let firebase_api_key =
            env::var("FIREBASE_API_KEY").map_err(|_| ConfigError::Missing("FIREBASE_API_KEY"))?;

        let firebase_lookup_url = env::var("FIREBASE_LOOKUP_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let allowed_origins = match env::var("CORS_ALLOWED_ORIGINS") {
            Ok(raw) => parse_origins(&raw),
            Err(_) => DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let sweep_secs: u64 = parse_or("EXPIRY_SWEEP_SECS", 60)?;
        if sweep_secs == 0 {
            return Err(ConfigError::Invalid("EXPIRY_SWEEP_SECS"));
        }

        Ok(Self {
            addr,
            database_url,
            database_pool_size,
            service_account,
            firebase_api_key,
            firebase_lookup_url,
            allowed_origins,
            expiry_sweep_interval: Duration::from_secs(sweep_secs),
        })
    }
}

fn parse_or<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(var)),
        Err(_) => Ok(default),
    }
}

/// Split a comma-separated origin list, dropping blanks and trailing slashes.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid HOST/PORT format")]
    InvalidAddr,

    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid value for {0}")]
    Invalid(&'static str),

    #[error("Invalid FIREBASE_SERVICE_ACCOUNT_BASE64: {0}")]
    InvalidServiceAccount(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        let origins = parse_origins(" https://a.example, ,https://b.example/ ");
        assert_eq!(origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_parse_origins_empty() {
        assert!(parse_origins("").is_empty());
    }
}
