//! Time-to-live handling for connection requests and messages.
//!
//! Reads filter out rows at or past their TTL, so an expired row is never
//! observed even if [`purge_expired`] has not run yet. The purge only reclaims
//! space.

use std::time::Duration;

use sqlx::SqlitePool;

use crate::Result;

/// Lifetime of a pending connection request.
pub const REQUEST_TTL: Duration = Duration::from_secs(86_400);

/// Lifetime of a single message.
pub const MESSAGE_TTL: Duration = Duration::from_secs(86_400);

/// Current wall-clock time in Unix milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Oldest `created_at` (exclusive) still alive at `now` for the given TTL.
pub fn cutoff(now: i64, ttl: Duration) -> i64 {
    now - ttl.as_millis() as i64
}

/// Whether a row created at `created_at` has outlived `ttl` at `now`.
pub fn is_expired(created_at: i64, now: i64, ttl: Duration) -> bool {
    created_at <= cutoff(now, ttl)
}

/// Rows removed by a purge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeStats {
    pub requests: u64,
    pub messages: u64,
}

impl PurgeStats {
    pub fn total(&self) -> u64 {
        self.requests + self.messages
    }
}

/// Delete every connection request and message that has expired at `now`.
pub async fn purge_expired(pool: &SqlitePool, now: i64) -> Result<PurgeStats> {
    let requests = sqlx::query(
        r#"
        DELETE FROM connection_requests
        WHERE created_at <= ?
        "#,
    )
    .bind(cutoff(now, REQUEST_TTL))
    .execute(pool)
    .await?
    .rows_affected();

    let messages = sqlx::query(
        r#"
        DELETE FROM messages
        WHERE created_at <= ?
        "#,
    )
    .bind(cutoff(now, MESSAGE_TTL))
    .execute(pool)
    .await?
    .rows_affected();

    Ok(PurgeStats { requests, messages })
}
