//! Connection request lifecycle: none -> pending -> accepted | rejected | expired.
//!
//! A request is keyed by the ordered pair `(from, to)`. Creation and
//! acceptance each run in one write-locked transaction, so concurrent
//! submissions for a pair are serialized rather than failed. The unique
//! constraints on `connection_requests(from_uid, to_uid)` and on the unordered
//! connection pair back this up at the schema level.

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};

use crate::begin_write;
use crate::connection::{connection_exists, insert_connection};
use crate::error::{map_unique_violation, DatabaseError, Result};
use crate::expiry::{cutoff, REQUEST_TTL};
use crate::models::ConnectionRequest;

/// Result of accepting a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// The pending request was consumed and the pair is now connected.
    Accepted,
    /// No live request existed for the pair; nothing changed.
    NoPendingRequest,
}

fn pair_id(from: &str, to: &str) -> String {
    format!("{} -> {}", from, to)
}

/// Create a pending request from `from` to `to`.
///
/// Fails with `AlreadyExists` when a live request for the same ordered pair
/// exists, and with `AlreadyConnected` when the pair is connected in either
/// orientation. An expired request that has not been purged yet is replaced.
pub async fn create_request(
    pool: &SqlitePool,
    from: &str,
    to: &str,
    now: i64,
) -> Result<ConnectionRequest> {
    let mut tx = begin_write(pool).await?;
    let live_after = cutoff(now, REQUEST_TTL);

    sqlx::query(
        r#"
        DELETE FROM connection_requests
        WHERE from_uid = ? AND to_uid = ? AND created_at <= ?
        "#,
    )
    .bind(from)
    .bind(to)
    .bind(live_after)
    .execute(&mut *tx)
    .await?;

    if find_pending(&mut *tx, from, to, now).await?.is_some() {
        return Err(DatabaseError::AlreadyExists {
            entity: "ConnectionRequest",
            id: pair_id(from, to),
        });
    }

    if connection_exists(&mut *tx, from, to).await? {
        return Err(DatabaseError::AlreadyConnected {
            a: from.to_string(),
            b: to.to_string(),
        });
    }

    let request = sqlx::query_as::<_, ConnectionRequest>(
        r#"
        INSERT INTO connection_requests (from_uid, to_uid, created_at)
        VALUES (?, ?, ?)
        RETURNING id, from_uid, to_uid, created_at
        "#,
    )
    .bind(from)
    .bind(to)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| map_unique_violation(e, "ConnectionRequest", || pair_id(from, to)))?;

    tx.commit().await?;

    info!(from, to, id = request.id, "Connection request created");
    Ok(request)
}

/// Accept the pending request `(from, to)`.
///
/// Creates the connection `(from, to)` and removes the request in one
/// transaction. A missing or expired request is a no-op and never creates a
/// connection.
pub async fn accept_request(
    pool: &SqlitePool,
    from: &str,
    to: &str,
    now: i64,
) -> Result<AcceptOutcome> {
    let mut tx = begin_write(pool).await?;

    let consumed = sqlx::query_scalar::<_, i64>(
        r#"
        DELETE FROM connection_requests
        WHERE from_uid = ? AND to_uid = ? AND created_at > ?
        RETURNING id
        "#,
    )
    .bind(from)
    .bind(to)
    .bind(cutoff(now, REQUEST_TTL))
    .fetch_optional(&mut *tx)
    .await?;

    let Some(request_id) = consumed else {
        debug!(from, to, "No pending request to accept");
        return Ok(AcceptOutcome::NoPendingRequest);
    };

    let created = insert_connection(&mut *tx, from, to, now).await?;
    tx.commit().await?;

    info!(from, to, request_id, new_connection = created, "Connection request accepted");
    Ok(AcceptOutcome::Accepted)
}

/// Reject (delete) the request `(from, to)`.
///
/// Returns true if a request was removed.
pub async fn reject_request(pool: &SqlitePool, from: &str, to: &str) -> Result<bool> {
    let removed = delete_pair(pool, from, to).await?;
    if removed {
        info!(from, to, "Connection request rejected");
    }
    Ok(removed)
}

/// List live requests addressed to `uid`, oldest first.
pub async fn list_requests_to(
    pool: &SqlitePool,
    uid: &str,
    now: i64,
) -> Result<Vec<ConnectionRequest>> {
    let rows = sqlx::query_as::<_, ConnectionRequest>(
        r#"
        SELECT id, from_uid, to_uid, created_at
        FROM connection_requests
        WHERE to_uid = ? AND created_at > ?
        ORDER BY created_at, id
        "#,
    )
    .bind(uid)
    .bind(cutoff(now, REQUEST_TTL))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

async fn find_pending<'e, E>(
    executor: E,
    from: &str,
    to: &str,
    now: i64,
) -> Result<Option<ConnectionRequest>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, ConnectionRequest>(
        r#"
        SELECT id, from_uid, to_uid, created_at
        FROM connection_requests
        WHERE from_uid = ? AND to_uid = ? AND created_at > ?
        "#,
    )
    .bind(from)
    .bind(to)
    .bind(cutoff(now, REQUEST_TTL))
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

async fn delete_pair<'e, E>(executor: E, from: &str, to: &str) -> Result<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        DELETE FROM connection_requests
        WHERE from_uid = ? AND to_uid = ?
        "#,
    )
    .bind(from)
    .bind(to)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
