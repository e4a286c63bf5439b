//! Accepted connections (the friendship graph).
//!
//! Connections are write-once: they are only created by accepting a request
//! (see [`crate::connection_request::accept_request`]) and never updated or
//! removed here.

use sqlx::{SqliteExecutor, SqlitePool};

use crate::models::Connection;
use crate::Result;

/// List every connection where `uid` is either endpoint.
pub async fn list_connections_of(pool: &SqlitePool, uid: &str) -> Result<Vec<Connection>> {
    let rows = sqlx::query_as::<_, Connection>(
        r#"
        SELECT id, from_uid, to_uid, created_at, updated_at
        FROM connections
        WHERE from_uid = ? OR to_uid = ?
        "#,
    )
    .bind(uid)
    .bind(uid)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Whether `a` and `b` are connected, in either orientation.
pub async fn connection_exists<'e, E>(executor: E, a: &str, b: &str) -> Result<bool>
where
    E: SqliteExecutor<'e>,
{
    let found = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT 1
        FROM connections
        WHERE (from_uid = ? AND to_uid = ?)
           OR (from_uid = ? AND to_uid = ?)
        LIMIT 1
        "#,
    )
    .bind(a)
    .bind(b)
    .bind(b)
    .bind(a)
    .fetch_optional(executor)
    .await?;

    Ok(found.is_some())
}

/// Insert a connection unless the pair is already connected.
///
/// Returns true when a new row was written.
pub(crate) async fn insert_connection<'e, E>(
    executor: E,
    from_uid: &str,
    to_uid: &str,
    now: i64,
) -> Result<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO connections (from_uid, to_uid, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(from_uid)
    .bind(to_uid)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_list_matches_either_endpoint() {
        let db = test_db().await;
        insert_connection(db.pool(), "u1", "u2", 1).await.unwrap();
        insert_connection(db.pool(), "u3", "u1", 2).await.unwrap();
        insert_connection(db.pool(), "u2", "u3", 3).await.unwrap();

        let conns = list_connections_of(db.pool(), "u1").await.unwrap();
        assert_eq!(conns.len(), 2);
        assert!(conns.iter().all(|c| c.involves("u1")));

        let none = list_connections_of(db.pool(), "u9").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_exists_checks_both_orientations() {
        let db = test_db().await;
        insert_connection(db.pool(), "u1", "u2", 1).await.unwrap();

        assert!(connection_exists(db.pool(), "u1", "u2").await.unwrap());
        assert!(connection_exists(db.pool(), "u2", "u1").await.unwrap());
        assert!(!connection_exists(db.pool(), "u1", "u3").await.unwrap());
    }

    #[tokio::test]
    async fn test_pair_is_unique_regardless_of_orientation() {
        let db = test_db().await;
        assert!(insert_connection(db.pool(), "u1", "u2", 1).await.unwrap());
        assert!(!insert_connection(db.pool(), "u1", "u2", 2).await.unwrap());
        assert!(!insert_connection(db.pool(), "u2", "u1", 3).await.unwrap());

        let conns = list_connections_of(db.pool(), "u1").await.unwrap();
        assert_eq!(conns.len(), 1);
        assert_eq!(conns[0].from_uid, "u1");
        assert_eq!(conns[0].to_uid, "u2");
    }
}
