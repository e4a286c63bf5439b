//! Direct messages.
//!
//! Sending is not gated on the users being connected. Each message expires
//! [`MESSAGE_TTL`] after its own creation.

use sqlx::SqlitePool;

use crate::expiry::{cutoff, MESSAGE_TTL};
use crate::models::Message;
use crate::validation::validate_text;
use crate::Result;

/// Append a message from `from` to `to`.
pub async fn send_message(
    pool: &SqlitePool,
    from: &str,
    to: &str,
    text: &str,
    now: i64,
) -> Result<Message> {
    validate_text("text", text)?;

    let message = sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (from_uid, to_uid, text, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, from_uid, to_uid, text, created_at
        "#,
    )
    .bind(from)
    .bind(to)
    .bind(text)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(message)
}

/// List the live conversation between `a` and `b` in both directions,
/// oldest first.
pub async fn list_conversation(
    pool: &SqlitePool,
    a: &str,
    b: &str,
    now: i64,
) -> Result<Vec<Message>> {
    let rows = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, from_uid, to_uid, text, created_at
        FROM messages
        WHERE ((from_uid = ? AND to_uid = ?) OR (from_uid = ? AND to_uid = ?))
          AND created_at > ?
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(a)
    .bind(b)
    .bind(b)
    .bind(a)
    .bind(cutoff(now, MESSAGE_TTL))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
