//! User profile documents.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{SqliteExecutor, SqlitePool};

use crate::begin_write;
use crate::error::{DatabaseError, Result};
use crate::models::{NewUser, User, UserSummary};
use crate::validation::{validate_document_size, ValidationError};

/// Keys the server owns; client-supplied values for them are ignored.
const SERVER_KEYS: [&str; 4] = ["_id", "uid", "createdAt", "updatedAt"];

/// Get a user by uid.
pub async fn get_user(pool: &SqlitePool, uid: &str) -> Result<User> {
    fetch_user(pool, uid)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "User",
            id: uid.to_string(),
        })
}

/// Return the existing user, or create one from the login fields.
///
/// An existing user is returned unchanged.
pub async fn create_user_if_absent(
    pool: &SqlitePool,
    new_user: &NewUser,
    now: DateTime<Utc>,
) -> Result<User> {
    if let Some(existing) = fetch_user(pool, &new_user.uid).await? {
        return Ok(existing);
    }

    let user = User {
        id: new_user.uid.clone(),
        uid: new_user.uid.clone(),
        name: new_user.name.clone(),
        email: new_user.email.clone(),
        photo_url: new_user.photo_url.clone(),
        created_at: Some(now),
        updated_at: Some(now),
        ..User::default()
    };
    validate_document_size(&user)?;

    let document = serde_json::to_string(&user)?;
    sqlx::query(
        r#"
        INSERT INTO users (uid, document)
        VALUES (?, ?)
        ON CONFLICT(uid) DO NOTHING
        "#,
    )
    .bind(&user.uid)
    .bind(&document)
    .execute(pool)
    .await?;

    tracing::info!(uid = %user.uid, "Created user");

    // A concurrent login may have won the insert; return whatever is stored.
    get_user(pool, &user.uid).await
}

/// Merge `patch` into the user's document, creating it if absent.
///
/// Top-level keys in `patch` replace stored values; keys outside the profile
/// schema are dropped. The record key is always `uid`, whatever the patch
/// says. The merged document must fit within the profile size cap.
pub async fn upsert_user(
    pool: &SqlitePool,
    uid: &str,
    patch: &Map<String, Value>,
    now: DateTime<Utc>,
) -> Result<User> {
    let mut tx = begin_write(pool).await?;

    let mut document = match fetch_document(&mut *tx, uid).await? {
        Some(raw) => match serde_json::from_str::<Value>(&raw)? {
            Value::Object(map) => map,
            _ => Map::new(),
        },
        None => Map::new(),
    };
    let is_new = document.is_empty();

    for (key, value) in patch {
        if SERVER_KEYS.contains(&key.as_str()) {
            continue;
        }
        document.insert(key.clone(), value.clone());
    }

    let stamp = serde_json::to_value(now)?;
    document.insert("_id".to_string(), Value::String(uid.to_string()));
    document.insert("uid".to_string(), Value::String(uid.to_string()));
    document
        .entry("createdAt".to_string())
        .or_insert_with(|| stamp.clone());
    document.insert("updatedAt".to_string(), stamp);

    let user: User = serde_json::from_value(Value::Object(document))
        .map_err(|e| ValidationError::InvalidField(e.to_string()))?;
    validate_document_size(&user)?;

    sqlx::query(
        r#"
        INSERT INTO users (uid, document)
        VALUES (?, ?)
        ON CONFLICT(uid) DO UPDATE SET document = excluded.document
        "#,
    )
    .bind(uid)
    .bind(serde_json::to_string(&user)?)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(uid, created = is_new, "Upserted user profile");
    Ok(user)
}

/// List the public projection of every user.
pub async fn list_user_summaries(pool: &SqlitePool) -> Result<Vec<UserSummary>> {
    let documents = sqlx::query_scalar::<_, String>(
        r#"
        SELECT document
        FROM users
        ORDER BY rowid
        "#,
    )
    .fetch_all(pool)
    .await?;

    documents
        .iter()
        .map(|raw| serde_json::from_str::<UserSummary>(raw).map_err(DatabaseError::from))
        .collect()
}

/// Count total users.
pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM users
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

async fn fetch_user(pool: &SqlitePool, uid: &str) -> Result<Option<User>> {
    match fetch_document(pool, uid).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

async fn fetch_document<'e, E>(executor: E, uid: &str) -> Result<Option<String>>
where
    E: SqliteExecutor<'e>,
{
    let document = sqlx::query_scalar::<_, String>(
        r#"
        SELECT document
        FROM users
        WHERE uid = ?
        "#,
    )
    .bind(uid)
    .fetch_optional(executor)
    .await?;

    Ok(document)
}
