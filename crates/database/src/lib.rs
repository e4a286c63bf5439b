//! SQLite persistence layer for the StudLyf backend.
//!
//! This crate provides async database operations for user profiles, the
//! connection graph, pending connection requests, and direct messages using
//! SQLx with SQLite. Requests and messages carry a 24 hour time-to-live (see
//! [`expiry`]).
//!
//! ```no_run
//! use database::{connection_request, expiry, Database};
//!
//! # async fn run() -> database::Result<()> {
//! let db = Database::connect("sqlite:studlyf.db?mode=rwc").await?;
//! db.migrate().await?;
//!
//! let now = expiry::now_millis();
//! connection_request::create_request(db.pool(), "uid-a", "uid-b", now).await?;
//! connection_request::accept_request(db.pool(), "uid-a", "uid-b", now).await?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod connection_request;
pub mod error;
pub mod expiry;
pub mod message;
pub mod models;
pub mod user;
pub mod validation;

pub use connection_request::AcceptOutcome;
pub use error::{DatabaseError, Result};
pub use expiry::PurgeStats;
pub use models::{Connection, ConnectionRequest, Message, NewUser, User, UserSummary};
pub use validation::ValidationError;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};

/// How long a writer waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the StudLyf store.
///
/// Clones share one pool; pass it to every component that needs storage.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub const DEFAULT_POOL_SIZE: u32 = 20;

    /// Open `url` with [`Self::DEFAULT_POOL_SIZE`] connections.
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// let db = database::Database::connect("sqlite:data/studlyf.db?mode=rwc").await?;
    /// let scratch = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Open `url` with at most `pool_size` connections.
    ///
    /// File databases run in WAL mode so readers never block the single
    /// writer. The file is created if missing.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);
        if !url.contains(":memory:") {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size.max(1))
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(url, pool_size, "Database pool open");
        Ok(Self { pool })
    }

    /// Apply pending schema migrations. Safe to call on every boot.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Schema up to date");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Wait for in-flight queries and close every connection.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}

/// Start a transaction that holds the write lock from its first statement.
///
/// Read-then-write transactions must use this: a deferred transaction that
/// upgrades from a read to a write fails with `SQLITE_BUSY` immediately when
/// another writer got there first, bypassing the busy timeout.
pub(crate) async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}
