//! Database module for persistent storage.
//!
//! Provides async SQLite access using SQLx for:
//! - Karma subjects and their vote tallies
//! - Per-user attribute key/value pairs
//! - Per-user saved dice rolls
//! - The shared initiative order
//!
//! Repositories borrow the pool and map unique-constraint violations to
//! [`DbError::Duplicate`] so handlers can report conflicts without
//! inspecting driver errors.

mod attrs;
mod initiative;
mod karma;
mod rolls;

pub use attrs::{AttrRepository, Attribute};
pub use initiative::{InitiativeEntry, InitiativeRepository};
pub use karma::{KarmaEntry, KarmaRepository};
pub use rolls::{RollRepository, SavedRoll};

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("already exists: {0}")]
    Duplicate(String),
    #[error("not found: {0}")]
    NotFound(String),
}

impl DbError {
    /// Map a driver error, converting unique-constraint violations to
    /// [`DbError::Duplicate`] for the given key.
    fn from_insert(e: sqlx::Error, key: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Duplicate(key.to_string());
        }
        Self::from(e)
    }
}

/// Database handle with connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connection acquire timeout - prevents connection storms from blocking indefinitely.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Maximum time a connection can remain idle before being closed.
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create a new database connection, running migrations if needed.
    pub async fn new(path: &str) -> Result<Self, DbError> {
        let pool = if path == ":memory:" {
            // Use a uniquely named shared-cache memory database per call.
            // `file::memory:` is global-ish and will collide across parallel tests.
            let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
            let memdb_uri = format!(
                "file:tavernd-memdb-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                id
            );

            let options = SqliteConnectOptions::new()
                .filename(&memdb_uri)
                .shared_cache(true)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(1)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .test_before_acquire(true)
                .connect_with(options)
                .await?
        } else {
            if let Some(parent) = Path::new(path).parent()
                && !parent.as_os_str().is_empty()
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                tracing::warn!(path = %parent.display(), error = %e, "Failed to create database directory");
            }

            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .test_before_acquire(true)
                .connect_with(options)
                .await?
        };

        info!(path = %path, "Database connected");

        Self::run_migrations(&pool).await?;

        // WAL mode allows reads while writes are in progress
        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&pool)
            .await?;
        sqlx::query("PRAGMA foreign_keys=ON").execute(&pool).await?;

        Ok(Self { pool })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations checked/applied");
        Ok(())
    }

    /// Get karma repository.
    pub fn karma(&self) -> KarmaRepository<'_> {
        KarmaRepository::new(&self.pool)
    }

    /// Get attribute repository.
    pub fn attrs(&self) -> AttrRepository<'_> {
        AttrRepository::new(&self.pool)
    }

    /// Get saved-roll repository.
    pub fn rolls(&self) -> RollRepository<'_> {
        RollRepository::new(&self.pool)
    }

    /// Get initiative repository.
    pub fn initiative(&self) -> InitiativeRepository<'_> {
        InitiativeRepository::new(&self.pool)
    }
}
