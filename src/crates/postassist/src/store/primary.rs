//! File-backed SQLite key/value store with sliding TTL.
//!
//! Records live in a single `records` table keyed by strings like
//! `task:{id}`. Every write resets the expiry to now + TTL, so a task stays
//! alive as long as something keeps updating it. Reads filter expired rows;
//! a delete sweep runs opportunistically on each write.

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::time::Duration;

use crate::store::StoreError;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS records (\n\
    key        TEXT PRIMARY KEY,\n\
    value      TEXT NOT NULL,\n\
    created_at INTEGER NOT NULL,\n\
    expires_at INTEGER NOT NULL\n\
)";

/// The primary (durable) record store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    ttl: Duration,
}

impl SqliteStore {
    /// Open (creating if missing) the store at the given SQLite path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the file cannot be opened
    /// or the schema cannot be created.
    pub async fn open(path: &str, ttl: Duration) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::query(SCHEMA).execute(&pool).await?;

        Ok(Self { pool, ttl })
    }

    /// Write a record, resetting its expiry.
    ///
    /// An existing row keeps its original `created_at` so listing order is
    /// stable across updates.
    pub async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let now = Utc::now().timestamp();
        let expires = now + self.ttl.as_secs() as i64;

        sqlx::query(
            "INSERT INTO records (key, value, created_at, expires_at) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(key) DO UPDATE SET value = ?2, expires_at = ?4",
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .bind(expires)
        .execute(&self.pool)
        .await?;

        self.purge_expired(now).await;
        Ok(())
    }

    /// Read a record, treating expired rows as absent.
    pub async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Utc::now().timestamp();
        let row = sqlx::query("SELECT value FROM records WHERE key = ?1 AND expires_at > ?2")
            .bind(key)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    /// List live records with the given key prefix, newest created first.
    ///
    /// `created_at` has whole-second granularity, so rows created within
    /// the same second fall back to insertion order (`rowid`, preserved
    /// across updates).
    pub async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let now = Utc::now().timestamp();
        let pattern = format!("{prefix}%");
        let rows = sqlx::query(
            "SELECT value FROM records \
             WHERE key LIKE ?1 AND expires_at > ?2 \
             ORDER BY created_at DESC, rowid DESC",
        )
        .bind(pattern)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.get::<String, _>("value")).collect())
    }

    /// Probe the backend with a trivial query.
    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn purge_expired(&self, now: i64) {
        // Sweep failures are harmless; expired rows stay filtered on read.
        if let Err(e) = sqlx::query("DELETE FROM records WHERE expires_at <= ?1")
            .bind(now)
            .execute(&self.pool)
            .await
        {
            tracing::debug!(error = %e, "expired-record sweep failed");
        }
    }
}
