//! Two-tier task status store.
//!
//! [`TaskStore`] fronts a durable SQLite backend and a volatile in-process
//! map. Writes go to the primary and degrade silently to the fallback when
//! the primary is unavailable: callers of the store never see a
//! [`StoreError::Unavailable`], status reporting just loses durability.
//! Reads check the primary first, then the fallback.
//!
//! Updates are read-modify-write with no compare-and-swap; the single
//! writer per task (the runner) makes the lost-update window acceptable.
//! The one rule enforced here is forward-only status: a record that has
//! reached a terminal state cannot be overwritten by a non-terminal one
//! through [`TaskStore::put_task`].

pub mod memory;
pub mod primary;

use std::time::Duration;

use thiserror::Error;

use crate::models::{BatchRecord, TaskRecord};

pub use memory::MemoryStore;
pub use primary::SqliteStore;

/// Key prefix for task records.
const TASK_PREFIX: &str = "task:";

/// Key prefix for batch records.
const BATCH_PREFIX: &str = "batch:";

/// Store-layer errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The durable backend cannot be reached. Recovered internally by
    /// falling back to the in-process map; callers should not see this.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A record failed to (de)serialize.
    #[error("record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Facade over the primary and fallback stores.
pub struct TaskStore {
    primary: Option<SqliteStore>,
    fallback: MemoryStore,
}

impl TaskStore {
    /// Open the store at the given SQLite path.
    ///
    /// Never fails: when the file backend cannot be opened the store starts
    /// degraded, serving from the in-process fallback only.
    pub async fn open(path: &str, ttl: Duration) -> Self {
        let primary = match SqliteStore::open(path, ttl).await {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::warn!(path, error = %e, "primary store unavailable, using in-memory fallback");
                None
            }
        };
        Self {
            primary,
            fallback: MemoryStore::new(),
        }
    }

    /// A store with no durable backend, for tests.
    pub fn volatile() -> Self {
        Self {
            primary: None,
            fallback: MemoryStore::new(),
        }
    }

    /// Whether the durable backend is up.
    pub async fn primary_available(&self) -> bool {
        match &self.primary {
            Some(store) => store.health_check().await.is_ok(),
            None => false,
        }
    }

    /// Write a task record, refusing terminal downgrades.
    ///
    /// When the stored record is already terminal and the incoming one is
    /// not (a late projector update racing the terminal write), the write
    /// is dropped.
    ///
    /// # Errors
    ///
    /// Only serialization can fail; backend unavailability degrades to the
    /// fallback.
    pub async fn put_task(&self, record: &TaskRecord) -> Result<(), StoreError> {
        if let Some(current) = self.get_task(&record.task_id).await? {
            if current.status.is_terminal() && !record.status.is_terminal() {
                tracing::debug!(
                    task_id = %record.task_id,
                    "dropping non-terminal update to terminal task"
                );
                return Ok(());
            }
        }
        self.put_task_unchecked(record).await
    }

    /// Write a task record without the terminal-downgrade check.
    ///
    /// Administrative override: allows re-opening or cancelling a task that
    /// already reached a terminal state.
    pub async fn put_task_unchecked(&self, record: &TaskRecord) -> Result<(), StoreError> {
        let key = format!("{TASK_PREFIX}{}", record.task_id);
        let value = serde_json::to_string(record)?;
        self.put_raw(&key, &value).await;
        Ok(())
    }

    /// Read a task record.
    pub async fn get_task(&self, task_id: &str) -> Result<Option<TaskRecord>, StoreError> {
        let key = format!("{TASK_PREFIX}{task_id}");
        match self.get_raw(&key).await {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    /// All live task records, newest created first.
    ///
    /// Merges primary and fallback; when a task exists in both the primary
    /// copy wins.
    pub async fn list_tasks(&self) -> Result<Vec<TaskRecord>, StoreError> {
        let mut records: Vec<TaskRecord> = Vec::new();

        if let Some(primary) = &self.primary {
            match primary.list(TASK_PREFIX).await {
                Ok(values) => {
                    for value in values {
                        records.push(serde_json::from_str(&value)?);
                    }
                }
                Err(e) => tracing::warn!(error = %e, "primary store list failed"),
            }
        }

        for value in self.fallback.list(TASK_PREFIX) {
            let record: TaskRecord = serde_json::from_str(&value)?;
            if !records.iter().any(|r| r.task_id == record.task_id) {
                records.push(record);
            }
        }

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    /// Write a batch record.
    pub async fn put_batch(&self, record: &BatchRecord) -> Result<(), StoreError> {
        let key = format!("{BATCH_PREFIX}{}", record.batch_id);
        let value = serde_json::to_string(record)?;
        self.put_raw(&key, &value).await;
        Ok(())
    }

    /// Read a batch record.
    pub async fn get_batch(&self, batch_id: &str) -> Result<Option<BatchRecord>, StoreError> {
        let key = format!("{BATCH_PREFIX}{batch_id}");
        match self.get_raw(&key).await {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    async fn put_raw(&self, key: &str, value: &str) {
        if let Some(primary) = &self.primary {
            match primary.put(key, value).await {
                Ok(()) => return,
                Err(e) => {
                    tracing::warn!(key, error = %e, "primary store write failed, using fallback")
                }
            }
        }
        self.fallback.put(key, value);
    }

    async fn get_raw(&self, key: &str) -> Option<String> {
        if let Some(primary) = &self.primary {
            match primary.get(key).await {
                Ok(Some(value)) => return Some(value),
                Ok(None) => {}
                Err(e) => tracing::warn!(key, error = %e, "primary store read failed"),
            }
        }
        self.fallback.get(key)
    }
}
