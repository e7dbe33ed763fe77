//! Device-local key/value cache
//!
//! Small JSON values under fixed keys, persisted in a local SQLite file and
//! fronted by a Moka in-memory layer for reads. Last writer wins; there is no
//! transaction across keys.

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::AppError;

// =============================================================================
// Keys
// =============================================================================

/// Fixed cache keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Worker profile (JSON `Worker`)
    WorkerProfile,
    /// Availability blob (JSON `WorkerAvailability`)
    WorkerAvailable,
    /// When the worker started waiting for work (RFC 3339)
    WaitingStartTime,
    /// Hirer location (plain string)
    HirerLocation,
    /// Selected role (`worker` / `hirer`)
    SelectedRole,
    /// Selected locale code
    Language,
}

impl CacheKey {
    /// Keys that belong to the signed-in worker.
    pub const WORKER_KEYS: [CacheKey; 3] = [
        CacheKey::WorkerProfile,
        CacheKey::WorkerAvailable,
        CacheKey::WaitingStartTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorkerProfile => "worker_profile",
            Self::WorkerAvailable => "worker_available",
            Self::WaitingStartTime => "waiting_start_time",
            Self::HirerLocation => "hirer_location",
            Self::SelectedRole => "selected_role",
            Self::Language => "language",
        }
    }
}

fn cache_error(context: &str, key: CacheKey, error: sqlx::Error) -> AppError {
    tracing::error!(key = key.as_str(), %error, "{context}");
    AppError::Cache(format!("{context} ({}): {error}", key.as_str()))
}

// =============================================================================
// Local Cache
// =============================================================================

/// Persistent device cache
pub struct LocalCache {
    pool: Pool<Sqlite>,
    /// Key -> raw stored string
    memory: Cache<CacheKey, Arc<String>>,
    /// Held while the memory layer is filled from the file or a write lands,
    /// so the memory layer only ever moves forward with the file.
    sync_lock: Mutex<()>,
}

impl LocalCache {
    /// Open (or create) the cache file at `path`.
    ///
    /// # Arguments
    /// * `path` - SQLite file holding the entries
    /// * `memory_capacity` - Maximum entries kept in the in-memory layer
    pub async fn open(path: &Path, memory_capacity: u64) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Cache(format!("failed to create cache directory: {e}")))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string)
            .await
            .map_err(|e| AppError::Cache(format!("failed to open cache: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| AppError::Cache(format!("failed to initialize cache: {e}")))?;

        let memory = Cache::builder().max_capacity(memory_capacity).build();

        tracing::info!(path = %path.display(), "Local cache opened");

        Ok(Self {
            pool,
            memory,
            sync_lock: Mutex::new(()),
        })
    }

    /// Close the backing file. Later reads and writes fail.
    pub async fn close(&self) {
        self.pool.close().await;
        self.memory.invalidate_all();
    }

    /// Get the raw stored string for `key`.
    pub async fn get_raw(&self, key: CacheKey) -> Result<Option<String>, AppError> {
        use crate::metrics::{CACHE_HITS_TOTAL, CACHE_MISSES_TOTAL};

        if let Some(value) = self.memory.get(&key).await {
            CACHE_HITS_TOTAL.with_label_values(&[key.as_str()]).inc();
            return Ok(Some(value.as_ref().clone()));
        }

        let _guard = self.sync_lock.lock().await;
        if let Some(value) = self.memory.get(&key).await {
            CACHE_HITS_TOTAL.with_label_values(&[key.as_str()]).inc();
            return Ok(Some(value.as_ref().clone()));
        }

        let value = sqlx::query_scalar::<_, String>("SELECT value FROM cache_entries WHERE key = ?")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| cache_error("Failed to read cache entry", key, e))?;

        match value {
            Some(value) => {
                CACHE_HITS_TOTAL.with_label_values(&[key.as_str()]).inc();
                self.memory.insert(key, Arc::new(value.clone())).await;
                Ok(Some(value))
            }
            None => {
                CACHE_MISSES_TOTAL.with_label_values(&[key.as_str()]).inc();
                Ok(None)
            }
        }
    }

    /// Get and parse the JSON value under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent or the stored value does not
    /// parse as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: CacheKey) -> Result<Option<T>, AppError> {
        let Some(raw) = self.get_raw(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<T>(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(error) => {
                tracing::warn!(key = key.as_str(), %error, "Ignoring malformed cache entry");
                Ok(None)
            }
        }
    }

    /// Store a raw string under `key`.
    pub async fn set_raw(&self, key: CacheKey, value: &str) -> Result<(), AppError> {
        let _guard = self.sync_lock.lock().await;
        sqlx::query("INSERT OR REPLACE INTO cache_entries (key, value, updated_at) VALUES (?, ?, ?)")
            .bind(key.as_str())
            .bind(value)
            .bind(chrono::Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| cache_error("Failed to write cache entry", key, e))?;

        self.memory.insert(key, Arc::new(value.to_string())).await;

        use crate::metrics::CACHE_SIZE;
        CACHE_SIZE
            .with_label_values(&["local"])
            .set(self.memory.entry_count() as i64);

        Ok(())
    }

    /// Serialize `value` as JSON and store it under `key`.
    pub async fn set<T: Serialize + ?Sized>(&self, key: CacheKey, value: &T) -> Result<(), AppError> {
        let raw = serde_json::to_string(value)?;
        self.set_raw(key, &raw).await
    }

    /// Remove `key`. Removing an absent key succeeds.
    pub async fn remove(&self, key: CacheKey) -> Result<(), AppError> {
        let _guard = self.sync_lock.lock().await;
        let result = sqlx::query("DELETE FROM cache_entries WHERE key = ?")
            .bind(key.as_str())
            .execute(&self.pool)
            .await;
        self.memory.invalidate(&key).await;

        result.map_err(|e| cache_error("Failed to remove cache entry", key, e))?;
        Ok(())
    }

    /// Remove every key in `keys`.
    ///
    /// Every key is attempted even after a failure; the first failure is
    /// returned.
    pub async fn remove_many(&self, keys: &[CacheKey]) -> Result<(), AppError> {
        let mut first_error = None;
        for key in keys {
            if let Err(error) = self.remove(*key).await {
                first_error.get_or_insert(error);
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
