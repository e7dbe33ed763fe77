//! Remote store operations
//!
//! All access to the `workers`, `worker_availability` and `skills` tables
//! goes through [`RemoteStore`]. [`Database`] implements it on SQLite via SQLx.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, QueryBuilder, Sqlite, SqlitePool};
use std::path::Path;
use std::time::Instant;

use super::models::*;
use crate::error::AppError;

const WORKER_COLUMNS: &str = "id, name, phone, location, skill, available, created_at, updated_at";

/// Table-level operations against the system of record.
///
/// Errors are returned as-is; callers decide whether to fall back to the
/// local cache or propagate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Look up a worker by phone number.
    async fn find_worker_by_phone(&self, phone: &str) -> Result<Option<Worker>, AppError>;

    /// Look up a worker by identity.
    async fn find_worker_by_id(&self, id: &str) -> Result<Option<Worker>, AppError>;

    /// Select workers matching every filter set in `query`.
    async fn query_workers(&self, query: &WorkerQuery) -> Result<Vec<Worker>, AppError>;

    /// Insert a new worker row.
    ///
    /// Returns [`AppError::Conflict`] when the id or the phone is already taken.
    async fn insert_worker(&self, worker: &Worker) -> Result<(), AppError>;

    /// Insert or overwrite the full worker row keyed by `worker.id`.
    ///
    /// Returns [`AppError::Conflict`] when another row already holds the phone.
    async fn upsert_worker(&self, worker: &Worker) -> Result<(), AppError>;

    /// Set the `available` flag on the worker holding `phone`, stamping
    /// `updated_at` with `at`.
    ///
    /// Returns `false` when no such worker exists.
    async fn set_worker_available_flag(
        &self,
        phone: &str,
        available: bool,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Insert or overwrite the availability record for its phone number.
    async fn upsert_availability(&self, record: &WorkerAvailability) -> Result<(), AppError>;

    /// Get the availability record for `phone`.
    async fn get_availability(&self, phone: &str)
    -> Result<Option<WorkerAvailability>, AppError>;

    /// List the skills lookup table, ordered by name.
    async fn list_skills(&self) -> Result<Vec<Skill>, AppError>;
}

/// Case folding shared by the stored `*_search` columns and the filters.
///
/// SQLite's `LOWER()` and `LIKE` only fold ASCII, so both sides are folded here.
fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Escape `%`, `_` and `\` and wrap the folded needle for a substring
/// `LIKE ... ESCAPE '\'` match against a `*_search` column.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in fold(needle).chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn observe<T>(operation: &str, table: &str, started: Instant, result: &Result<T, sqlx::Error>) {
    crate::metrics::observe_db_query(operation, table, result.is_ok(), started.elapsed());
}

/// Remote store connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    // =========================================================================
    // Connection
    // =========================================================================

    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!(path = %path.display(), "Remote store connected and migrated");

        Ok(Self { pool })
    }

    /// Close the pool. Subsequent queries fail with `PoolClosed`.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Count rows in `workers`.
    pub async fn count_workers(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM workers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Add a skill to the lookup table (administrative seeding).
    pub async fn insert_skill(&self, name: &str) -> Result<(), AppError> {
        sqlx::query("INSERT OR IGNORE INTO skills (name) VALUES (?)")
            .bind(name.trim())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Insert the full worker row, followed by `on_conflict` (may be empty).
    async fn write_worker(
        &self,
        worker: &Worker,
        on_conflict: &str,
    ) -> Result<sqlx::sqlite::SqliteQueryResult, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO workers (
                id, name, phone, location, skill, skill_search, location_search,
                available, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            {on_conflict}
            "#
        );
        sqlx::query(&sql)
            .bind(&worker.id)
            .bind(&worker.name)
            .bind(&worker.phone)
            .bind(&worker.location)
            .bind(&worker.skill)
            .bind(fold(&worker.skill))
            .bind(fold(&worker.location))
            .bind(worker.available)
            .bind(worker.created_at)
            .bind(worker.updated_at)
            .execute(&self.pool)
            .await
    }

    async fn find_worker_where(
        &self,
        column: &'static str,
        value: &str,
    ) -> Result<Option<Worker>, AppError> {
        let started = Instant::now();
        let sql = format!("SELECT {WORKER_COLUMNS} FROM workers WHERE {column} = ? LIMIT 1");
        let result = sqlx::query_as::<_, Worker>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await;
        observe("select", "workers", started, &result);
        Ok(result?)
    }
}

#[async_trait]
impl RemoteStore for Database {
    // =========================================================================
    // Workers
    // =========================================================================

    async fn find_worker_by_phone(&self, phone: &str) -> Result<Option<Worker>, AppError> {
        self.find_worker_where("phone", phone).await
    }

    async fn find_worker_by_id(&self, id: &str) -> Result<Option<Worker>, AppError> {
        self.find_worker_where("id", id).await
    }

    async fn query_workers(&self, query: &WorkerQuery) -> Result<Vec<Worker>, AppError> {
        let started = Instant::now();
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {WORKER_COLUMNS} FROM workers WHERE 1 = 1"
        ));

        if let Some(available) = query.available {
            builder.push(" AND available = ").push_bind(available);
        }
        if let Some(skill) = &query.skill {
            builder
                .push(" AND skill_search LIKE ")
                .push_bind(contains_pattern(skill))
                .push(" ESCAPE '\\'");
        }
        if let Some(id) = &query.id {
            builder.push(" AND id = ").push_bind(id.clone());
        }
        if let Some(phone) = &query.phone {
            builder.push(" AND phone = ").push_bind(phone.clone());
        }
        if let Some(location) = &query.location {
            builder
                .push(" AND location_search LIKE ")
                .push_bind(contains_pattern(location))
                .push(" ESCAPE '\\'");
        }
        builder.push(" ORDER BY created_at DESC, id DESC");

        let result = builder
            .build_query_as::<Worker>()
            .fetch_all(&self.pool)
            .await;
        observe("select", "workers", started, &result);
        Ok(result?)
    }

    async fn insert_worker(&self, worker: &Worker) -> Result<(), AppError> {
        let started = Instant::now();
        let result = self.write_worker(worker, "").await;
        observe("insert", "workers", started, &result);

        result
            .map(|_| ())
            .map_err(|e| AppError::from_write(e, "worker is already registered"))
    }

    async fn upsert_worker(&self, worker: &Worker) -> Result<(), AppError> {
        let started = Instant::now();
        let result = self
            .write_worker(
                worker,
                r#"
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    phone = excluded.phone,
                    location = excluded.location,
                    skill = excluded.skill,
                    skill_search = excluded.skill_search,
                    location_search = excluded.location_search,
                    available = excluded.available,
                    created_at = excluded.created_at,
                    updated_at = excluded.updated_at
                "#,
            )
            .await;
        observe("upsert", "workers", started, &result);

        result
            .map(|_| ())
            .map_err(|e| AppError::from_write(e, "phone number is already registered"))
    }

    async fn set_worker_available_flag(
        &self,
        phone: &str,
        available: bool,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let started = Instant::now();
        let result = sqlx::query("UPDATE workers SET available = ?, updated_at = ? WHERE phone = ?")
            .bind(available)
            .bind(at)
            .bind(phone)
            .execute(&self.pool)
            .await;
        observe("update", "workers", started, &result);

        Ok(result?.rows_affected() > 0)
    }

    // =========================================================================
    // Availability
    // =========================================================================

    async fn upsert_availability(&self, record: &WorkerAvailability) -> Result<(), AppError> {
        let started = Instant::now();
        let result = sqlx::query(
            r#"
            INSERT OR REPLACE INTO worker_availability (
                phone_number, is_available, available_since
            ) VALUES (?, ?, ?)
            "#,
        )
        .bind(&record.phone_number)
        .bind(record.is_available)
        .bind(record.available_since)
        .execute(&self.pool)
        .await;
        observe("upsert", "worker_availability", started, &result);

        result?;
        Ok(())
    }

    async fn get_availability(
        &self,
        phone: &str,
    ) -> Result<Option<WorkerAvailability>, AppError> {
        let started = Instant::now();
        let result = sqlx::query_as::<_, WorkerAvailability>(
            "SELECT phone_number, is_available, available_since FROM worker_availability WHERE phone_number = ?",
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await;
        observe("select", "worker_availability", started, &result);

        Ok(result?)
    }

    // =========================================================================
    // Skills
    // =========================================================================

    async fn list_skills(&self) -> Result<Vec<Skill>, AppError> {
        let started = Instant::now();
        let result = sqlx::query_as::<_, Skill>("SELECT name FROM skills ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await;
        observe("select", "skills", started, &result);

        Ok(result?)
    }
}
