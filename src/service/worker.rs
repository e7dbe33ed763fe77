//! Worker service
//!
//! Registration, profile lookup, availability toggling and worker discovery.
//! Reads go to the local cache first; writes go to the remote store first and
//! are mirrored into the cache once accepted.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::data::{
    CacheKey, EntityId, LocalCache, NewWorker, ProfileStore, RemoteStore, Skill, SyncOutcome,
    Worker, WorkerAvailability, WorkerQuery,
};
use crate::error::AppError;
use crate::metrics::{AVAILABILITY_CHANGES_TOTAL, WORKER_REGISTRATIONS_TOTAL};

fn require_phone(phone: &str) -> Result<&str, AppError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(AppError::Validation("phone cannot be empty".to_string()));
    }
    Ok(phone)
}

/// Worker service
pub struct WorkerService {
    remote: Arc<dyn RemoteStore>,
    cache: Arc<LocalCache>,
    profiles: ProfileStore,
}

impl WorkerService {
    /// Create new worker service
    pub fn new(remote: Arc<dyn RemoteStore>, cache: Arc<LocalCache>, profiles: ProfileStore) -> Self {
        Self {
            remote,
            cache,
            profiles,
        }
    }

    // =========================================================================
    // Registration and profile
    // =========================================================================

    /// Register a new worker
    ///
    /// # Errors
    /// - `Validation` if name, phone, location or skill is blank; no store is touched
    /// - `Conflict` if the phone number or the supplied id is already
    ///   registered; nothing is written
    pub async fn register_worker(&self, input: NewWorker) -> Result<Worker, AppError> {
        let name = input.name.trim();
        let phone = input.phone.trim();
        let location = input.location.trim();
        let skill = input.skill.trim();

        let missing: Vec<&str> = [
            ("name", name),
            ("phone", phone),
            ("location", location),
            ("skill", skill),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();
        if !missing.is_empty() {
            WORKER_REGISTRATIONS_TOTAL
                .with_label_values(&["invalid"])
                .inc();
            return Err(AppError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        // Check-then-act; the unique index on workers.phone catches a lost race.
        if self.remote.find_worker_by_phone(phone).await?.is_some() {
            WORKER_REGISTRATIONS_TOTAL
                .with_label_values(&["conflict"])
                .inc();
            return Err(AppError::Conflict(
                "phone number is already registered".to_string(),
            ));
        }

        let supplied_id = input
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());
        if let Some(id) = supplied_id {
            if self.remote.find_worker_by_id(id).await?.is_some() {
                WORKER_REGISTRATIONS_TOTAL
                    .with_label_values(&["conflict"])
                    .inc();
                return Err(AppError::Conflict(
                    "worker id is already registered".to_string(),
                ));
            }
        }
        let id = supplied_id
            .map(str::to_string)
            .unwrap_or_else(|| EntityId::new().0);

        let now = Utc::now();
        let worker = Worker {
            id,
            name: name.to_string(),
            phone: phone.to_string(),
            location: location.to_string(),
            skill: skill.to_string(),
            available: input.available,
            created_at: now,
            updated_at: now,
        };

        if let Err(error) = self.profiles.create(&worker).await {
            let status = if matches!(error, AppError::Conflict(_)) {
                "conflict"
            } else {
                "error"
            };
            WORKER_REGISTRATIONS_TOTAL.with_label_values(&[status]).inc();
            return Err(error);
        }

        if worker.available {
            self.mark_available(&worker.phone, now).await?;
        }

        WORKER_REGISTRATIONS_TOTAL
            .with_label_values(&["success"])
            .inc();
        tracing::info!(
            worker_id = %worker.id,
            phone = %worker.phone,
            available = worker.available,
            "Worker registered"
        );

        Ok(worker)
    }

    /// Get the worker profile
    ///
    /// Without `phone`, returns the cached profile without a remote call.
    /// With `phone`, a matching cached profile is returned as-is; otherwise
    /// the cache is discarded and the remote row (if any) replaces it.
    ///
    /// # Errors
    /// Returns the remote error when the lookup fails and no usable cached
    /// profile exists.
    pub async fn get_worker_profile(&self, phone: Option<&str>) -> Result<Option<Worker>, AppError> {
        let cached = match self.profiles.cached().await {
            Ok(cached) => cached,
            Err(error) => {
                tracing::warn!(%error, "Cached profile unreadable; treating as miss");
                None
            }
        };

        let Some(phone) = phone.map(str::trim).filter(|p| !p.is_empty()) else {
            return Ok(cached);
        };

        if let Some(worker) = &cached {
            if worker.phone == phone {
                return Ok(cached);
            }
            if let Err(error) = self.profiles.forget().await {
                tracing::warn!(%error, "Failed to discard stale cached profile");
            }
        }

        match self.profiles.fetch_remote(phone).await {
            Ok(Some(worker)) => {
                if let Err(error) = self.profiles.cache(&worker).await {
                    tracing::warn!(%error, phone = %phone, "Failed to cache fetched profile");
                }
                Ok(Some(worker))
            }
            Ok(None) => Ok(None),
            Err(error) => {
                tracing::warn!(%error, phone = %phone, "Remote profile lookup failed");
                Err(error)
            }
        }
    }

    /// Reconcile the cached profile for `phone` with the remote store.
    pub async fn sync_profile(&self, phone: &str) -> Result<SyncOutcome, AppError> {
        let phone = require_phone(phone)?;
        self.profiles.sync(phone).await
    }

    /// Reconcile whichever profile is currently cached.
    ///
    /// Returns `None` when nothing is cached.
    pub async fn sync_cached_profile(&self) -> Result<Option<SyncOutcome>, AppError> {
        let Some(worker) = self.profiles.cached().await? else {
            return Ok(None);
        };
        self.profiles.sync(&worker.phone).await.map(Some)
    }

    /// Clear every cached worker key (profile, availability, waiting time).
    pub async fn sign_out(&self) -> Result<(), AppError> {
        self.cache.remove_many(&CacheKey::WORKER_KEYS).await?;
        tracing::info!("Worker signed out; cached worker data cleared");
        Ok(())
    }

    // =========================================================================
    // Availability
    // =========================================================================

    /// Mark the worker holding `phone` available from now.
    ///
    /// # Errors
    /// `NotFound` if no worker holds `phone`; nothing is written.
    pub async fn set_worker_available(&self, phone: &str) -> Result<WorkerAvailability, AppError> {
        let phone = require_phone(phone)?;
        self.mark_available(phone, Utc::now()).await
    }

    /// Clear availability for the worker holding `phone`.
    ///
    /// # Errors
    /// `NotFound` if no worker holds `phone`; nothing is written.
    pub async fn set_worker_unavailable(&self, phone: &str) -> Result<(), AppError> {
        let phone = require_phone(phone)?;
        let at = Utc::now();

        if !self.remote.set_worker_available_flag(phone, false, at).await? {
            tracing::debug!(phone = %phone, "No worker row to flag unavailable");
            return Err(AppError::NotFound);
        }
        self.remote
            .upsert_availability(&WorkerAvailability::cleared(phone))
            .await?;

        self.cache
            .remove_many(&[CacheKey::WorkerAvailable, CacheKey::WaitingStartTime])
            .await?;
        self.mirror_profile_flag(phone, false, at).await?;

        AVAILABILITY_CHANGES_TOTAL
            .with_label_values(&["unavailable"])
            .inc();
        tracing::info!(phone = %phone, "Worker marked unavailable");

        Ok(())
    }

    /// Whether the cached availability record says the worker is available.
    pub async fn is_worker_available(&self) -> Result<bool, AppError> {
        Ok(self
            .availability()
            .await?
            .is_some_and(|record| record.is_available))
    }

    /// The cached availability record.
    pub async fn availability(&self) -> Result<Option<WorkerAvailability>, AppError> {
        self.cache.get(CacheKey::WorkerAvailable).await
    }

    /// When the worker started waiting for work, from the cache.
    pub async fn waiting_since(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        let Some(raw) = self.cache.get_raw(CacheKey::WaitingStartTime).await? else {
            return Ok(None);
        };

        match DateTime::parse_from_rfc3339(&raw) {
            Ok(parsed) => Ok(Some(parsed.with_timezone(&Utc))),
            Err(error) => {
                tracing::warn!(%error, "Ignoring malformed waiting start time");
                Ok(None)
            }
        }
    }

    async fn mark_available(
        &self,
        phone: &str,
        since: DateTime<Utc>,
    ) -> Result<WorkerAvailability, AppError> {
        if !self.remote.set_worker_available_flag(phone, true, since).await? {
            tracing::debug!(phone = %phone, "No worker row to flag available");
            return Err(AppError::NotFound);
        }

        let record = WorkerAvailability::available(phone, since);
        self.remote.upsert_availability(&record).await?;

        self.cache.set(CacheKey::WorkerAvailable, &record).await?;
        self.cache
            .set_raw(CacheKey::WaitingStartTime, &since.to_rfc3339())
            .await?;
        self.mirror_profile_flag(phone, true, since).await?;

        AVAILABILITY_CHANGES_TOTAL
            .with_label_values(&["available"])
            .inc();
        tracing::info!(phone = %phone, since = %since, "Worker marked available");

        Ok(record)
    }

    /// Copy the flag change onto the cached profile if it belongs to `phone`,
    /// stamping it with the same `at` the remote row received.
    async fn mirror_profile_flag(
        &self,
        phone: &str,
        available: bool,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let Some(mut worker) = self.profiles.cached().await? else {
            return Ok(());
        };
        if worker.phone != phone || (worker.available == available && worker.updated_at == at) {
            return Ok(());
        }

        worker.available = available;
        worker.updated_at = at;
        self.profiles.cache(&worker).await
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    /// Fetch workers matching every filter set in `query`.
    pub async fn fetch_workers(&self, query: WorkerQuery) -> Result<Vec<Worker>, AppError> {
        let query = query.normalized();
        self.remote.query_workers(&query).await.map_err(|error| {
            tracing::error!(%error, ?query, "Worker query failed");
            error
        })
    }

    /// Fetch available workers, optionally narrowed to a skill substring.
    pub async fn fetch_available_workers(&self, skill: Option<&str>) -> Result<Vec<Worker>, AppError> {
        let mut query = WorkerQuery::available();
        query.skill = skill.map(str::to_string);
        self.fetch_workers(query).await
    }

    /// Fetch workers whose skill contains `skill`, case-insensitively.
    pub async fn search_workers_by_skill(&self, skill: &str) -> Result<Vec<Worker>, AppError> {
        self.fetch_workers(WorkerQuery::default().with_skill(skill))
            .await
    }

    /// Fetch workers with `query`, narrowed to the hirer location stored on
    /// this device when one is set.
    pub async fn fetch_workers_near_hirer(
        &self,
        mut query: WorkerQuery,
    ) -> Result<Vec<Worker>, AppError> {
        if let Some(location) = self.cache.get_raw(CacheKey::HirerLocation).await? {
            query.location = Some(location);
        }
        self.fetch_workers(query).await
    }

    /// Fetch the skills lookup table.
    pub async fn fetch_skills(&self) -> Result<Vec<Skill>, AppError> {
        self.remote.list_skills().await.map_err(|error| {
            tracing::error!(%error, "Skill lookup failed");
            error
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ConflictPolicy, Database, MockRemoteStore};
    use tempfile::TempDir;

    struct Fixture {
        service: WorkerService,
        db: Arc<Database>,
        cache: Arc<LocalCache>,
        _dir: TempDir,
    }

    async fn fixture() -> Fixture {
        fixture_with(ConflictPolicy::RemoteWins).await
    }

    async fn fixture_with(policy: ConflictPolicy) -> Fixture {
        let dir = TempDir::new().unwrap();
        let db = Arc::new(Database::connect(&dir.path().join("remote.db")).await.unwrap());
        let cache = Arc::new(
            LocalCache::open(&dir.path().join("cache.db"), 16)
                .await
                .unwrap(),
        );
        let remote: Arc<dyn RemoteStore> = db.clone();
        let profiles = ProfileStore::new(remote.clone(), cache.clone(), policy);
        Fixture {
            service: WorkerService::new(remote, cache.clone(), profiles),
            db,
            cache,
            _dir: dir,
        }
    }

    async fn mocked(remote: MockRemoteStore, dir: &TempDir) -> (WorkerService, Arc<LocalCache>) {
        let cache = Arc::new(
            LocalCache::open(&dir.path().join("cache.db"), 16)
                .await
                .unwrap(),
        );
        let remote: Arc<dyn RemoteStore> = Arc::new(remote);
        let profiles = ProfileStore::new(remote.clone(), cache.clone(), ConflictPolicy::RemoteWins);
        (WorkerService::new(remote, cache.clone(), profiles), cache)
    }

    fn new_worker(name: &str, phone: &str, skill: &str) -> NewWorker {
        NewWorker {
            id: None,
            name: name.to_string(),
            phone: phone.to_string(),
            location: "Pune".to_string(),
            skill: skill.to_string(),
            available: false,
        }
    }

    #[tokio::test]
    async fn register_generates_fresh_identity() {
        let f = fixture().await;

        let first = f
            .service
            .register_worker(new_worker("Asha", "1", "Plumbing"))
            .await
            .unwrap();
        let second = f
            .service
            .register_worker(new_worker("Bala", "2", "Painting"))
            .await
            .unwrap();

        assert_eq!(first.id.len(), 26);
        assert_ne!(first.id, second.id);
        assert!(f.db.find_worker_by_id(&first.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn register_trims_and_caches_profile() {
        let f = fixture().await;

        let worker = f
            .service
            .register_worker(new_worker("  Asha ", " 1 ", " Plumbing "))
            .await
            .unwrap();

        assert_eq!(worker.name, "Asha");
        assert_eq!(worker.phone, "1");
        let cached: Option<Worker> = f.cache.get(CacheKey::WorkerProfile).await.unwrap();
        assert_eq!(cached, Some(worker));
    }

    #[tokio::test]
    async fn register_keeps_supplied_identity() {
        let f = fixture().await;

        let mut input = new_worker("Asha", "1", "Plumbing");
        input.id = Some("worker-123".to_string());
        let worker = f.service.register_worker(input).await.unwrap();

        assert_eq!(worker.id, "worker-123");
    }

    #[tokio::test]
    async fn register_with_taken_identity_is_conflict() {
        let f = fixture().await;
        let asha = f
            .service
            .register_worker(new_worker("Asha", "1", "Plumbing"))
            .await
            .unwrap();

        let mut input = new_worker("Bala", "2", "Painting");
        input.id = Some(asha.id.clone());
        let error = f.service.register_worker(input).await.unwrap_err();

        assert!(matches!(error, AppError::Conflict(_)));
        assert_eq!(f.db.find_worker_by_phone("1").await.unwrap(), Some(asha.clone()));
        assert!(f.db.find_worker_by_phone("2").await.unwrap().is_none());
        assert_eq!(f.db.count_workers().await.unwrap(), 1);
        assert_eq!(f.service.get_worker_profile(None).await.unwrap(), Some(asha));
    }

    #[tokio::test]
    async fn register_rejects_blank_fields_before_touching_stores() {
        let dir = TempDir::new().unwrap();
        let mut remote = MockRemoteStore::new();
        remote.expect_find_worker_by_phone().never();
        remote.expect_insert_worker().never();
        let (service, cache) = mocked(remote, &dir).await;

        for input in [
            new_worker("", "1", "Plumbing"),
            new_worker("Asha", "  ", "Plumbing"),
            new_worker("Asha", "1", ""),
            NewWorker {
                location: " ".to_string(),
                ..new_worker("Asha", "1", "Plumbing")
            },
        ] {
            let error = service.register_worker(input).await.unwrap_err();
            assert!(matches!(error, AppError::Validation(_)));
        }
        assert!(cache.get_raw(CacheKey::WorkerProfile).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn register_duplicate_phone_is_conflict_without_write() {
        let dir = TempDir::new().unwrap();
        let existing = Worker {
            id: "existing".to_string(),
            name: "Asha".to_string(),
            phone: "1".to_string(),
            location: "Pune".to_string(),
            skill: "Plumbing".to_string(),
            available: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut remote = MockRemoteStore::new();
        remote
            .expect_find_worker_by_phone()
            .returning(move |_| Ok(Some(existing.clone())));
        remote.expect_insert_worker().never();
        remote.expect_upsert_availability().never();
        let (service, _cache) = mocked(remote, &dir).await;

        let error = service
            .register_worker(new_worker("Bala", "1", "Painting"))
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Conflict(_)));
        assert_eq!(error.kind(), crate::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn register_available_writes_availability_record() {
        let f = fixture().await;

        let mut input = new_worker("Asha", "1", "Plumbing");
        input.available = true;
        f.service.register_worker(input).await.unwrap();

        let record = f.db.get_availability("1").await.unwrap().unwrap();
        assert!(record.is_available);
        assert!(f.service.is_worker_available().await.unwrap());
    }

    #[tokio::test]
    async fn profile_without_phone_is_served_from_cache() {
        let dir = TempDir::new().unwrap();
        let mut remote = MockRemoteStore::new();
        remote.expect_find_worker_by_phone().never();
        let (service, cache) = mocked(remote, &dir).await;

        let worker = Worker {
            id: "w1".to_string(),
            name: "Asha".to_string(),
            phone: "1".to_string(),
            location: "Pune".to_string(),
            skill: "Plumbing".to_string(),
            available: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        cache.set(CacheKey::WorkerProfile, &worker).await.unwrap();

        assert_eq!(service.get_worker_profile(None).await.unwrap(), Some(worker.clone()));
        assert_eq!(service.get_worker_profile(Some("1")).await.unwrap(), Some(worker));
    }

    #[tokio::test]
    async fn profile_with_other_phone_replaces_cache_from_remote() {
        let f = fixture().await;

        let asha = f
            .service
            .register_worker(new_worker("Asha", "1", "Plumbing"))
            .await
            .unwrap();
        let bala = f
            .service
            .register_worker(new_worker("Bala", "2", "Painting"))
            .await
            .unwrap();
        assert_eq!(f.service.get_worker_profile(None).await.unwrap(), Some(bala));

        let fetched = f.service.get_worker_profile(Some("1")).await.unwrap();
        assert_eq!(fetched, Some(asha.clone()));
        assert_eq!(f.service.get_worker_profile(None).await.unwrap(), Some(asha));
    }

    #[tokio::test]
    async fn profile_lookup_for_unknown_phone_clears_cache() {
        let f = fixture().await;

        f.service
            .register_worker(new_worker("Asha", "1", "Plumbing"))
            .await
            .unwrap();

        assert_eq!(f.service.get_worker_profile(Some("999")).await.unwrap(), None);
        assert_eq!(f.service.get_worker_profile(None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn profile_lookup_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut remote = MockRemoteStore::new();
        remote
            .expect_find_worker_by_phone()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));
        let (service, _cache) = mocked(remote, &dir).await;

        let error = service.get_worker_profile(Some("1")).await.unwrap_err();
        assert_eq!(error.kind(), crate::error::ErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn available_then_unavailable() {
        let f = fixture().await;
        f.service
            .register_worker(new_worker("Asha", "1", "Plumbing"))
            .await
            .unwrap();

        let before = Utc::now();
        let record = f.service.set_worker_available("1").await.unwrap();
        assert!(f.service.is_worker_available().await.unwrap());
        let since = record.available_since.unwrap();
        assert!(since >= before && since <= Utc::now());
        assert_eq!(f.service.waiting_since().await.unwrap(), Some(since));
        assert!(f.db.find_worker_by_phone("1").await.unwrap().unwrap().available);
        assert!(f.service.get_worker_profile(None).await.unwrap().unwrap().available);

        f.service.set_worker_unavailable("1").await.unwrap();
        assert!(!f.service.is_worker_available().await.unwrap());
        assert!(f.service.waiting_since().await.unwrap().is_none());
        let remote_record = f.db.get_availability("1").await.unwrap().unwrap();
        assert!(!remote_record.is_available);
        assert!(remote_record.available_since.is_none());
        assert!(!f.service.get_worker_profile(None).await.unwrap().unwrap().available);
    }

    #[tokio::test]
    async fn unavailable_without_prior_record_reads_false() {
        let f = fixture().await;
        f.service
            .register_worker(new_worker("Asha", "1", "Plumbing"))
            .await
            .unwrap();

        f.service.set_worker_unavailable("1").await.unwrap();
        assert!(!f.service.is_worker_available().await.unwrap());
    }

    #[tokio::test]
    async fn availability_for_unknown_phone_is_not_found() {
        let f = fixture().await;

        let error = f.service.set_worker_available("404").await.unwrap_err();
        assert!(matches!(error, AppError::NotFound));
        let error = f.service.set_worker_unavailable("404").await.unwrap_err();
        assert!(matches!(error, AppError::NotFound));

        assert!(f.db.get_availability("404").await.unwrap().is_none());
        assert!(!f.service.is_worker_available().await.unwrap());
        assert!(f.service.waiting_since().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sync_after_availability_changes_is_in_sync() {
        for policy in [ConflictPolicy::RemoteWins, ConflictPolicy::LastWriteWins] {
            let f = fixture_with(policy).await;
            let mut input = new_worker("Asha", "1", "Plumbing");
            input.available = true;
            f.service.register_worker(input).await.unwrap();
            assert_eq!(f.service.sync_profile("1").await.unwrap().as_str(), "in_sync");

            f.service.set_worker_unavailable("1").await.unwrap();
            assert_eq!(f.service.sync_profile("1").await.unwrap().as_str(), "in_sync");

            f.service.set_worker_available("1").await.unwrap();
            let outcome = f.service.sync_profile("1").await.unwrap();
            assert_eq!(outcome.as_str(), "in_sync", "{policy:?}");
            assert!(outcome.profile().unwrap().available);
        }
    }

    #[tokio::test]
    async fn availability_remote_failure_leaves_cache_untouched() {
        let dir = TempDir::new().unwrap();
        let mut remote = MockRemoteStore::new();
        remote
            .expect_set_worker_available_flag()
            .returning(|_, _, _| Ok(true));
        remote
            .expect_upsert_availability()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));
        let (service, _cache) = mocked(remote, &dir).await;

        assert!(service.set_worker_available("1").await.is_err());
        assert!(!service.is_worker_available().await.unwrap());
    }

    #[tokio::test]
    async fn blank_phone_is_rejected() {
        let f = fixture().await;
        let error = f.service.set_worker_available("  ").await.unwrap_err();
        assert!(matches!(error, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn fetch_workers_by_skill_is_case_insensitive_substring() {
        let f = fixture().await;
        f.service
            .register_worker(new_worker("Asha", "1", "Plumbing"))
            .await
            .unwrap();
        f.service
            .register_worker(new_worker("Bala", "2", "Pipe PLUMBING repair"))
            .await
            .unwrap();
        f.service
            .register_worker(new_worker("Chitra", "3", "Electrical"))
            .await
            .unwrap();

        let plumbers = f
            .service
            .fetch_workers(WorkerQuery::default().with_skill("Plumbing"))
            .await
            .unwrap();
        assert_eq!(plumbers.len(), 2);
        assert!(
            plumbers
                .iter()
                .all(|w| w.skill.to_lowercase().contains("plumbing"))
        );

        let searched = f.service.search_workers_by_skill("plumb").await.unwrap();
        assert_eq!(searched.len(), 2);
    }

    #[tokio::test]
    async fn search_by_skill_matches_non_ascii_names() {
        let f = fixture().await;
        f.service
            .register_worker(new_worker("Élodie", "1", "Électricité"))
            .await
            .unwrap();

        for needle in ["Électricité", "électricité", "ÉLEC"] {
            let found = f.service.search_workers_by_skill(needle).await.unwrap();
            assert_eq!(found.len(), 1, "{needle:?}");
        }
    }

    #[tokio::test]
    async fn fetch_available_workers_only_returns_available() {
        let f = fixture().await;
        let mut asha = new_worker("Asha", "1", "Plumbing");
        asha.available = true;
        f.service.register_worker(asha).await.unwrap();
        f.service
            .register_worker(new_worker("Bala", "2", "Plumbing"))
            .await
            .unwrap();

        let available = f.service.fetch_available_workers(Some("plumb")).await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].name, "Asha");

        let everyone = f.service.fetch_available_workers(None).await.unwrap();
        assert_eq!(everyone.len(), 1);
    }

    #[tokio::test]
    async fn fetch_near_hirer_uses_stored_location() {
        let f = fixture().await;
        f.service
            .register_worker(new_worker("Asha", "1", "Plumbing"))
            .await
            .unwrap();
        let mut bala = new_worker("Bala", "2", "Plumbing");
        bala.location = "Mumbai".to_string();
        f.service.register_worker(bala).await.unwrap();

        assert_eq!(
            f.service
                .fetch_workers_near_hirer(WorkerQuery::default())
                .await
                .unwrap()
                .len(),
            2
        );

        f.cache
            .set_raw(CacheKey::HirerLocation, "mumbai")
            .await
            .unwrap();
        let near = f
            .service
            .fetch_workers_near_hirer(WorkerQuery::default())
            .await
            .unwrap();
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].name, "Bala");
    }

    #[tokio::test]
    async fn query_failure_is_not_an_empty_list() {
        let dir = TempDir::new().unwrap();
        let mut remote = MockRemoteStore::new();
        remote
            .expect_query_workers()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));
        remote
            .expect_list_skills()
            .returning(|| Err(AppError::Database(sqlx::Error::PoolTimedOut)));
        let (service, _cache) = mocked(remote, &dir).await;

        assert!(service.fetch_available_workers(None).await.is_err());
        assert!(service.fetch_skills().await.is_err());
    }

    #[tokio::test]
    async fn fetch_skills_returns_lookup_table() {
        let f = fixture().await;
        let skills = f.service.fetch_skills().await.unwrap();
        assert!(skills.iter().any(|s| s.name == "Plumbing"));
    }

    #[tokio::test]
    async fn sign_out_clears_worker_keys_only() {
        let f = fixture().await;
        let mut input = new_worker("Asha", "1", "Plumbing");
        input.available = true;
        f.service.register_worker(input).await.unwrap();
        f.cache
            .set_raw(CacheKey::HirerLocation, "Pune")
            .await
            .unwrap();

        f.service.sign_out().await.unwrap();

        assert!(f.service.get_worker_profile(None).await.unwrap().is_none());
        assert!(!f.service.is_worker_available().await.unwrap());
        assert!(f.cache.get_raw(CacheKey::HirerLocation).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn sync_cached_profile_without_cache_is_noop() {
        let f = fixture().await;
        assert!(f.service.sync_cached_profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sync_profile_pulls_remote_changes() {
        let f = fixture().await;
        let mut worker = f
            .service
            .register_worker(new_worker("Asha", "1", "Plumbing"))
            .await
            .unwrap();

        worker.skill = "Electrical".to_string();
        worker.updated_at = Utc::now();
        f.db.upsert_worker(&worker).await.unwrap();

        let outcome = f.service.sync_profile("1").await.unwrap();
        assert_eq!(outcome.as_str(), "pulled");
        assert_eq!(
            f.service.get_worker_profile(None).await.unwrap().unwrap().skill,
            "Electrical"
        );
    }
}
