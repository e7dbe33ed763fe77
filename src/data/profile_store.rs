//! Worker profile store
//!
//! One interface over the remote `workers` table and the cached profile.
//! Writes go remote first and are only mirrored locally once the remote
//! accepted them; [`ProfileStore::sync`] reconciles the two copies.

use serde::Deserialize;
use std::sync::Arc;

use super::cache::{CacheKey, LocalCache};
use super::database::RemoteStore;
use super::models::Worker;
use crate::error::AppError;

/// Which copy wins when the cached and remote profiles disagree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// The remote row always overwrites the cache.
    #[default]
    RemoteWins,
    /// The copy with the newer `updated_at` overwrites the other.
    LastWriteWins,
}

/// Result of a [`ProfileStore::sync`] run
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Remote copy written to the cache
    Pulled(Worker),
    /// Cached copy written to the remote store
    Pushed(Worker),
    /// Both copies already agree
    InSync(Worker),
    /// Neither side knows the phone number
    Missing,
}

impl SyncOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pulled(_) => "pulled",
            Self::Pushed(_) => "pushed",
            Self::InSync(_) => "in_sync",
            Self::Missing => "missing",
        }
    }

    /// The profile both sides hold after the sync, if any.
    pub fn profile(&self) -> Option<&Worker> {
        match self {
            Self::Pulled(worker) | Self::Pushed(worker) | Self::InSync(worker) => Some(worker),
            Self::Missing => None,
        }
    }
}

/// Remote + cached worker profile
pub struct ProfileStore {
    remote: Arc<dyn RemoteStore>,
    cache: Arc<LocalCache>,
    policy: ConflictPolicy,
}

impl ProfileStore {
    pub fn new(remote: Arc<dyn RemoteStore>, cache: Arc<LocalCache>, policy: ConflictPolicy) -> Self {
        Self {
            remote,
            cache,
            policy,
        }
    }

    /// Insert `worker` remotely as a new row, then cache it.
    ///
    /// An existing row is never overwritten; a taken id or phone is a
    /// [`AppError::Conflict`]. Nothing is cached when the remote write fails.
    pub async fn create(&self, worker: &Worker) -> Result<(), AppError> {
        self.remote.insert_worker(worker).await?;
        self.cache(worker).await
    }

    /// The cached profile, if any.
    pub async fn cached(&self) -> Result<Option<Worker>, AppError> {
        self.cache.get(CacheKey::WorkerProfile).await
    }

    /// Overwrite the cached profile.
    pub async fn cache(&self, worker: &Worker) -> Result<(), AppError> {
        self.cache.set(CacheKey::WorkerProfile, worker).await
    }

    /// Drop the cached profile.
    pub async fn forget(&self) -> Result<(), AppError> {
        self.cache.remove(CacheKey::WorkerProfile).await
    }

    /// Look up the remote profile for `phone` without touching the cache.
    pub async fn fetch_remote(&self, phone: &str) -> Result<Option<Worker>, AppError> {
        self.remote.find_worker_by_phone(phone).await
    }

    /// Reconcile the cached and remote profiles for `phone`.
    ///
    /// A cached profile for a different phone number counts as absent.
    pub async fn sync(&self, phone: &str) -> Result<SyncOutcome, AppError> {
        let local = self.cached().await?.filter(|worker| worker.phone == phone);
        let remote = self.remote.find_worker_by_phone(phone).await?;

        let outcome = match (local, remote) {
            (None, None) => SyncOutcome::Missing,
            (None, Some(remote)) => {
                self.cache(&remote).await?;
                SyncOutcome::Pulled(remote)
            }
            (Some(local), None) => {
                self.remote.upsert_worker(&local).await?;
                SyncOutcome::Pushed(local)
            }
            (Some(local), Some(remote)) if local == remote => SyncOutcome::InSync(remote),
            (Some(local), Some(remote)) => match self.policy {
                ConflictPolicy::LastWriteWins if local.updated_at > remote.updated_at => {
                    self.remote.upsert_worker(&local).await?;
                    SyncOutcome::Pushed(local)
                }
                ConflictPolicy::RemoteWins | ConflictPolicy::LastWriteWins => {
                    self.cache(&remote).await?;
                    SyncOutcome::Pulled(remote)
                }
            },
        };

        crate::metrics::PROFILE_SYNC_TOTAL
            .with_label_values(&[outcome.as_str()])
            .inc();
        tracing::info!(
            phone = %phone,
            outcome = outcome.as_str(),
            policy = ?self.policy,
            "Profile sync finished"
        );

        Ok(outcome)
    }
}
