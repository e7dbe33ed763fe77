//! Gigboard - worker/hirer marketplace data layer
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - Worker registration, profile, availability, discovery    │
//! │  - Hirer location and device preferences                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - WorkerService, HirerService, PreferencesService          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - Remote store (workers, availability, skills)             │
//! │  - Local key/value cache (SQLite file + Moka)               │
//! │  - Profile store with explicit sync                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers
//! - `service`: Task-level operations
//! - `data`: Remote store, local cache and profile store
//! - `config`: Configuration management
//! - `error`: Error types
//! - `metrics`: Prometheus instruments

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;

use std::sync::Arc;

/// Application context shared across all handlers
///
/// Built once at startup; cloned per request.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Remote store
    pub db: Arc<data::Database>,

    /// Device-local cache
    pub cache: Arc<data::LocalCache>,

    /// Worker operations
    pub workers: Arc<service::WorkerService>,

    /// Hirer operations
    pub hirer: Arc<service::HirerService>,

    /// Selected role and language
    pub preferences: Arc<service::PreferencesService>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Connect to the remote store
    /// 2. Open the local cache
    /// 3. Build the services
    /// 4. Load preferences from the cache
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        // 1. Connect to the remote store
        let db = Arc::new(data::Database::connect(&config.remote.path).await?);
        tracing::info!("Remote store connected");

        // 2. Open the local cache
        let cache =
            Arc::new(data::LocalCache::open(&config.cache.path, config.cache.memory_capacity).await?);
        tracing::info!("Local cache opened");

        // 3. Build the services
        let remote: Arc<dyn data::RemoteStore> = db.clone();
        let profiles = data::ProfileStore::new(remote.clone(), cache.clone(), config.sync.policy);
        let workers = service::WorkerService::new(remote, cache.clone(), profiles);
        let hirer = service::HirerService::new(cache.clone());

        // 4. Load preferences
        let preferences = service::PreferencesService::load(cache.clone(), &config.app).await?;

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            db,
            cache,
            workers: Arc::new(workers),
            hirer: Arc::new(hirer),
            preferences: Arc::new(preferences),
        })
    }
}

/// Build the Axum router with all routes.
///
/// Shared by the binary and integration tests.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

    let api = Router::new()
        .merge(api::worker_router())
        .merge(api::hirer_router());

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest("/api", api)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(api::metrics_router())
}

async fn health_check() -> &'static str {
    "OK"
}
