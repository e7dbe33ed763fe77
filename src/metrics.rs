//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use std::time::Duration;

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, IntCounterVec, IntGaugeVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Remote store metrics
    pub static ref DB_QUERIES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("gigboard_db_queries_total", "Total number of remote store queries"),
        &["operation", "table", "status"]
    ).expect("metric can be created");
    pub static ref DB_QUERY_DURATION_SECONDS: prometheus::HistogramVec = prometheus::HistogramVec::new(
        HistogramOpts::new(
            "gigboard_db_query_duration_seconds",
            "Remote store query duration in seconds"
        ).buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        &["operation", "table"]
    ).expect("metric can be created");

    // Local cache metrics
    pub static ref CACHE_HITS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("gigboard_cache_hits_total", "Total number of local cache hits"),
        &["key"]
    ).expect("metric can be created");
    pub static ref CACHE_MISSES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("gigboard_cache_misses_total", "Total number of local cache misses"),
        &["key"]
    ).expect("metric can be created");
    pub static ref CACHE_SIZE: IntGaugeVec = IntGaugeVec::new(
        Opts::new("gigboard_cache_size", "Current number of entries in the in-memory cache layer"),
        &["cache_name"]
    ).expect("metric can be created");

    // Profile sync metrics
    pub static ref PROFILE_SYNC_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("gigboard_profile_sync_total", "Total number of profile sync runs"),
        &["outcome"]
    ).expect("metric can be created");

    // Domain metrics
    pub static ref WORKER_REGISTRATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("gigboard_worker_registrations_total", "Total number of worker registration attempts"),
        &["status"]
    ).expect("metric can be created");
    pub static ref AVAILABILITY_CHANGES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("gigboard_availability_changes_total", "Total number of availability toggles"),
        &["state"]
    ).expect("metric can be created");

    // Error metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("gigboard_errors_total", "Total number of errors returned to callers"),
        &["error_kind"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(DB_QUERIES_TOTAL.clone()))
        .expect("DB_QUERIES_TOTAL can be registered");
    REGISTRY
        .register(Box::new(DB_QUERY_DURATION_SECONDS.clone()))
        .expect("DB_QUERY_DURATION_SECONDS can be registered");
    REGISTRY
        .register(Box::new(CACHE_HITS_TOTAL.clone()))
        .expect("CACHE_HITS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(CACHE_MISSES_TOTAL.clone()))
        .expect("CACHE_MISSES_TOTAL can be registered");
    REGISTRY
        .register(Box::new(CACHE_SIZE.clone()))
        .expect("CACHE_SIZE can be registered");
    REGISTRY
        .register(Box::new(PROFILE_SYNC_TOTAL.clone()))
        .expect("PROFILE_SYNC_TOTAL can be registered");
    REGISTRY
        .register(Box::new(WORKER_REGISTRATIONS_TOTAL.clone()))
        .expect("WORKER_REGISTRATIONS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(AVAILABILITY_CHANGES_TOTAL.clone()))
        .expect("AVAILABILITY_CHANGES_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}

/// Record a remote store query outcome and its latency.
pub fn observe_db_query(operation: &str, table: &str, ok: bool, elapsed: Duration) {
    let status = if ok { "success" } else { "error" };
    DB_QUERIES_TOTAL
        .with_label_values(&[operation, table, status])
        .inc();
    DB_QUERY_DURATION_SECONDS
        .with_label_values(&[operation, table])
        .observe(elapsed.as_secs_f64());
}
