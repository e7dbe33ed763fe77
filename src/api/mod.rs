//! API layer
//!
//! HTTP handlers for:
//! - Worker registration, profile, availability and discovery
//! - Hirer location and device preferences
//! - Metrics (Prometheus)

mod dto;
mod hirer;
pub mod metrics;
mod workers;

pub use dto::*;

pub use hirer::hirer_router;
pub use metrics::metrics_router;
pub use workers::worker_router;
