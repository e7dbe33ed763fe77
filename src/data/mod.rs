//! Data layer module
//!
//! Handles all data persistence and caching:
//! - Remote store (workers, availability, skills)
//! - Device-local key/value cache
//! - Profile store reconciling the two

mod cache;
mod database;
mod models;
mod profile_store;

pub use cache::{CacheKey, LocalCache};
pub use database::{Database, RemoteStore};
pub use models::*;
pub use profile_store::{ConflictPolicy, ProfileStore, SyncOutcome};

#[cfg(test)]
pub(crate) use database::MockRemoteStore;
