//! Service layer
//!
//! Contains the task-level operations called by the presentation layer.
//! Services compose the remote store and the local cache.

mod hirer;
mod preferences;
mod worker;

pub use hirer::HirerService;
pub use preferences::{Preferences, PreferencesService};
pub use worker::WorkerService;
