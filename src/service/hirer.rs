//! Hirer service
//!
//! The hirer location lives only in the device cache.

use std::sync::Arc;

use crate::data::{CacheKey, LocalCache};
use crate::error::AppError;

/// Hirer service
pub struct HirerService {
    cache: Arc<LocalCache>,
}

impl HirerService {
    pub fn new(cache: Arc<LocalCache>) -> Self {
        Self { cache }
    }

    /// Save the hirer location, trimmed.
    ///
    /// # Returns
    /// The stored string
    pub async fn save_hirer_location(&self, location: &str) -> Result<String, AppError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(AppError::Validation("location cannot be empty".to_string()));
        }

        self.cache
            .set_raw(CacheKey::HirerLocation, location)
            .await?;
        tracing::info!(location = %location, "Hirer location saved");

        Ok(location.to_string())
    }

    /// Get the saved hirer location.
    pub async fn get_hirer_location(&self) -> Result<Option<String>, AppError> {
        let location = self.cache.get_raw(CacheKey::HirerLocation).await?;
        Ok(location
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty()))
    }

    pub async fn clear_hirer_location(&self) -> Result<(), AppError> {
        self.cache.remove(CacheKey::HirerLocation).await
    }
}
