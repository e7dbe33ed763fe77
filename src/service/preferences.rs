//! Device preferences
//!
//! Selected role and language, loaded from the cache at startup and written
//! back on every change.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::LocaleConfig;
use crate::data::{CacheKey, LocalCache, Role};
use crate::error::AppError;

/// Current preferences snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preferences {
    /// `None` until the user picks a role
    pub role: Option<Role>,
    pub language: String,
}

/// Preferences service
pub struct PreferencesService {
    cache: Arc<LocalCache>,
    supported_languages: Vec<String>,
    state: RwLock<Preferences>,
}

fn normalize_language(code: &str) -> String {
    code.trim().to_ascii_lowercase()
}

impl PreferencesService {
    /// Load preferences from the cache.
    ///
    /// Unknown roles and unsupported languages stored in the cache are
    /// ignored in favour of the defaults.
    pub async fn load(cache: Arc<LocalCache>, locale: &LocaleConfig) -> Result<Self, AppError> {
        let supported_languages: Vec<String> = locale
            .supported_languages
            .iter()
            .map(|code| normalize_language(code))
            .collect();

        let role = cache
            .get_raw(CacheKey::SelectedRole)
            .await?
            .and_then(|raw| Role::parse(&raw));

        let language = cache
            .get_raw(CacheKey::Language)
            .await?
            .map(|raw| normalize_language(&raw))
            .filter(|code| supported_languages.contains(code))
            .unwrap_or_else(|| normalize_language(&locale.default_language));

        tracing::info!(role = ?role, language = %language, "Preferences loaded");

        Ok(Self {
            cache,
            supported_languages,
            state: RwLock::new(Preferences { role, language }),
        })
    }

    pub async fn snapshot(&self) -> Preferences {
        self.state.read().await.clone()
    }

    pub async fn role(&self) -> Option<Role> {
        self.state.read().await.role
    }

    pub async fn language(&self) -> String {
        self.state.read().await.language.clone()
    }

    /// Select a role and persist it.
    pub async fn set_role(&self, role: Role) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        self.cache
            .set_raw(CacheKey::SelectedRole, role.as_str())
            .await?;
        state.role = Some(role);
        Ok(())
    }

    /// Select a language and persist it.
    ///
    /// # Errors
    /// `Validation` if `code` is not a supported locale
    pub async fn set_language(&self, code: &str) -> Result<String, AppError> {
        let code = normalize_language(code);
        if !self.supported_languages.contains(&code) {
            return Err(AppError::Validation(format!(
                "unsupported language '{}'",
                code
            )));
        }

        let mut state = self.state.write().await;
        self.cache.set_raw(CacheKey::Language, &code).await?;
        state.language = code.clone();
        Ok(code)
    }
}
