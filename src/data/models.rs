//! Data models
//!
//! Rust structs representing remote rows and cached values.
//! Identities are ULIDs and timestamps are chrono UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Worker
// =============================================================================

/// A registered worker profile
///
/// Stored in the remote `workers` table and mirrored in the local cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Worker {
    pub id: String,
    pub name: String,
    /// Secondary natural key; unique across the remote table
    pub phone: String,
    pub location: String,
    pub skill: String,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration input
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewWorker {
    /// Pre-assigned identity; a fresh ULID is generated when absent
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub skill: String,
    #[serde(default)]
    pub available: bool,
}

// =============================================================================
// Availability
// =============================================================================

/// Availability record, keyed by phone number
///
/// Cleared (not deleted) when the worker becomes unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkerAvailability {
    pub phone_number: String,
    pub is_available: bool,
    pub available_since: Option<DateTime<Utc>>,
}

impl WorkerAvailability {
    /// A record marking `phone` available from `since`.
    pub fn available(phone: &str, since: DateTime<Utc>) -> Self {
        Self {
            phone_number: phone.to_string(),
            is_available: true,
            available_since: Some(since),
        }
    }

    /// A cleared record for `phone`.
    pub fn cleared(phone: &str) -> Self {
        Self {
            phone_number: phone.to_string(),
            is_available: false,
            available_since: None,
        }
    }
}

// =============================================================================
// Skill
// =============================================================================

/// Entry of the read-only `skills` lookup table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Skill {
    pub name: String,
}

// =============================================================================
// Worker query
// =============================================================================

/// Optional filters composed into one remote worker query
///
/// `skill` and `location` match case-insensitively as substrings;
/// the other filters are equality matches.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WorkerQuery {
    pub available: Option<bool>,
    pub skill: Option<String>,
    pub id: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
}

impl WorkerQuery {
    pub fn available() -> Self {
        Self {
            available: Some(true),
            ..Self::default()
        }
    }

    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skill = Some(skill.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Drop filters that are blank after trimming.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            available: self.available,
            skill: clean(self.skill),
            id: clean(self.id),
            phone: clean(self.phone),
            location: clean(self.location),
        }
    }
}

// =============================================================================
// Application preferences
// =============================================================================

/// Role selected on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Worker,
    Hirer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Hirer => "hirer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "worker" => Some(Self::Worker),
            "hirer" => Some(Self::Hirer),
            _ => None,
        }
    }
}
