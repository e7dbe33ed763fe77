//! Request/response bodies for the HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{Role, SyncOutcome, Worker, WorkerQuery};

/// Query string of `GET /api/workers`
#[derive(Debug, Default, Deserialize)]
pub struct ListWorkersParams {
    pub available: Option<bool>,
    pub skill: Option<String>,
    pub id: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    /// Narrow to the hirer location saved on this device
    #[serde(default)]
    pub near_hirer: bool,
}

impl ListWorkersParams {
    pub fn into_query(self) -> (WorkerQuery, bool) {
        let query = WorkerQuery {
            available: self.available,
            skill: self.skill,
            id: self.id,
            phone: self.phone,
            location: self.location,
        };
        (query, self.near_hirer)
    }
}

/// Query string carrying an optional phone number
#[derive(Debug, Default, Deserialize)]
pub struct PhoneParams {
    pub phone: Option<String>,
}

/// Body carrying a phone number
#[derive(Debug, Deserialize)]
pub struct PhoneRequest {
    pub phone: String,
}

/// `GET /api/workers/me/availability`
#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub available: bool,
    pub available_since: Option<DateTime<Utc>>,
    pub waiting_since: Option<DateTime<Utc>>,
}

/// `POST /api/workers/me/sync`
#[derive(Debug, Serialize, Deserialize)]
pub struct SyncResponse {
    pub outcome: String,
    pub profile: Option<Worker>,
}

impl From<SyncOutcome> for SyncResponse {
    fn from(outcome: SyncOutcome) -> Self {
        Self {
            outcome: outcome.as_str().to_string(),
            profile: outcome.profile().cloned(),
        }
    }
}

/// Hirer location body (request and response)
#[derive(Debug, Serialize, Deserialize)]
pub struct LocationBody {
    pub location: Option<String>,
}

/// `PUT /api/preferences`
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub role: Option<Role>,
    pub language: Option<String>,
}
