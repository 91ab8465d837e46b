use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who created a blackout period.
///
/// `System` rows are post-session buffers materialized by the booking flow;
/// they cannot be deleted through the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlackoutOrigin {
    Provider,
    System,
}

impl BlackoutOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlackoutOrigin::Provider => "provider",
            BlackoutOrigin::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "provider" => Some(BlackoutOrigin::Provider),
            "system" => Some(BlackoutOrigin::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlackoutPeriod {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub reason: Option<String>,
    pub origin: BlackoutOrigin,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBlackoutRequest {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub reason: Option<String>,
}
