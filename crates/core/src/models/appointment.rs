use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of an appointment.
///
/// `Pending` is the provisional hold taken at booking time; it already blocks
/// the slot but expires if never confirmed. The allowed transitions are
/// encoded in [`AppointmentStatus::can_transition_to`]; everything else is
/// rejected, including any move out of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Scheduled,
    Started,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Started => "started",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(AppointmentStatus::Pending),
            "scheduled" => Some(AppointmentStatus::Scheduled),
            "started" => Some(AppointmentStatus::Started),
            "completed" => Some(AppointmentStatus::Completed),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            _ => None,
        }
    }

    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Scheduled)
                | (Pending, Cancelled)
                | (Scheduled, Started)
                | (Scheduled, Cancelled)
                | (Started, Completed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled
        )
    }

    /// Whether an appointment in this state keeps its time window occupied.
    pub fn blocks_slot(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Pending | AppointmentStatus::Scheduled | AppointmentStatus::Started
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// IANA timezone the appointment was booked in, e.g. "America/New_York".
    pub timezone: String,
    pub status: AppointmentStatus,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub client_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    /// Calendar date in the provider's timezone, "YYYY-MM-DD".
    pub date: String,
    /// Wall-clock slot start in the provider's timezone, "HH:MM".
    pub local_time: String,
    /// Slot granularity used to verify the requested slot; defaults to
    /// [`crate::models::slot::DEFAULT_SLOT_MINUTES`].
    pub slot_minutes: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: String,
}
