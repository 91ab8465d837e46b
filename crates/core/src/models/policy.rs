use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_MAX_DAILY_APPOINTMENTS: i32 = 30;
pub const DEFAULT_BUFFER_MINUTES: i32 = 15;

/// Booking rules for one provider, created with defaults at onboarding.
///
/// `is_active` gates new bookings only; existing appointments are untouched
/// when a provider pauses. `buffer_minutes` is the rest window materialized
/// as a system blackout after every confirmed booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPolicy {
    pub provider_id: Uuid,
    pub is_active: bool,
    pub max_daily_appointments: i32,
    pub buffer_minutes: i32,
}

impl BookingPolicy {
    pub fn defaults_for(provider_id: Uuid) -> Self {
        Self {
            provider_id,
            is_active: true,
            max_daily_appointments: DEFAULT_MAX_DAILY_APPOINTMENTS,
            buffer_minutes: DEFAULT_BUFFER_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertBookingPolicyRequest {
    pub is_active: bool,
    pub max_daily_appointments: i32,
    pub buffer_minutes: i32,
}
