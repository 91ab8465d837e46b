use chrono::{DateTime, NaiveTime, Utc};
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use slotwise_core::models::appointment::{Appointment, AppointmentStatus};
use slotwise_core::models::availability::DayHours;
use slotwise_core::models::blackout::{BlackoutOrigin, BlackoutPeriod};
use slotwise_core::models::policy::BookingPolicy;
use slotwise_core::models::provider::{Client, Provider, Service};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbProvider {
    pub id: Uuid,
    pub display_name: String,
    pub timezone: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl DbProvider {
    pub fn into_provider(self) -> Provider {
        Provider {
            id: self.id,
            display_name: self.display_name,
            timezone: self.timezone,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbClient {
    pub id: Uuid,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl DbClient {
    pub fn into_client(self) -> Client {
        Client {
            id: self.id,
            display_name: self.display_name,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbService {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl DbService {
    pub fn into_service(self) -> Service {
        Service {
            id: self.id,
            provider_id: self.provider_id,
            name: self.name,
            duration_minutes: self.duration_minutes,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbDayHours {
    pub provider_id: Uuid,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
}

impl DbDayHours {
    pub fn into_day_hours(self) -> DayHours {
        DayHours {
            day_of_week: self.day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
            is_available: self.is_available,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBookingPolicy {
    pub provider_id: Uuid,
    pub is_active: bool,
    pub max_daily_appointments: i32,
    pub buffer_minutes: i32,
}

impl DbBookingPolicy {
    pub fn into_policy(self) -> BookingPolicy {
        BookingPolicy {
            provider_id: self.provider_id,
            is_active: self.is_active,
            max_daily_appointments: self.max_daily_appointments,
            buffer_minutes: self.buffer_minutes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBlackoutPeriod {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub reason: Option<String>,
    pub origin: String,
    pub created_at: DateTime<Utc>,
}

impl DbBlackoutPeriod {
    /// Decode the stored origin tag; an unknown tag is a data fault.
    pub fn into_blackout(self) -> Result<BlackoutPeriod> {
        let origin = BlackoutOrigin::parse(&self.origin)
            .ok_or_else(|| eyre!("unknown blackout origin '{}' for {}", self.origin, self.id))?;
        Ok(BlackoutPeriod {
            id: self.id,
            provider_id: self.provider_id,
            start_time: self.start_time,
            end_time: self.end_time,
            reason: self.reason,
            origin,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub timezone: String,
    pub status: String,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DbAppointment {
    pub fn status(&self) -> Result<AppointmentStatus> {
        AppointmentStatus::parse(&self.status)
            .ok_or_else(|| eyre!("unknown appointment status '{}' for {}", self.status, self.id))
    }

    pub fn into_appointment(self) -> Result<Appointment> {
        let status = self.status()?;
        Ok(Appointment {
            id: self.id,
            client_id: self.client_id,
            provider_id: self.provider_id,
            service_id: self.service_id,
            start_time: self.start_time,
            end_time: self.end_time,
            timezone: self.timezone,
            status,
            cancellation_reason: self.cancellation_reason,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReminderFlag {
    pub appointment_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
