use chrono::{DateTime, Utc};
use mockall::mock;
use uuid::Uuid;

use crate::models::{
    DbAppointment, DbBlackoutPeriod, DbBookingPolicy, DbClient, DbDayHours, DbProvider, DbService,
};
use crate::repositories::appointment::{BookingWrite, NewAppointment};
use slotwise_core::models::availability::DayHours;
use slotwise_core::models::blackout::BlackoutOrigin;

// Mock repositories for testing
mock! {
    pub ProviderRepo {
        pub async fn onboard_provider(
            &self,
            display_name: &'static str,
            timezone: &'static str,
        ) -> eyre::Result<DbProvider>;

        pub async fn get_provider_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbProvider>>;

        pub async fn create_client(
            &self,
            display_name: &'static str,
        ) -> eyre::Result<DbClient>;

        pub async fn get_client_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbClient>>;

        pub async fn create_service(
            &self,
            provider_id: Uuid,
            name: &'static str,
            duration_minutes: i32,
        ) -> eyre::Result<DbService>;

        pub async fn get_service_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbService>>;
    }
}

mock! {
    pub AvailabilityRepo {
        pub async fn get_weekly_hours(
            &self,
            provider_id: Uuid,
        ) -> eyre::Result<Vec<DbDayHours>>;

        pub async fn get_day_hours(
            &self,
            provider_id: Uuid,
            day_of_week: i16,
        ) -> eyre::Result<Option<DbDayHours>>;

        pub async fn replace_weekly_hours(
            &self,
            provider_id: Uuid,
            days: Vec<DayHours>,
        ) -> eyre::Result<Vec<DbDayHours>>;
    }
}

mock! {
    pub PolicyRepo {
        pub async fn get_policy(
            &self,
            provider_id: Uuid,
        ) -> eyre::Result<Option<DbBookingPolicy>>;

        pub async fn upsert_policy(
            &self,
            provider_id: Uuid,
            is_active: bool,
            max_daily_appointments: i32,
            buffer_minutes: i32,
        ) -> eyre::Result<DbBookingPolicy>;
    }
}

mock! {
    pub BlackoutRepo {
        pub async fn create_blackout(
            &self,
            provider_id: Uuid,
            start_time: DateTime<Utc>,
            end_time: DateTime<Utc>,
            reason: Option<&'static str>,
            origin: BlackoutOrigin,
        ) -> eyre::Result<DbBlackoutPeriod>;

        pub async fn get_blackout_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbBlackoutPeriod>>;

        pub async fn list_blackouts(
            &self,
            provider_id: Uuid,
        ) -> eyre::Result<Vec<DbBlackoutPeriod>>;

        pub async fn list_blackouts_between(
            &self,
            provider_id: Uuid,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> eyre::Result<Vec<DbBlackoutPeriod>>;

        pub async fn delete_blackout(
            &self,
            id: Uuid,
        ) -> eyre::Result<bool>;
    }
}

mock! {
    pub AppointmentRepo {
        pub async fn book_appointment(
            &self,
            new: NewAppointment,
            buffer_minutes: i32,
            day_start: DateTime<Utc>,
            day_end: DateTime<Utc>,
            max_daily: i32,
        ) -> eyre::Result<BookingWrite>;

        pub async fn get_appointment_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbAppointment>>;

        pub async fn confirm_appointment(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbAppointment>>;

        pub async fn cancel_appointment(
            &self,
            id: Uuid,
            reason: &'static str,
        ) -> eyre::Result<Option<DbAppointment>>;

        pub async fn expire_pending_hold(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbAppointment>>;

        pub async fn list_blocking_between(
            &self,
            provider_id: Uuid,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> eyre::Result<Vec<DbAppointment>>;

        pub async fn due_to_start(
            &self,
            now: DateTime<Utc>,
        ) -> eyre::Result<Vec<DbAppointment>>;

        pub async fn due_to_complete(
            &self,
            now: DateTime<Utc>,
        ) -> eyre::Result<Vec<DbAppointment>>;

        pub async fn starting_within(
            &self,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> eyre::Result<Vec<DbAppointment>>;

        pub async fn pending_created_before(
            &self,
            cutoff: DateTime<Utc>,
        ) -> eyre::Result<Vec<DbAppointment>>;
    }
}

mock! {
    pub ReminderRepo {
        pub async fn claim_reminder_flag(
            &self,
            appointment_id: Uuid,
            expires_at: DateTime<Utc>,
        ) -> eyre::Result<bool>;

        pub async fn purge_expired_flags(
            &self,
            now: DateTime<Utc>,
        ) -> eyre::Result<u64>;
    }
}
