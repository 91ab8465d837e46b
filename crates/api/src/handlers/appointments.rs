//! # Appointment Lifecycle Handlers
//!
//! Booking runs in two phases: an optimistic slot re-check against the same
//! assembly the slots endpoint serves, then a single database transaction
//! that takes the provider lock, re-verifies overlap and the daily cap, and
//! writes the `pending` hold together with its post-session buffer blackout.
//! The GiST exclusion constraint backstops the transaction, so even two
//! writes that slip past every check cannot both commit.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Duration;
use std::sync::Arc;

use slotwise_core::{
    errors::BookingError,
    models::appointment::{Appointment, CancelAppointmentRequest, CreateAppointmentRequest},
    models::policy::BookingPolicy,
    models::slot::DEFAULT_SLOT_MINUTES,
    scheduling,
    signals::{AppointmentSignal, SignalKind},
};
use slotwise_db::repositories::appointment::{BookingWrite, NewAppointment};
use uuid::Uuid;

use crate::{handlers::slots, middleware::error_handling::AppError, ApiState};

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    // Wire format checks before touching the database
    let date = scheduling::parse_date(&payload.date)?;
    let local_time = scheduling::parse_local_time(&payload.local_time)?;
    let slot_minutes = payload.slot_minutes.unwrap_or(DEFAULT_SLOT_MINUTES);
    scheduling::validate_slot_minutes(slot_minutes)?;

    slotwise_db::repositories::provider::get_client_by_id(&state.db_pool, payload.client_id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| {
            BookingError::NotFound(format!("Client with ID {} not found", payload.client_id))
        })?;

    let provider = slotwise_db::repositories::provider::get_provider_by_id(
        &state.db_pool,
        payload.provider_id,
    )
    .await
    .map_err(BookingError::Database)?
    .ok_or_else(|| {
        BookingError::NotFound(format!("Provider with ID {} not found", payload.provider_id))
    })?;

    let service = slotwise_db::repositories::provider::get_service_by_id(
        &state.db_pool,
        payload.service_id,
    )
    .await
    .map_err(BookingError::Database)?
    .ok_or_else(|| {
        BookingError::NotFound(format!("Service with ID {} not found", payload.service_id))
    })?;

    if service.provider_id != provider.id {
        return Err(AppError(BookingError::NotFound(format!(
            "Service with ID {} not found for provider {}",
            service.id, provider.id
        ))));
    }
    if !service.is_active {
        return Err(AppError(BookingError::Validation(format!(
            "Service '{}' is not bookable",
            service.name
        ))));
    }

    // Policy gate: a paused provider or policy rejects regardless of slot state
    if !provider.is_active {
        return Err(AppError(BookingError::PolicyViolation(format!(
            "Provider {} is not accepting bookings",
            provider.id
        ))));
    }
    let policy = slotwise_db::repositories::policy::get_policy(&state.db_pool, provider.id)
        .await
        .map_err(BookingError::Database)?
        .map(|row| row.into_policy())
        .unwrap_or_else(|| BookingPolicy::defaults_for(provider.id));
    if !policy.is_active {
        return Err(AppError(BookingError::PolicyViolation(format!(
            "Provider {} is not accepting bookings",
            provider.id
        ))));
    }

    // The requested slot must exist in the current picture and be bookable
    // for the full service duration
    let slot_set = slots::assemble_day_slots(
        &state,
        &provider,
        service.duration_minutes as u32,
        date,
        slot_minutes,
    )
    .await?;

    let label = local_time.format("%H:%M").to_string();
    let slot = slot_set.slot_at(&label).ok_or_else(|| {
        BookingError::Conflict(format!("No bookable slot at {} on {}", label, date))
    })?;
    if !slot.is_available {
        return Err(AppError(BookingError::Conflict(format!(
            "Slot at {} on {} is not available",
            label, date
        ))));
    }

    let start_time = slot.start_time;
    let end_time = start_time + Duration::minutes(i64::from(service.duration_minutes));

    let tz = scheduling::resolve_timezone(&provider.timezone)?;
    let (day_start, day_end) = scheduling::local_day_bounds(tz, date)?;

    let new = NewAppointment {
        client_id: payload.client_id,
        provider_id: provider.id,
        service_id: service.id,
        start_time,
        end_time,
        timezone: provider.timezone.clone(),
    };

    let write = slotwise_db::repositories::appointment::book_appointment(
        &state.db_pool,
        &new,
        policy.buffer_minutes,
        day_start,
        day_end,
        policy.max_daily_appointments,
    )
    .await
    .map_err(BookingError::Database)?;

    let db_appointment = match write {
        BookingWrite::Created(appointment) => appointment,
        BookingWrite::SlotTaken => {
            return Err(AppError(BookingError::Conflict(format!(
                "Slot at {} on {} was just taken",
                label, date
            ))));
        }
        BookingWrite::DailyCapReached => {
            return Err(AppError(BookingError::PolicyViolation(format!(
                "Provider {} has reached its daily appointment limit",
                provider.id
            ))));
        }
    };

    let appointment = db_appointment
        .into_appointment()
        .map_err(BookingError::Database)?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let db_appointment =
        slotwise_db::repositories::appointment::get_appointment_by_id(&state.db_pool, id)
            .await
            .map_err(BookingError::Database)?
            .ok_or_else(|| {
                BookingError::NotFound(format!("Appointment with ID {} not found", id))
            })?;

    let appointment = db_appointment
        .into_appointment()
        .map_err(BookingError::Database)?;

    Ok(Json(appointment))
}

/// Confirmation boundary for the payment collaborator: flips the pending
/// hold to `scheduled` and emits `appointment.scheduled`.
#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let existing = slotwise_db::repositories::appointment::get_appointment_by_id(&state.db_pool, id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound(format!("Appointment with ID {} not found", id)))?;

    let confirmed = slotwise_db::repositories::appointment::confirm_appointment(&state.db_pool, id)
        .await
        .map_err(BookingError::Database)?;

    let Some(confirmed) = confirmed else {
        // The guarded UPDATE lost: the hold expired, was already confirmed,
        // or reached a terminal state
        return Err(AppError(BookingError::Conflict(format!(
            "Appointment {} cannot be confirmed from status '{}'",
            id, existing.status
        ))));
    };

    let appointment = confirmed
        .into_appointment()
        .map_err(BookingError::Database)?;

    state.signals.publish(AppointmentSignal::for_appointment(
        SignalKind::Scheduled,
        &appointment,
        state.clock.now(),
    ));

    Ok(Json(appointment))
}

/// Cancel a scheduled appointment and emit `appointment.cancelled`. Pending
/// holds are retired by the hold-expiry sweep, never through this endpoint.
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    if payload.reason.trim().is_empty() {
        return Err(AppError(BookingError::Validation(
            "reason must not be empty".to_string(),
        )));
    }

    let existing = slotwise_db::repositories::appointment::get_appointment_by_id(&state.db_pool, id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound(format!("Appointment with ID {} not found", id)))?;

    let cancelled = slotwise_db::repositories::appointment::cancel_appointment(
        &state.db_pool,
        id,
        &payload.reason,
    )
    .await
    .map_err(BookingError::Database)?;

    let Some(cancelled) = cancelled else {
        return Err(AppError(BookingError::Conflict(format!(
            "Appointment {} cannot be cancelled from status '{}'",
            id, existing.status
        ))));
    };

    let appointment = cancelled
        .into_appointment()
        .map_err(BookingError::Database)?;

    state.signals.publish(AppointmentSignal::for_appointment(
        SignalKind::Cancelled,
        &appointment,
        state.clock.now(),
    ));

    Ok(Json(appointment))
}
