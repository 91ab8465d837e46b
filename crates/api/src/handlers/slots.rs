//! # Daily Slots Handler
//!
//! Read-only assembly of the annotated slot picture for one provider day:
//! template row → candidate generation → conflict annotation. The same
//! assembly runs again inside `create_appointment` so a booking is only
//! accepted against the current picture.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::sync::Arc;

use slotwise_core::{
    errors::BookingError,
    models::slot::{SlotSet, TimeRange, DEFAULT_SLOT_MINUTES},
    scheduling::{self, slots::generate_day_slots, conflicts::annotate_slots},
};
use slotwise_db::models::DbProvider;
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

/// Query parameters for the daily slots endpoint
///
/// # Fields
///
/// * `service_id` - Service the caller wants to book; its duration drives the
///   consecutive-slot availability check
/// * `date` - Provider-local calendar date, `YYYY-MM-DD`
/// * `slot_minutes` - Slot granularity (default: 15)
#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub service_id: Uuid,

    pub date: String,

    pub slot_minutes: Option<u32>,
}

/// Returns the annotated slot set for one provider, service and date
///
/// # Endpoint
///
/// ```text
/// GET /api/providers/:id/slots?service_id=uuid&date=2024-06-03&slot_minutes=15
/// ```
///
/// A closed or fully elapsed day yields an empty set with zero counts rather
/// than an error. The query is idempotent and writes nothing.
#[axum::debug_handler]
pub async fn get_day_slots(
    State(state): State<Arc<ApiState>>,
    Path(provider_id): Path<Uuid>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<SlotSet>, AppError> {
    let date = scheduling::parse_date(&query.date)?;
    let slot_minutes = query.slot_minutes.unwrap_or(DEFAULT_SLOT_MINUTES);
    scheduling::validate_slot_minutes(slot_minutes)?;

    let provider = slotwise_db::repositories::provider::get_provider_by_id(
        &state.db_pool,
        provider_id,
    )
    .await
    .map_err(BookingError::Database)?
    .ok_or_else(|| BookingError::NotFound(format!("Provider with ID {} not found", provider_id)))?;

    let service = slotwise_db::repositories::provider::get_service_by_id(
        &state.db_pool,
        query.service_id,
    )
    .await
    .map_err(BookingError::Database)?
    .ok_or_else(|| {
        BookingError::NotFound(format!("Service with ID {} not found", query.service_id))
    })?;

    if service.provider_id != provider.id {
        return Err(AppError(BookingError::NotFound(format!(
            "Service with ID {} not found for provider {}",
            service.id, provider.id
        ))));
    }

    let slot_set = assemble_day_slots(
        &state,
        &provider,
        service.duration_minutes as u32,
        date,
        slot_minutes,
    )
    .await?;

    Ok(Json(slot_set))
}

/// Assemble the annotated slot picture for one provider-local day.
///
/// Shared between the read-only query above and the booking path, which
/// re-runs it to verify the requested slot is still bookable.
pub(crate) async fn assemble_day_slots(
    state: &ApiState,
    provider: &DbProvider,
    service_minutes: u32,
    date: NaiveDate,
    slot_minutes: u32,
) -> Result<SlotSet, AppError> {
    let tz = scheduling::resolve_timezone(&provider.timezone)?;
    let day_of_week = date.weekday().num_days_from_sunday() as i16;

    let hours = slotwise_db::repositories::availability::get_day_hours(
        &state.db_pool,
        provider.id,
        day_of_week,
    )
    .await
    .map_err(BookingError::Database)?;

    let Some(hours) = hours else {
        return Ok(SlotSet::empty(
            provider.id,
            date,
            &provider.timezone,
            slot_minutes,
        ));
    };

    let now = state.clock.now();
    let candidates = generate_day_slots(&hours.into_day_hours(), date, tz, slot_minutes, now);

    // Closed day, elapsed day, or a day with no representable slots.
    let (span_start, span_end) = match (candidates.first(), candidates.last()) {
        (Some(first), Some(last)) => (first.start_time, last.end_time),
        _ => {
            return Ok(SlotSet::empty(
                provider.id,
                date,
                &provider.timezone,
                slot_minutes,
            ));
        }
    };

    let appointments: Vec<TimeRange> = slotwise_db::repositories::appointment::list_blocking_between(
        &state.db_pool,
        provider.id,
        span_start,
        span_end,
    )
    .await
    .map_err(BookingError::Database)?
    .into_iter()
    .map(|appointment| TimeRange::new(appointment.start_time, appointment.end_time))
    .collect();

    let blackouts: Vec<TimeRange> = slotwise_db::repositories::blackout::list_blackouts_between(
        &state.db_pool,
        provider.id,
        span_start,
        span_end,
    )
    .await
    .map_err(BookingError::Database)?
    .into_iter()
    .map(|blackout| TimeRange::new(blackout.start_time, blackout.end_time))
    .collect();

    Ok(annotate_slots(
        provider.id,
        date,
        &provider.timezone,
        slot_minutes,
        candidates,
        &appointments,
        &blackouts,
        service_minutes,
    ))
}
