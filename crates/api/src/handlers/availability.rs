//! # Availability Settings Handlers
//!
//! Provider-facing settings: the weekly hours template the slot generator
//! reads, the booking policy the booking path enforces, and blackout
//! periods. Weekly hours are only ever replaced as a complete week so the
//! seven-row invariant holds at every point in time.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use slotwise_core::{
    errors::BookingError,
    models::availability::{ReplaceWeeklyHoursRequest, WeeklyHoursResponse},
    models::blackout::{BlackoutOrigin, BlackoutPeriod, CreateBlackoutRequest},
    models::policy::{BookingPolicy, UpsertBookingPolicyRequest},
};
use slotwise_db::models::DbProvider;
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

async fn fetch_provider(state: &ApiState, id: Uuid) -> Result<DbProvider, AppError> {
    let provider = slotwise_db::repositories::provider::get_provider_by_id(&state.db_pool, id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound(format!("Provider with ID {} not found", id)))?;
    Ok(provider)
}

#[axum::debug_handler]
pub async fn get_weekly_hours(
    State(state): State<Arc<ApiState>>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<WeeklyHoursResponse>, AppError> {
    let provider = fetch_provider(&state, provider_id).await?;

    let days =
        slotwise_db::repositories::availability::get_weekly_hours(&state.db_pool, provider.id)
            .await
            .map_err(BookingError::Database)?;

    Ok(Json(WeeklyHoursResponse {
        provider_id: provider.id,
        days: days.into_iter().map(|day| day.into_day_hours()).collect(),
    }))
}

#[axum::debug_handler]
pub async fn replace_weekly_hours(
    State(state): State<Arc<ApiState>>,
    Path(provider_id): Path<Uuid>,
    Json(payload): Json<ReplaceWeeklyHoursRequest>,
) -> Result<Json<WeeklyHoursResponse>, AppError> {
    let provider = fetch_provider(&state, provider_id).await?;

    if payload.days.len() != 7 {
        return Err(AppError(BookingError::Validation(format!(
            "weekly hours must cover exactly 7 days, got {}",
            payload.days.len()
        ))));
    }

    let mut seen = [false; 7];
    for day in &payload.days {
        let index = usize::try_from(day.day_of_week).ok().filter(|i| *i < 7).ok_or_else(|| {
            BookingError::Validation(format!(
                "day_of_week must be between 0 and 6, got {}",
                day.day_of_week
            ))
        })?;
        if seen[index] {
            return Err(AppError(BookingError::Validation(format!(
                "day_of_week {} appears more than once",
                day.day_of_week
            ))));
        }
        seen[index] = true;

        // The window must be well-formed even on closed days; the schema
        // enforces the same rule
        if day.start_time >= day.end_time {
            return Err(AppError(BookingError::Validation(format!(
                "start_time must be before end_time on day {}",
                day.day_of_week
            ))));
        }
    }

    let days = slotwise_db::repositories::availability::replace_weekly_hours(
        &state.db_pool,
        provider.id,
        &payload.days,
    )
    .await
    .map_err(BookingError::Database)?;

    Ok(Json(WeeklyHoursResponse {
        provider_id: provider.id,
        days: days.into_iter().map(|day| day.into_day_hours()).collect(),
    }))
}

/// Effective policy read: the stored row, or the defaults when none exists.
#[axum::debug_handler]
pub async fn get_policy(
    State(state): State<Arc<ApiState>>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<BookingPolicy>, AppError> {
    let provider = fetch_provider(&state, provider_id).await?;

    let policy = slotwise_db::repositories::policy::get_policy(&state.db_pool, provider.id)
        .await
        .map_err(BookingError::Database)?
        .map(|row| row.into_policy())
        .unwrap_or_else(|| BookingPolicy::defaults_for(provider.id));

    Ok(Json(policy))
}

#[axum::debug_handler]
pub async fn upsert_policy(
    State(state): State<Arc<ApiState>>,
    Path(provider_id): Path<Uuid>,
    Json(payload): Json<UpsertBookingPolicyRequest>,
) -> Result<Json<BookingPolicy>, AppError> {
    let provider = fetch_provider(&state, provider_id).await?;

    if payload.max_daily_appointments < 1 {
        return Err(AppError(BookingError::Validation(format!(
            "max_daily_appointments must be at least 1, got {}",
            payload.max_daily_appointments
        ))));
    }
    if payload.buffer_minutes < 0 {
        return Err(AppError(BookingError::Validation(format!(
            "buffer_minutes must not be negative, got {}",
            payload.buffer_minutes
        ))));
    }

    let policy = slotwise_db::repositories::policy::upsert_policy(
        &state.db_pool,
        provider.id,
        payload.is_active,
        payload.max_daily_appointments,
        payload.buffer_minutes,
    )
    .await
    .map_err(BookingError::Database)?;

    Ok(Json(policy.into_policy()))
}

#[axum::debug_handler]
pub async fn list_blackouts(
    State(state): State<Arc<ApiState>>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Vec<BlackoutPeriod>>, AppError> {
    let provider = fetch_provider(&state, provider_id).await?;

    let rows = slotwise_db::repositories::blackout::list_blackouts(&state.db_pool, provider.id)
        .await
        .map_err(BookingError::Database)?;

    let mut blackouts = Vec::with_capacity(rows.len());
    for row in rows {
        blackouts.push(row.into_blackout().map_err(BookingError::Database)?);
    }

    Ok(Json(blackouts))
}

#[axum::debug_handler]
pub async fn create_blackout(
    State(state): State<Arc<ApiState>>,
    Path(provider_id): Path<Uuid>,
    Json(payload): Json<CreateBlackoutRequest>,
) -> Result<Json<BlackoutPeriod>, AppError> {
    let provider = fetch_provider(&state, provider_id).await?;

    if payload.start_time >= payload.end_time {
        return Err(AppError(BookingError::Validation(
            "start_time must be before end_time".to_string(),
        )));
    }

    let row = slotwise_db::repositories::blackout::create_blackout(
        &state.db_pool,
        provider.id,
        payload.start_time,
        payload.end_time,
        payload.reason.as_deref(),
        BlackoutOrigin::Provider,
    )
    .await
    .map_err(BookingError::Database)?;

    let blackout = row.into_blackout().map_err(BookingError::Database)?;

    Ok(Json(blackout))
}

/// Delete a provider-origin blackout. System-origin rows are booking
/// buffers; the booking flow owns their lifecycle.
#[axum::debug_handler]
pub async fn delete_blackout(
    State(state): State<Arc<ApiState>>,
    Path((provider_id, blackout_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    let provider = fetch_provider(&state, provider_id).await?;

    let row = slotwise_db::repositories::blackout::get_blackout_by_id(&state.db_pool, blackout_id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| {
            BookingError::NotFound(format!("Blackout with ID {} not found", blackout_id))
        })?;

    if row.provider_id != provider.id {
        return Err(AppError(BookingError::NotFound(format!(
            "Blackout with ID {} not found for provider {}",
            blackout_id, provider.id
        ))));
    }

    let blackout = row.into_blackout().map_err(BookingError::Database)?;
    if blackout.origin == BlackoutOrigin::System {
        return Err(AppError(BookingError::PolicyViolation(format!(
            "Blackout {} is a system buffer and cannot be deleted",
            blackout_id
        ))));
    }

    slotwise_db::repositories::blackout::delete_blackout(&state.db_pool, blackout_id)
        .await
        .map_err(BookingError::Database)?;

    Ok(StatusCode::NO_CONTENT)
}
