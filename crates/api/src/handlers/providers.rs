use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use slotwise_core::{
    errors::BookingError,
    models::provider::{
        Client, CreateClientRequest, CreateServiceRequest, OnboardProviderRequest, Provider,
        Service,
    },
    scheduling::resolve_timezone,
};
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

#[axum::debug_handler]
pub async fn onboard_provider(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<OnboardProviderRequest>,
) -> Result<Json<Provider>, AppError> {
    if payload.display_name.trim().is_empty() {
        return Err(AppError(BookingError::Validation(
            "display_name must not be empty".to_string(),
        )));
    }

    // Reject unknown timezones before anything is written
    resolve_timezone(&payload.timezone)?;

    // Provider row, default week and default policy land in one transaction
    let db_provider = slotwise_db::repositories::provider::onboard_provider(
        &state.db_pool,
        &payload.display_name,
        &payload.timezone,
    )
    .await
    .map_err(BookingError::Database)?;

    Ok(Json(db_provider.into_provider()))
}

#[axum::debug_handler]
pub async fn get_provider(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Provider>, AppError> {
    let db_provider = slotwise_db::repositories::provider::get_provider_by_id(&state.db_pool, id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound(format!("Provider with ID {} not found", id)))?;

    Ok(Json(db_provider.into_provider()))
}

#[axum::debug_handler]
pub async fn create_client(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateClientRequest>,
) -> Result<Json<Client>, AppError> {
    if payload.display_name.trim().is_empty() {
        return Err(AppError(BookingError::Validation(
            "display_name must not be empty".to_string(),
        )));
    }

    let db_client =
        slotwise_db::repositories::provider::create_client(&state.db_pool, &payload.display_name)
            .await
            .map_err(BookingError::Database)?;

    Ok(Json(db_client.into_client()))
}

#[axum::debug_handler]
pub async fn create_service(
    State(state): State<Arc<ApiState>>,
    Path(provider_id): Path<Uuid>,
    Json(payload): Json<CreateServiceRequest>,
) -> Result<Json<Service>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError(BookingError::Validation(
            "name must not be empty".to_string(),
        )));
    }
    if payload.duration_minutes < 1 {
        return Err(AppError(BookingError::Validation(format!(
            "duration_minutes must be at least 1, got {}",
            payload.duration_minutes
        ))));
    }

    slotwise_db::repositories::provider::get_provider_by_id(&state.db_pool, provider_id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| {
            BookingError::NotFound(format!("Provider with ID {} not found", provider_id))
        })?;

    let db_service = slotwise_db::repositories::provider::create_service(
        &state.db_pool,
        provider_id,
        &payload.name,
        payload.duration_minutes,
    )
    .await
    .map_err(BookingError::Database)?;

    Ok(Json(db_service.into_service()))
}
