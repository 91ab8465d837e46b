use crate::models::{DbClient, DbProvider, DbService};
use chrono::Utc;
use eyre::Result;
use slotwise_core::models::availability::DayHours;
use slotwise_core::models::policy::BookingPolicy;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Create a provider together with its default week and booking policy.
///
/// Onboarding is all-or-nothing: a provider row never exists without its
/// seven weekly_hours rows and a policy row.
pub async fn onboard_provider(
    pool: &Pool<Postgres>,
    display_name: &str,
    timezone: &str,
) -> Result<DbProvider> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Onboarding provider: id={}, display_name={}, timezone={}",
        id,
        display_name,
        timezone
    );

    let mut tx = pool.begin().await?;

    let provider = sqlx::query_as::<_, DbProvider>(
        r#"
        INSERT INTO providers (id, display_name, timezone, is_active, created_at)
        VALUES ($1, $2, $3, TRUE, $4)
        RETURNING id, display_name, timezone, is_active, created_at
        "#,
    )
    .bind(id)
    .bind(display_name)
    .bind(timezone)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    for day in DayHours::default_week() {
        sqlx::query(
            r#"
            INSERT INTO weekly_hours (provider_id, day_of_week, start_time, end_time, is_available)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(day.day_of_week)
        .bind(day.start_time)
        .bind(day.end_time)
        .bind(day.is_available)
        .execute(&mut *tx)
        .await?;
    }

    let policy = BookingPolicy::defaults_for(id);
    sqlx::query(
        r#"
        INSERT INTO booking_policies (provider_id, is_active, max_daily_appointments, buffer_minutes)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(policy.is_active)
    .bind(policy.max_daily_appointments)
    .bind(policy.buffer_minutes)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!("Provider onboarded successfully: id={}", id);
    Ok(provider)
}

pub async fn get_provider_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbProvider>> {
    let provider = sqlx::query_as::<_, DbProvider>(
        r#"
        SELECT id, display_name, timezone, is_active, created_at
        FROM providers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(provider)
}

pub async fn create_client(pool: &Pool<Postgres>, display_name: &str) -> Result<DbClient> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let client = sqlx::query_as::<_, DbClient>(
        r#"
        INSERT INTO clients (id, display_name, created_at)
        VALUES ($1, $2, $3)
        RETURNING id, display_name, created_at
        "#,
    )
    .bind(id)
    .bind(display_name)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(client)
}

pub async fn get_client_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbClient>> {
    let client = sqlx::query_as::<_, DbClient>(
        r#"
        SELECT id, display_name, created_at
        FROM clients
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(client)
}

pub async fn create_service(
    pool: &Pool<Postgres>,
    provider_id: Uuid,
    name: &str,
    duration_minutes: i32,
) -> Result<DbService> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let service = sqlx::query_as::<_, DbService>(
        r#"
        INSERT INTO services (id, provider_id, name, duration_minutes, is_active, created_at)
        VALUES ($1, $2, $3, $4, TRUE, $5)
        RETURNING id, provider_id, name, duration_minutes, is_active, created_at
        "#,
    )
    .bind(id)
    .bind(provider_id)
    .bind(name)
    .bind(duration_minutes)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(service)
}

pub async fn get_service_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbService>> {
    let service = sqlx::query_as::<_, DbService>(
        r#"
        SELECT id, provider_id, name, duration_minutes, is_active, created_at
        FROM services
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(service)
}
