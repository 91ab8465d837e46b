use crate::models::DbBookingPolicy;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_policy(pool: &Pool<Postgres>, provider_id: Uuid) -> Result<Option<DbBookingPolicy>> {
    let policy = sqlx::query_as::<_, DbBookingPolicy>(
        r#"
        SELECT provider_id, is_active, max_daily_appointments, buffer_minutes
        FROM booking_policies
        WHERE provider_id = $1
        "#,
    )
    .bind(provider_id)
    .fetch_optional(pool)
    .await?;

    Ok(policy)
}

pub async fn upsert_policy(
    pool: &Pool<Postgres>,
    provider_id: Uuid,
    is_active: bool,
    max_daily_appointments: i32,
    buffer_minutes: i32,
) -> Result<DbBookingPolicy> {
    tracing::debug!(
        "Upserting booking policy: provider_id={}, is_active={}, max_daily={}, buffer={}",
        provider_id,
        is_active,
        max_daily_appointments,
        buffer_minutes
    );

    let policy = sqlx::query_as::<_, DbBookingPolicy>(
        r#"
        INSERT INTO booking_policies (provider_id, is_active, max_daily_appointments, buffer_minutes)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (provider_id) DO UPDATE
        SET is_active = EXCLUDED.is_active,
            max_daily_appointments = EXCLUDED.max_daily_appointments,
            buffer_minutes = EXCLUDED.buffer_minutes
        RETURNING provider_id, is_active, max_daily_appointments, buffer_minutes
        "#,
    )
    .bind(provider_id)
    .bind(is_active)
    .bind(max_daily_appointments)
    .bind(buffer_minutes)
    .fetch_one(pool)
    .await?;

    Ok(policy)
}
