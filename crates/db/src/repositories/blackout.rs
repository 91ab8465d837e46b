use crate::models::DbBlackoutPeriod;
use chrono::{DateTime, Utc};
use eyre::Result;
use slotwise_core::models::blackout::BlackoutOrigin;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_blackout(
    pool: &Pool<Postgres>,
    provider_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    reason: Option<&str>,
    origin: BlackoutOrigin,
) -> Result<DbBlackoutPeriod> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating blackout: id={}, provider_id={}, start={}, end={}, origin={}",
        id,
        provider_id,
        start_time,
        end_time,
        origin.as_str()
    );

    let blackout = sqlx::query_as::<_, DbBlackoutPeriod>(
        r#"
        INSERT INTO blackout_periods (id, provider_id, start_time, end_time, reason, origin, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, provider_id, start_time, end_time, reason, origin, created_at
        "#,
    )
    .bind(id)
    .bind(provider_id)
    .bind(start_time)
    .bind(end_time)
    .bind(reason)
    .bind(origin.as_str())
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(blackout)
}

pub async fn get_blackout_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbBlackoutPeriod>> {
    let blackout = sqlx::query_as::<_, DbBlackoutPeriod>(
        r#"
        SELECT id, provider_id, start_time, end_time, reason, origin, created_at
        FROM blackout_periods
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(blackout)
}

pub async fn list_blackouts(
    pool: &Pool<Postgres>,
    provider_id: Uuid,
) -> Result<Vec<DbBlackoutPeriod>> {
    let blackouts = sqlx::query_as::<_, DbBlackoutPeriod>(
        r#"
        SELECT id, provider_id, start_time, end_time, reason, origin, created_at
        FROM blackout_periods
        WHERE provider_id = $1
        ORDER BY start_time
        "#,
    )
    .bind(provider_id)
    .fetch_all(pool)
    .await?;

    Ok(blackouts)
}

/// Blackouts overlapping the half-open window `[from, to)`.
pub async fn list_blackouts_between(
    pool: &Pool<Postgres>,
    provider_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<DbBlackoutPeriod>> {
    let blackouts = sqlx::query_as::<_, DbBlackoutPeriod>(
        r#"
        SELECT id, provider_id, start_time, end_time, reason, origin, created_at
        FROM blackout_periods
        WHERE provider_id = $1 AND start_time < $3 AND end_time > $2
        ORDER BY start_time
        "#,
    )
    .bind(provider_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(blackouts)
}

pub async fn delete_blackout(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    tracing::debug!("Deleting blackout: id={}", id);

    let result = sqlx::query("DELETE FROM blackout_periods WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
