use crate::models::DbDayHours;
use eyre::Result;
use slotwise_core::models::availability::DayHours;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_weekly_hours(pool: &Pool<Postgres>, provider_id: Uuid) -> Result<Vec<DbDayHours>> {
    let days = sqlx::query_as::<_, DbDayHours>(
        r#"
        SELECT provider_id, day_of_week, start_time, end_time, is_available
        FROM weekly_hours
        WHERE provider_id = $1
        ORDER BY day_of_week
        "#,
    )
    .bind(provider_id)
    .fetch_all(pool)
    .await?;

    Ok(days)
}

pub async fn get_day_hours(
    pool: &Pool<Postgres>,
    provider_id: Uuid,
    day_of_week: i16,
) -> Result<Option<DbDayHours>> {
    let day = sqlx::query_as::<_, DbDayHours>(
        r#"
        SELECT provider_id, day_of_week, start_time, end_time, is_available
        FROM weekly_hours
        WHERE provider_id = $1 AND day_of_week = $2
        "#,
    )
    .bind(provider_id)
    .bind(day_of_week)
    .fetch_optional(pool)
    .await?;

    Ok(day)
}

/// Replace a provider's whole week in one transaction.
///
/// Callers validate the set (seven distinct days, start < end) before this
/// runs, so the table never holds a partial week.
pub async fn replace_weekly_hours(
    pool: &Pool<Postgres>,
    provider_id: Uuid,
    days: &[DayHours],
) -> Result<Vec<DbDayHours>> {
    tracing::debug!("Replacing weekly hours for provider: id={}", provider_id);

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM weekly_hours WHERE provider_id = $1")
        .bind(provider_id)
        .execute(&mut *tx)
        .await?;

    for day in days {
        sqlx::query(
            r#"
            INSERT INTO weekly_hours (provider_id, day_of_week, start_time, end_time, is_available)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(provider_id)
        .bind(day.day_of_week)
        .bind(day.start_time)
        .bind(day.end_time)
        .bind(day.is_available)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    get_weekly_hours(pool, provider_id).await
}
