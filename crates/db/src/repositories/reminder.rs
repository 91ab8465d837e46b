use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Claim the reminder flag for an appointment. Returns `true` when this call
/// inserted the flag, `false` when a previous tick already holds it, so each
/// appointment is reminded at most once.
pub async fn claim_reminder_flag(
    pool: &Pool<Postgres>,
    appointment_id: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO reminder_flags (appointment_id, expires_at, created_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (appointment_id) DO NOTHING
        "#,
    )
    .bind(appointment_id)
    .bind(expires_at)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Drop flags whose appointment has started; they have no further use.
pub async fn purge_expired_flags(pool: &Pool<Postgres>, now: DateTime<Utc>) -> Result<u64> {
    let result = sqlx::query("DELETE FROM reminder_flags WHERE expires_at <= $1")
        .bind(now)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
