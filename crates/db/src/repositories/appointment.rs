use crate::models::DbAppointment;
use chrono::{DateTime, Duration, Utc};
use eyre::{eyre, Result};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Payload for [`book_appointment`]. Times are UTC instants resolved from the
/// provider-local slot request before the write begins.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub client_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub timezone: String,
}

/// Outcome of the booking transaction.
#[derive(Debug, Clone)]
pub enum BookingWrite {
    /// The hold was written; the appointment is `pending`.
    Created(DbAppointment),
    /// The window overlaps a blocking appointment or a blackout.
    SlotTaken,
    /// The provider already has `max_daily_appointments` on that day.
    DailyCapReached,
}

/// Write a provisional booking hold.
///
/// The provider row is locked `FOR UPDATE` so bookings for one provider
/// serialize; the overlap and daily-cap checks then run against committed
/// state. The `no_blocking_overlap` exclusion constraint is the final
/// arbiter: if it fires anyway the write reports `SlotTaken` instead of
/// surfacing a database error.
///
/// `day_start`/`day_end` bound the provider-local calendar day in UTC and
/// scope the daily-cap count. A post-session buffer blackout is materialized
/// in the same transaction when `buffer_minutes > 0`.
pub async fn book_appointment(
    pool: &Pool<Postgres>,
    new: &NewAppointment,
    buffer_minutes: i32,
    day_start: DateTime<Utc>,
    day_end: DateTime<Utc>,
    max_daily: i32,
) -> Result<BookingWrite> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Booking appointment: id={}, provider_id={}, start={}, end={}",
        id,
        new.provider_id,
        new.start_time,
        new.end_time
    );

    let mut tx = pool.begin().await?;

    sqlx::query("SELECT id FROM providers WHERE id = $1 FOR UPDATE")
        .bind(new.provider_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| eyre!("provider not found: {}", new.provider_id))?;

    let blocking: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM appointments
        WHERE provider_id = $1
          AND status IN ('pending', 'scheduled', 'started')
          AND start_time < $3 AND end_time > $2
        "#,
    )
    .bind(new.provider_id)
    .bind(new.start_time)
    .bind(new.end_time)
    .fetch_one(&mut *tx)
    .await?;

    if blocking > 0 {
        tx.rollback().await?;
        return Ok(BookingWrite::SlotTaken);
    }

    // Blackouts written after the caller assembled its slot picture still
    // block here, including a competitor's just-committed buffer.
    let blacked_out: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM blackout_periods
        WHERE provider_id = $1
          AND start_time < $3 AND end_time > $2
        "#,
    )
    .bind(new.provider_id)
    .bind(new.start_time)
    .bind(new.end_time)
    .fetch_one(&mut *tx)
    .await?;

    if blacked_out > 0 {
        tx.rollback().await?;
        return Ok(BookingWrite::SlotTaken);
    }

    let booked_today: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM appointments
        WHERE provider_id = $1
          AND status <> 'cancelled'
          AND start_time >= $2 AND start_time < $3
        "#,
    )
    .bind(new.provider_id)
    .bind(day_start)
    .bind(day_end)
    .fetch_one(&mut *tx)
    .await?;

    if booked_today >= i64::from(max_daily) {
        tx.rollback().await?;
        return Ok(BookingWrite::DailyCapReached);
    }

    let inserted = sqlx::query_as::<_, DbAppointment>(
        r#"
        INSERT INTO appointments
            (id, client_id, provider_id, service_id, start_time, end_time,
             timezone, status, cancellation_reason, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', NULL, $8)
        RETURNING id, client_id, provider_id, service_id, start_time, end_time,
                  timezone, status, cancellation_reason, created_at
        "#,
    )
    .bind(id)
    .bind(new.client_id)
    .bind(new.provider_id)
    .bind(new.service_id)
    .bind(new.start_time)
    .bind(new.end_time)
    .bind(&new.timezone)
    .bind(now)
    .fetch_one(&mut *tx)
    .await;

    let appointment = match inserted {
        Ok(appointment) => appointment,
        Err(sqlx::Error::Database(db_err))
            if db_err.constraint() == Some("no_blocking_overlap") =>
        {
            tx.rollback().await?;
            return Ok(BookingWrite::SlotTaken);
        }
        Err(err) => return Err(err.into()),
    };

    if buffer_minutes > 0 {
        let buffer_end = appointment.end_time + Duration::minutes(i64::from(buffer_minutes));
        sqlx::query(
            r#"
            INSERT INTO blackout_periods
                (id, provider_id, start_time, end_time, reason, origin, created_at)
            VALUES ($1, $2, $3, $4, 'post-session buffer', 'system', $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(appointment.provider_id)
        .bind(appointment.end_time)
        .bind(buffer_end)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::debug!("Appointment hold written: id={}", appointment.id);
    Ok(BookingWrite::Created(appointment))
}

pub async fn get_appointment_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, client_id, provider_id, service_id, start_time, end_time,
               timezone, status, cancellation_reason, created_at
        FROM appointments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

/// Guarded transition: updates the row only while it still holds `from`.
/// Returns `None` when the appointment is missing or has moved on.
pub async fn transition_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    from: &str,
    to: &str,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(
        r#"
        UPDATE appointments
        SET status = $3
        WHERE id = $1 AND status = $2
        RETURNING id, client_id, provider_id, service_id, start_time, end_time,
                  timezone, status, cancellation_reason, created_at
        "#,
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

/// Confirm a pending hold. Returns `None` if the hold is gone or no longer
/// pending.
pub async fn confirm_appointment(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbAppointment>> {
    tracing::debug!("Confirming appointment: id={}", id);
    transition_status(pool, id, "pending", "scheduled").await
}

/// Cancel a scheduled appointment and release its post-session buffer.
/// Pending holds are not cancellable through this path; the hold-expiry
/// sweep retires them instead.
pub async fn cancel_appointment(
    pool: &Pool<Postgres>,
    id: Uuid,
    reason: &str,
) -> Result<Option<DbAppointment>> {
    tracing::debug!("Cancelling appointment: id={}", id);
    cancel_with_status(pool, id, reason, &["scheduled"]).await
}

/// Expire a stale booking hold. Only `pending` rows qualify.
pub async fn expire_pending_hold(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbAppointment>> {
    tracing::debug!("Expiring booking hold: id={}", id);
    cancel_with_status(pool, id, "booking hold expired", &["pending"]).await
}

async fn cancel_with_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    reason: &str,
    from: &[&str],
) -> Result<Option<DbAppointment>> {
    let from_tags: Vec<String> = from.iter().map(|s| s.to_string()).collect();

    let mut tx = pool.begin().await?;

    let appointment = sqlx::query_as::<_, DbAppointment>(
        r#"
        UPDATE appointments
        SET status = 'cancelled', cancellation_reason = $2
        WHERE id = $1 AND status = ANY($3)
        RETURNING id, client_id, provider_id, service_id, start_time, end_time,
                  timezone, status, cancellation_reason, created_at
        "#,
    )
    .bind(id)
    .bind(reason)
    .bind(&from_tags)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(appointment) = appointment else {
        tx.rollback().await?;
        return Ok(None);
    };

    // Release the buffer only when no other blocking appointment ends at the
    // same instant; its identical buffer row must survive.
    let still_blocked: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM appointments
        WHERE provider_id = $1
          AND end_time = $2
          AND status IN ('pending', 'scheduled', 'started')
        "#,
    )
    .bind(appointment.provider_id)
    .bind(appointment.end_time)
    .fetch_one(&mut *tx)
    .await?;

    if still_blocked == 0 {
        sqlx::query(
            r#"
            DELETE FROM blackout_periods
            WHERE provider_id = $1 AND origin = 'system' AND start_time = $2
            "#,
        )
        .bind(appointment.provider_id)
        .bind(appointment.end_time)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::debug!("Appointment cancelled: id={}", appointment.id);
    Ok(Some(appointment))
}

/// Blocking appointments overlapping the half-open window `[from, to)`.
pub async fn list_blocking_between(
    pool: &Pool<Postgres>,
    provider_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, client_id, provider_id, service_id, start_time, end_time,
               timezone, status, cancellation_reason, created_at
        FROM appointments
        WHERE provider_id = $1
          AND status IN ('pending', 'scheduled', 'started')
          AND start_time < $3 AND end_time > $2
        ORDER BY start_time
        "#,
    )
    .bind(provider_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// Scheduled appointments whose start time has arrived.
pub async fn due_to_start(pool: &Pool<Postgres>, now: DateTime<Utc>) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, client_id, provider_id, service_id, start_time, end_time,
               timezone, status, cancellation_reason, created_at
        FROM appointments
        WHERE status = 'scheduled' AND start_time <= $1
        ORDER BY start_time
        "#,
    )
    .bind(now)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// Started appointments whose end time has passed.
pub async fn due_to_complete(
    pool: &Pool<Postgres>,
    now: DateTime<Utc>,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, client_id, provider_id, service_id, start_time, end_time,
               timezone, status, cancellation_reason, created_at
        FROM appointments
        WHERE status = 'started' AND end_time <= $1
        ORDER BY end_time
        "#,
    )
    .bind(now)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// Scheduled appointments starting inside `(from, to]`, soonest first.
pub async fn starting_within(
    pool: &Pool<Postgres>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, client_id, provider_id, service_id, start_time, end_time,
               timezone, status, cancellation_reason, created_at
        FROM appointments
        WHERE status = 'scheduled' AND start_time > $1 AND start_time <= $2
        ORDER BY start_time
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// Pending holds created at or before `cutoff`, oldest first.
pub async fn pending_created_before(
    pool: &Pool<Postgres>,
    cutoff: DateTime<Utc>,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, client_id, provider_id, service_id, start_time, end_time,
               timezone, status, cancellation_reason, created_at
        FROM appointments
        WHERE status = 'pending' AND created_at <= $1
        ORDER BY created_at
        "#,
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}
