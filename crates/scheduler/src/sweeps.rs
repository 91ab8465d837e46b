//! The reconciler's ordered sweeps.
//!
//! Each tick walks four sweeps: start, upcoming (reminders), completion, and
//! hold expiry. Every state change goes through a status-guarded UPDATE, so
//! a sweep that races another process simply finds nothing left to do. A
//! failure on one appointment is logged and skipped; a failure reading the
//! due sets aborts the whole tick and the next tick retries.

use chrono::{DateTime, Duration, Utc};
use eyre::Result;
use slotwise_core::models::appointment::AppointmentStatus;
use slotwise_core::signals::{AppointmentSignal, SignalBus, SignalKind};
use slotwise_db::models::DbAppointment;
use sqlx::{Pool, Postgres};
use tracing::warn;

/// What one reconciler tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub started: usize,
    pub reminded: usize,
    pub completed: usize,
    pub expired_holds: usize,
    /// Appointments skipped after a per-row failure; retried next tick.
    pub skipped: usize,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.started == 0
            && self.reminded == 0
            && self.completed == 0
            && self.expired_holds == 0
            && self.skipped == 0
    }
}

/// The time-driven transition an appointment is due for, if any.
///
/// Boundary equality counts as due: an appointment starts the instant
/// `now == start_time` and completes the instant `now == end_time`.
pub fn due_transition(
    status: AppointmentStatus,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<AppointmentStatus> {
    match status {
        AppointmentStatus::Scheduled if start_time <= now => Some(AppointmentStatus::Started),
        AppointmentStatus::Started if end_time <= now => Some(AppointmentStatus::Completed),
        _ => None,
    }
}

/// Run the four sweeps once against `now`.
pub async fn run_tick(
    pool: &Pool<Postgres>,
    now: DateTime<Utc>,
    signals: &SignalBus,
    lookahead: Duration,
    hold_ttl: Duration,
) -> Result<TickReport> {
    let mut report = TickReport::default();

    start_sweep(pool, now, &mut report).await?;
    upcoming_sweep(pool, now, signals, lookahead, &mut report).await?;
    completion_sweep(pool, now, signals, &mut report).await?;
    hold_expiry_sweep(pool, now, signals, hold_ttl, &mut report).await?;

    Ok(report)
}

/// Scheduled appointments whose start time has arrived become `started`.
async fn start_sweep(
    pool: &Pool<Postgres>,
    now: DateTime<Utc>,
    report: &mut TickReport,
) -> Result<()> {
    let due = slotwise_db::repositories::appointment::due_to_start(pool, now).await?;

    for row in due {
        match advance(pool, &row, now).await {
            Ok(Some(_)) => report.started += 1,
            Ok(None) => {}
            Err(err) => {
                warn!("Start sweep failed for appointment {}: {err:#}", row.id);
                report.skipped += 1;
            }
        }
    }

    Ok(())
}

/// Claim a reminder flag for appointments starting inside the lookahead
/// window and emit `appointment.starting_soon` on first claim. The flag is
/// keyed by appointment id, so overlapping ticks and multiple reconciler
/// processes still produce at most one signal per appointment.
async fn upcoming_sweep(
    pool: &Pool<Postgres>,
    now: DateTime<Utc>,
    signals: &SignalBus,
    lookahead: Duration,
    report: &mut TickReport,
) -> Result<()> {
    let upcoming =
        slotwise_db::repositories::appointment::starting_within(pool, now, now + lookahead).await?;

    for row in upcoming {
        // The flag expires when the appointment starts; after that the start
        // sweep owns the row and the flag is garbage.
        let claim = slotwise_db::repositories::reminder::claim_reminder_flag(
            pool,
            row.id,
            row.start_time,
        )
        .await;

        match claim {
            Ok(true) => match row.into_appointment() {
                Ok(appointment) => {
                    signals.publish(AppointmentSignal::for_appointment(
                        SignalKind::StartingSoon,
                        &appointment,
                        now,
                    ));
                    report.reminded += 1;
                }
                Err(err) => {
                    warn!("Upcoming sweep could not decode appointment: {err:#}");
                    report.skipped += 1;
                }
            },
            Ok(false) => {}
            Err(err) => {
                warn!("Upcoming sweep failed for appointment {}: {err:#}", row.id);
                report.skipped += 1;
            }
        }
    }

    slotwise_db::repositories::reminder::purge_expired_flags(pool, now).await?;

    Ok(())
}

/// Started appointments whose end time has passed become `completed`.
async fn completion_sweep(
    pool: &Pool<Postgres>,
    now: DateTime<Utc>,
    signals: &SignalBus,
    report: &mut TickReport,
) -> Result<()> {
    let due = slotwise_db::repositories::appointment::due_to_complete(pool, now).await?;

    for row in due {
        match advance(pool, &row, now).await {
            Ok(Some(completed)) => {
                match completed.into_appointment() {
                    Ok(appointment) => signals.publish(AppointmentSignal::for_appointment(
                        SignalKind::Completed,
                        &appointment,
                        now,
                    )),
                    Err(err) => {
                        warn!("Completion sweep could not decode appointment: {err:#}");
                    }
                }
                report.completed += 1;
            }
            Ok(None) => {}
            Err(err) => {
                warn!(
                    "Completion sweep failed for appointment {}: {err:#}",
                    row.id
                );
                report.skipped += 1;
            }
        }
    }

    Ok(())
}

/// Pending holds older than the hold TTL are cancelled and their buffer
/// blackout released, freeing the slot for rebooking.
async fn hold_expiry_sweep(
    pool: &Pool<Postgres>,
    now: DateTime<Utc>,
    signals: &SignalBus,
    hold_ttl: Duration,
    report: &mut TickReport,
) -> Result<()> {
    let stale =
        slotwise_db::repositories::appointment::pending_created_before(pool, now - hold_ttl)
            .await?;

    for row in stale {
        match slotwise_db::repositories::appointment::expire_pending_hold(pool, row.id).await {
            Ok(Some(expired)) => {
                match expired.into_appointment() {
                    Ok(appointment) => signals.publish(AppointmentSignal::for_appointment(
                        SignalKind::Cancelled,
                        &appointment,
                        now,
                    )),
                    Err(err) => {
                        warn!("Hold-expiry sweep could not decode appointment: {err:#}");
                    }
                }
                report.expired_holds += 1;
            }
            Ok(None) => {}
            Err(err) => {
                warn!(
                    "Hold-expiry sweep failed for appointment {}: {err:#}",
                    row.id
                );
                report.skipped += 1;
            }
        }
    }

    Ok(())
}

/// Apply the transition `due_transition` prescribes for one row, if any.
/// Returns the updated row, or `None` when nothing was due or another
/// process already moved the row on.
async fn advance(
    pool: &Pool<Postgres>,
    row: &DbAppointment,
    now: DateTime<Utc>,
) -> Result<Option<DbAppointment>> {
    let status = row.status()?;
    let Some(next) = due_transition(status, row.start_time, row.end_time, now) else {
        return Ok(None);
    };

    slotwise_db::repositories::appointment::transition_status(
        pool,
        row.id,
        status.as_str(),
        next.as_str(),
    )
    .await
}
