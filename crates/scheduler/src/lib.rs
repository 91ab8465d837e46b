//! # Slotwise Scheduler
//!
//! The periodic reconciler that keeps appointment state aligned with
//! wall-clock time: starting appointments whose slot has arrived, completing
//! ones whose window has passed, emitting starting-soon reminders, and
//! expiring unconfirmed booking holds. All sweeps are idempotent, so running
//! several reconciler processes side by side is safe.

pub mod config;
pub mod sweeps;

use std::sync::Arc;

use eyre::Result;
use slotwise_core::clock::SharedClock;
use slotwise_core::signals::SignalBus;
use sqlx::PgPool;
use tracing::{debug, error, info};

/// Run the reconciler loop until the process is stopped.
///
/// Each tick reads the clock once, runs the sweeps against that instant, and
/// logs the outcome. A failed tick is logged and retried on the next
/// interval; it never takes the process down.
pub async fn run_scheduler(
    config: config::SchedulerConfig,
    db_pool: PgPool,
    clock: SharedClock,
    signals: Arc<SignalBus>,
) -> Result<()> {
    info!(
        "Starting scheduling reconciler: tick every {}s, lookahead {}m, hold TTL {}m",
        config.tick_seconds, config.lookahead_minutes, config.hold_minutes
    );

    let mut interval = tokio::time::interval(config.tick_interval());

    loop {
        interval.tick().await;
        let now = clock.now();

        match sweeps::run_tick(
            &db_pool,
            now,
            &signals,
            config.lookahead(),
            config.pending_hold(),
        )
        .await
        {
            Ok(report) if report.is_empty() => debug!("Reconciler tick: nothing due"),
            Ok(report) => info!(
                started = report.started,
                reminded = report.reminded,
                completed = report.completed,
                expired_holds = report.expired_holds,
                skipped = report.skipped,
                "Reconciler tick finished"
            ),
            Err(err) => error!("Reconciler tick aborted, retrying next interval: {err:#}"),
        }
    }
}
