use eyre::{eyre, Result};
use serde::Deserialize;
use std::env;

/// Configuration for the scheduling reconciler.
///
/// This struct contains the parameters that govern the reconciler's tick
/// cadence and the time windows its sweeps operate over.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Database connection URL (required)
    pub database_url: String,
    /// Seconds between reconciler ticks (defaults to 60)
    pub tick_seconds: u64,
    /// How far ahead the upcoming sweep looks for reminders, in minutes
    /// (defaults to 10)
    pub lookahead_minutes: i64,
    /// How long an unconfirmed booking hold survives before the hold-expiry
    /// sweep cancels it, in minutes (defaults to 30)
    pub hold_minutes: i64,
}

impl SchedulerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| eyre!("DATABASE_URL environment variable not set"))?;

        let tick_seconds = env::var("SCHEDULER_TICK_SECONDS")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u64>()
            .map_err(|_| eyre!("SCHEDULER_TICK_SECONDS must be a valid u64"))?;
        if tick_seconds == 0 {
            return Err(eyre!("SCHEDULER_TICK_SECONDS must be at least 1"));
        }

        let lookahead_minutes = env::var("SCHEDULER_LOOKAHEAD_MINUTES")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<i64>()
            .map_err(|_| eyre!("SCHEDULER_LOOKAHEAD_MINUTES must be a valid i64"))?;
        if lookahead_minutes < 0 {
            return Err(eyre!("SCHEDULER_LOOKAHEAD_MINUTES must not be negative"));
        }

        let hold_minutes = env::var("SCHEDULER_HOLD_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<i64>()
            .map_err(|_| eyre!("SCHEDULER_HOLD_MINUTES must be a valid i64"))?;
        if hold_minutes < 1 {
            return Err(eyre!("SCHEDULER_HOLD_MINUTES must be at least 1"));
        }

        Ok(Self {
            database_url,
            tick_seconds,
            lookahead_minutes,
            hold_minutes,
        })
    }

    /// Tick cadence as a std `Duration` for `tokio::time::interval`
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.tick_seconds)
    }

    /// Reminder lookahead window
    pub fn lookahead(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.lookahead_minutes)
    }

    /// Booking hold time-to-live
    pub fn pending_hold(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.hold_minutes)
    }
}
