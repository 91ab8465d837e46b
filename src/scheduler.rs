use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use slotwise_core::clock::{SharedClock, SystemClock};
use slotwise_core::signals::SignalBus;
use slotwise_db::{create_pool, schema::initialize_database};
use slotwise_scheduler::config::SchedulerConfig;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Slotwise scheduling reconciler");

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = SchedulerConfig::from_env()?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    // Lifecycle signals are logged even when no other consumer is attached
    let signals = Arc::new(SignalBus::default());
    signals.spawn_logger();
    let clock: SharedClock = Arc::new(SystemClock);

    // Run the reconciler loop
    match slotwise_scheduler::run_scheduler(config, db_pool, clock, signals).await {
        Ok(_) => info!("Reconciler shut down gracefully"),
        Err(e) => error!("Reconciler error: {}", e),
    }

    Ok(())
}
