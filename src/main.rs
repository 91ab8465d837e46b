use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use slotwise_api::{config::ApiConfig, ApiState};
use slotwise_core::clock::{SharedClock, SystemClock};
use slotwise_core::signals::SignalBus;
use slotwise_db::{create_pool, schema::initialize_database};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    dotenv().ok();

    let config = ApiConfig::from_env()?;

    let db_pool = create_pool(&config.database_url).await?;
    initialize_database(&db_pool).await?;

    // Booking handlers publish lifecycle transitions on this bus; the logger
    // task traces them even when no scheduler is attached
    let signals = Arc::new(SignalBus::default());
    signals.spawn_logger();
    let clock: SharedClock = Arc::new(SystemClock);

    let state = Arc::new(ApiState {
        db_pool,
        clock,
        signals,
    });

    slotwise_api::start_server(config, state).await?;

    Ok(())
}
