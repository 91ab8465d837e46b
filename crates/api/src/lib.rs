//! # Slotwise API
//!
//! The API crate provides the web server implementation for the Slotwise
//! scheduling service. It defines RESTful endpoints for provider settings,
//! daily slot queries and the appointment lifecycle.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Provide cross-cutting concerns like error handling
//! - **Config**: Handle environment and application configuration
//!
//! The API uses Axum as the web framework and SQLx for database interactions.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::Router;
use eyre::Result;
use slotwise_core::clock::SharedClock;
use slotwise_core::signals::SignalBus;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
///
/// This struct encapsulates dependencies that are shared across the
/// application: the database connection pool, the clock every scheduling
/// decision reads, and the signal bus lifecycle transitions publish to.
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// Source of the current instant; swapped for a fixed clock in tests
    pub clock: SharedClock,
    /// Fan-out bus for appointment lifecycle signals
    pub signals: Arc<SignalBus>,
}

/// Starts the API server with the provided configuration and shared state
///
/// Assembling the state (pool, clock, signal bus) is the caller's job; this
/// function sets up logging, configures routes, and starts the HTTP server.
pub async fn start_server(config: config::ApiConfig, state: Arc<ApiState>) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Build the application router with all routes
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Provider, client and service onboarding endpoints
        .merge(routes::providers::routes())
        // Daily slot query endpoints
        .merge(routes::slots::routes())
        // Weekly hours, policy and blackout endpoints
        .merge(routes::availability::routes())
        // Appointment lifecycle endpoints
        .merge(routes::appointments::routes())
        // Attach shared state to all routes
        .with_state(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let mut parsed = Vec::with_capacity(origins.len());
        for origin in origins {
            parsed.push(
                origin
                    .parse()
                    .map_err(|_| eyre::eyre!("invalid CORS origin: {origin}"))?,
            );
        }
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(parsed)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(tower_http::timeout::TimeoutLayer::new(
        std::time::Duration::from_secs(config.request_timeout),
    ));

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
