use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/providers", post(handlers::providers::onboard_provider))
        .route("/api/providers/:id", get(handlers::providers::get_provider))
        .route(
            "/api/providers/:id/services",
            post(handlers::providers::create_service),
        )
        .route("/api/clients", post(handlers::providers::create_client))
}
