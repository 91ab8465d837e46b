use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/providers/:id/availability",
            get(handlers::availability::get_weekly_hours),
        )
        .route(
            "/api/providers/:id/availability",
            put(handlers::availability::replace_weekly_hours),
        )
        .route(
            "/api/providers/:id/policy",
            get(handlers::availability::get_policy),
        )
        .route(
            "/api/providers/:id/policy",
            put(handlers::availability::upsert_policy),
        )
        .route(
            "/api/providers/:id/blackouts",
            get(handlers::availability::list_blackouts),
        )
        .route(
            "/api/providers/:id/blackouts",
            post(handlers::availability::create_blackout),
        )
        .route(
            "/api/providers/:id/blackouts/:blackout_id",
            delete(handlers::availability::delete_blackout),
        )
}
