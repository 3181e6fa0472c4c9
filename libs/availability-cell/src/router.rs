// libs/availability-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn availability_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/days", get(handlers::get_available_days))
        .route("/slots", get(handlers::get_available_slots))
        .with_state(state)
}
