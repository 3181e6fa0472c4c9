// libs/booking-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn booking_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::reserve_appointment))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/confirm", patch(handlers::confirm_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/clients/{client_id}", get(handlers::get_client_appointments))
        .with_state(state)
}
