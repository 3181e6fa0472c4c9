use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::ReserveAppointmentRequest;
use crate::services::booking::BookingCoordinator;

#[axum::debug_handler]
pub async fn reserve_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<ReserveAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let coordinator = BookingCoordinator::new(&state);

    let appointment = coordinator.reserve(request).await.map_err(AppError::from)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let coordinator = BookingCoordinator::new(&state);

    let appointment = coordinator
        .get_appointment(appointment_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn get_client_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let coordinator = BookingCoordinator::new(&state);

    let appointments = coordinator
        .list_for_client(client_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "total": appointments.len(),
        "appointments": appointments
    })))
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let coordinator = BookingCoordinator::new(&state);

    let appointment = coordinator
        .confirm_appointment(appointment_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let coordinator = BookingCoordinator::new(&state);

    let appointment = coordinator
        .cancel_appointment(appointment_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(appointment)))
}
