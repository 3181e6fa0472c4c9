use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::services::availability::AvailabilityService;

// Query parameters for availability endpoints
#[derive(Debug, Deserialize)]
pub struct AvailableDaysQuery {
    pub specialty_id: Uuid,
    pub service_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AvailableSlotsQuery {
    pub specialty_id: Uuid,
    pub service_id: Uuid,
    pub date: NaiveDate,
}

#[axum::debug_handler]
pub async fn get_available_days(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<AvailableDaysQuery>,
) -> Result<Json<Value>, AppError> {
    let availability_service = AvailabilityService::new(&state);

    let days = availability_service
        .compute_available_days(query.specialty_id, query.service_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "specialty_id": query.specialty_id,
        "service_id": query.service_id,
        "total_days": days.len(),
        "available_days": days
    })))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let availability_service = AvailabilityService::new(&state);

    let slots = availability_service
        .compute_available_slots(query.specialty_id, query.service_id, query.date)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "specialty_id": query.specialty_id,
        "service_id": query.service_id,
        "date": query.date,
        "total_slots": slots.len(),
        "available_slots": slots
    })))
}
