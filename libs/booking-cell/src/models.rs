// libs/booking-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::AppError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// A persisted reservation. Appointments are never deleted; cancellation is a
/// status transition, which preserves the audit history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub specialty_id: Uuid,
    pub specialty_name: String,
    pub service_id: Uuid,
    pub service_name: String,
    pub practitioner_id: Uuid,
    pub practitioner_name: String,
    pub client_id: Uuid,
    pub client_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A client's slot selection, exactly as the availability views handed it
/// out. Re-validated against the current ledger at commit time; the
/// aggregation the client saw may be arbitrarily old.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveAppointmentRequest {
    pub client_id: Uuid,
    pub client_name: String,
    pub specialty_id: Uuid,
    pub specialty_name: String,
    pub service_id: Uuid,
    pub service_name: String,
    pub practitioner_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("slot is no longer available")]
    SlotConflict,

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("practitioner not found")]
    PractitionerNotFound,

    #[error("appointment not found")]
    NotFound,

    #[error("invalid status transition from {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("appointment status changed concurrently")]
    StatusConflict,

    #[error("database error: {0}")]
    DatabaseError(String),
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            // The store's conditional-write rejection is the authoritative
            // conflict signal.
            StoreError::Conflict => BookingError::SlotConflict,
            StoreError::Unavailable(msg) => BookingError::StoreUnavailable(msg),
            other => BookingError::DatabaseError(other.to_string()),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::SlotConflict => AppError::Conflict(err.to_string()),
            BookingError::StoreUnavailable(msg) => AppError::StoreUnavailable(msg),
            BookingError::InvalidSelection(msg) => AppError::ValidationError(msg),
            BookingError::PractitionerNotFound | BookingError::NotFound => {
                AppError::NotFound(err.to_string())
            }
            BookingError::InvalidStatusTransition(_) => AppError::BadRequest(err.to_string()),
            BookingError::StatusConflict => AppError::Conflict(err.to_string()),
            BookingError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
