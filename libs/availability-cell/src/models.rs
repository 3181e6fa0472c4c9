// libs/availability-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::StoreError;
use shared_models::AppError;

// ==============================================================================
// READ-ONLY ADMINISTRATIVE INPUTS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specialty {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub specialty_id: Uuid,
    pub name: String,
}

/// One recurring weekly working window, as stored on the practitioner record.
/// Validated before slot generation; an interval with
/// `start_time >= end_time` never produces slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkInterval {
    pub day: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Practitioner {
    pub id: Uuid,
    pub specialty_id: Uuid,
    pub full_name: String,
    pub work_hours: Vec<WorkInterval>,
}

// ==============================================================================
// AVAILABILITY OUTPUTS
// ==============================================================================

/// A candidate bookable window. Computed, never persisted; a confirmed slot
/// becomes an appointment owned by the booking cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub practitioner_id: Uuid,
    pub specialty_id: Uuid,
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// All slots of one calendar day, grouped for day-level views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub slots: Vec<Slot>,
}

/// A booked `[start, end)` range read from the ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BookedRange {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

// ==============================================================================
// SCHEDULING CONFIGURATION
// ==============================================================================

/// Fixed scheduling constants shared by all practitioners.
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    pub slot_duration_minutes: i64,
    pub horizon_days: i64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            slot_duration_minutes: 60,
            horizon_days: 7,
        }
    }
}

impl SchedulingConfig {
    /// Non-positive values would stall the slot walk, so they fall back to
    /// the defaults with a warning.
    pub fn from_app_config(config: &AppConfig) -> Self {
        let defaults = Self::default();

        let slot_duration_minutes = if config.slot_duration_minutes > 0 {
            config.slot_duration_minutes
        } else {
            warn!(
                "Configured slot duration {} is not positive, using {} minutes",
                config.slot_duration_minutes, defaults.slot_duration_minutes
            );
            defaults.slot_duration_minutes
        };

        let horizon_days = if config.horizon_days > 0 {
            config.horizon_days
        } else {
            warn!(
                "Configured horizon {} is not positive, using {} days",
                config.horizon_days, defaults.horizon_days
            );
            defaults.horizon_days
        };

        Self {
            slot_duration_minutes,
            horizon_days,
        }
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("invalid work interval on {day}: {start_time} is not before {end_time}")]
    InvalidSchedule {
        day: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
    },

    #[error("conflicting work intervals on {day}")]
    ConflictingIntervals { day: Weekday },

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("database error: {0}")]
    DatabaseError(String),
}

impl From<StoreError> for AvailabilityError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => AvailabilityError::StoreUnavailable(msg),
            other => AvailabilityError::DatabaseError(other.to_string()),
        }
    }
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::InvalidSelection(msg) => AppError::ValidationError(msg),
            AvailabilityError::StoreUnavailable(msg) => AppError::StoreUnavailable(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(slot_duration_minutes: i64, horizon_days: i64) -> AppConfig {
        AppConfig {
            store_url: "http://localhost".to_string(),
            store_service_key: "key".to_string(),
            store_timeout_secs: 5,
            slot_duration_minutes,
            horizon_days,
        }
    }

    #[test]
    fn scheduling_config_carries_positive_values() {
        let scheduling = SchedulingConfig::from_app_config(&config(30, 14));

        assert_eq!(scheduling.slot_duration_minutes, 30);
        assert_eq!(scheduling.horizon_days, 14);
    }

    #[test]
    fn non_positive_scheduling_values_fall_back_to_defaults() {
        for (duration, horizon) in [(0, 7), (-60, 7), (60, 0), (60, -1), (0, 0)] {
            let scheduling = SchedulingConfig::from_app_config(&config(duration, horizon));

            assert!(scheduling.slot_duration_minutes > 0);
            assert!(scheduling.horizon_days > 0);
        }
    }
}
