// libs/booking-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use crate::models::{AppointmentStatus, BookingError};

/// Appointment status machine: pending -> confirmed, pending -> cancelled,
/// confirmed -> cancelled. Cancelled is terminal.
pub struct AppointmentLifecycle;

impl AppointmentLifecycle {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<(), BookingError> {
        debug!(
            "Validating status transition from {} to {}",
            current_status, new_status
        );

        if !self.valid_transitions(current_status).contains(&new_status) {
            warn!(
                "Invalid status transition attempted: {} -> {}",
                current_status, new_status
            );
            return Err(BookingError::InvalidStatusTransition(current_status));
        }

        Ok(())
    }

    /// All valid next statuses for a given current status
    pub fn valid_transitions(&self, current_status: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Pending => vec![
                AppointmentStatus::Confirmed,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::Confirmed => vec![AppointmentStatus::Cancelled],
            // Terminal state - no transitions allowed
            AppointmentStatus::Cancelled => vec![],
        }
    }
}

impl Default for AppointmentLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn pending_can_be_confirmed_or_cancelled() {
        let lifecycle = AppointmentLifecycle::new();

        assert!(lifecycle
            .validate_status_transition(AppointmentStatus::Pending, AppointmentStatus::Confirmed)
            .is_ok());
        assert!(lifecycle
            .validate_status_transition(AppointmentStatus::Pending, AppointmentStatus::Cancelled)
            .is_ok());
    }

    #[test]
    fn confirmed_can_only_be_cancelled() {
        let lifecycle = AppointmentLifecycle::new();

        assert!(lifecycle
            .validate_status_transition(AppointmentStatus::Confirmed, AppointmentStatus::Cancelled)
            .is_ok());
        assert_matches!(
            lifecycle.validate_status_transition(AppointmentStatus::Confirmed, AppointmentStatus::Pending),
            Err(BookingError::InvalidStatusTransition(AppointmentStatus::Confirmed))
        );
    }

    #[test]
    fn cancelled_is_terminal() {
        let lifecycle = AppointmentLifecycle::new();

        for next in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Cancelled,
        ] {
            assert_matches!(
                lifecycle.validate_status_transition(AppointmentStatus::Cancelled, next),
                Err(BookingError::InvalidStatusTransition(AppointmentStatus::Cancelled))
            );
        }
    }
}
