// libs/booking-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{Duration, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use availability_cell::models::{Practitioner, SchedulingConfig};
use availability_cell::services::ledger::BookingLedger;
use shared_config::AppConfig;
use shared_database::StoreClient;

use crate::models::{Appointment, AppointmentStatus, BookingError, ReserveAppointmentRequest};
use crate::services::lifecycle::AppointmentLifecycle;

/// Commits a client's slot selection into a durable appointment.
///
/// The commit path is optimistic: a fresh ledger re-check avoids most doomed
/// writes, but the store's conditional insert is the only authority on
/// conflicts. A reservation that loses the race surfaces `SlotConflict`
/// verbatim; the caller re-queries availability and picks again, the
/// coordinator never substitutes an adjacent slot.
pub struct BookingCoordinator {
    store: Arc<StoreClient>,
    ledger: BookingLedger,
    lifecycle: AppointmentLifecycle,
    slot_duration: Duration,
}

impl BookingCoordinator {
    pub fn new(config: &AppConfig) -> Self {
        let store = Arc::new(StoreClient::new(config));
        let scheduling = SchedulingConfig::from_app_config(config);

        Self {
            ledger: BookingLedger::new(Arc::clone(&store)),
            lifecycle: AppointmentLifecycle::new(),
            slot_duration: Duration::minutes(scheduling.slot_duration_minutes),
            store,
        }
    }

    /// Reserve a slot. Returns the persisted appointment with status
    /// `pending`, or `SlotConflict` if another reservation won the race.
    pub async fn reserve(&self, request: ReserveAppointmentRequest) -> Result<Appointment, BookingError> {
        info!(
            "Reserving slot at {} with practitioner {} for client {}",
            request.start_time, request.practitioner_id, request.client_id
        );

        // Caller-input validation happens before any I/O
        self.validate_selection(&request)?;

        let practitioner = self.get_practitioner(request.practitioner_id).await?;
        if practitioner.specialty_id != request.specialty_id {
            return Err(BookingError::InvalidSelection(format!(
                "Practitioner {} does not serve specialty {}",
                request.practitioner_id, request.specialty_id
            )));
        }

        // Re-check against the current ledger state. The availability the
        // client saw may be stale; this avoids doomed write attempts but is
        // not the authority.
        let booked = self
            .ledger
            .overlapping(request.practitioner_id, request.start_time, request.end_time)
            .await
            .map_err(|e| match e {
                availability_cell::models::AvailabilityError::StoreUnavailable(msg) => {
                    BookingError::StoreUnavailable(msg)
                }
                other => BookingError::DatabaseError(other.to_string()),
            })?;

        if !booked.is_empty() {
            warn!(
                "Slot at {} for practitioner {} already taken at re-validation",
                request.start_time, request.practitioner_id
            );
            return Err(BookingError::SlotConflict);
        }

        // Conditional write: the store rejects the row if a conflicting
        // reservation raced in after the re-check.
        let appointment = self
            .create_appointment_record(&practitioner, request)
            .await?;

        info!("Appointment {} reserved with status pending", appointment.id);
        Ok(appointment)
    }

    /// Get appointment by ID
    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, BookingError> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self.store.request(Method::GET, &path, None).await?;

        if result.is_empty() {
            return Err(BookingError::NotFound);
        }

        let appointment: Appointment = serde_json::from_value(result[0].clone())
            .map_err(|e| BookingError::DatabaseError(format!("Failed to parse appointment: {}", e)))?;

        Ok(appointment)
    }

    /// All appointments of one client, ascending by start time
    pub async fn list_for_client(&self, client_id: Uuid) -> Result<Vec<Appointment>, BookingError> {
        debug!("Listing appointments for client: {}", client_id);

        let path = format!(
            "/rest/v1/appointments?client_id=eq.{}&order=start_time.asc",
            client_id
        );
        let result: Vec<Value> = self.store.request(Method::GET, &path, None).await?;

        let appointments: Vec<Appointment> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| BookingError::DatabaseError(format!("Failed to parse appointments: {}", e)))?;

        Ok(appointments)
    }

    /// Confirm a pending appointment (administrative action)
    pub async fn confirm_appointment(&self, appointment_id: Uuid) -> Result<Appointment, BookingError> {
        self.transition_status(appointment_id, AppointmentStatus::Confirmed)
            .await
    }

    /// Cancel an appointment. The slot is freed immediately: cancelled rows
    /// are excluded from every ledger read.
    pub async fn cancel_appointment(&self, appointment_id: Uuid) -> Result<Appointment, BookingError> {
        self.transition_status(appointment_id, AppointmentStatus::Cancelled)
            .await
    }

    // ==============================================================================
    // PRIVATE HELPER METHODS
    // ==============================================================================

    fn validate_selection(&self, request: &ReserveAppointmentRequest) -> Result<(), BookingError> {
        if request.end_time != request.start_time + self.slot_duration {
            return Err(BookingError::InvalidSelection(format!(
                "Slot must span exactly {} minutes",
                self.slot_duration.num_minutes()
            )));
        }

        if request.start_time <= Utc::now() {
            return Err(BookingError::InvalidSelection(
                "Slot start must be in the future".to_string(),
            ));
        }

        Ok(())
    }

    async fn get_practitioner(&self, practitioner_id: Uuid) -> Result<Practitioner, BookingError> {
        let path = format!("/rest/v1/practitioners?id=eq.{}", practitioner_id);
        let result: Vec<Value> = self.store.request(Method::GET, &path, None).await?;

        if result.is_empty() {
            return Err(BookingError::PractitionerNotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| BookingError::DatabaseError(format!("Failed to parse practitioner: {}", e)))
    }

    async fn create_appointment_record(
        &self,
        practitioner: &Practitioner,
        request: ReserveAppointmentRequest,
    ) -> Result<Appointment, BookingError> {
        let now = Utc::now();

        let appointment_data = json!({
            "specialty_id": request.specialty_id,
            "specialty_name": request.specialty_name,
            "service_id": request.service_id,
            "service_name": request.service_name,
            "practitioner_id": request.practitioner_id,
            "practitioner_name": practitioner.full_name,
            "client_id": request.client_id,
            "client_name": request.client_name,
            "start_time": request.start_time.to_rfc3339(),
            "end_time": request.end_time.to_rfc3339(),
            "status": AppointmentStatus::Pending.to_string(),
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let result = self
            .store
            .insert_returning("/rest/v1/appointments", appointment_data)
            .await?;

        if result.is_empty() {
            return Err(BookingError::DatabaseError(
                "Failed to create appointment".to_string(),
            ));
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| BookingError::DatabaseError(format!("Failed to parse created appointment: {}", e)))
    }

    async fn transition_status(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, BookingError> {
        debug!("Transitioning appointment {} to {}", appointment_id, new_status);

        let current = self.get_appointment(appointment_id).await?;
        self.lifecycle
            .validate_status_transition(current.status, new_status)?;

        // Conditional write: the PATCH only matches while the row still has
        // the status we validated against. A transition that raced in after
        // the read leaves nothing to update.
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&status=eq.{}",
            appointment_id, current.status
        );
        let update_data = json!({
            "status": new_status.to_string(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result = self.store.update_returning(&path, update_data).await?;

        if result.is_empty() {
            warn!(
                "Appointment {} left status {} before the transition to {} committed",
                appointment_id, current.status, new_status
            );
            return Err(BookingError::StatusConflict);
        }

        let updated: Appointment = serde_json::from_value(result[0].clone())
            .map_err(|e| BookingError::DatabaseError(format!("Failed to parse updated appointment: {}", e)))?;

        info!("Appointment {} is now {}", appointment_id, updated.status);
        Ok(updated)
    }
}
