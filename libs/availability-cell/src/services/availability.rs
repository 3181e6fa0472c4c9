// libs/availability-cell/src/services/availability.rs
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use futures::future::join_all;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::StoreClient;

use crate::models::{AvailabilityError, DayAvailability, Practitioner, SchedulingConfig, Service, Slot};
use crate::services::ledger::BookingLedger;
use crate::services::slots::SlotGenerator;

/// Combines per-practitioner slot generation across a whole specialty and
/// exposes day- and slot-level views.
///
/// Stateless between calls: every computation starts from a fresh store read,
/// so two calls with no intervening bookings return identical results.
pub struct AvailabilityService {
    store: Arc<StoreClient>,
    ledger: BookingLedger,
    generator: SlotGenerator,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        let store = Arc::new(StoreClient::new(config));
        let scheduling = SchedulingConfig::from_app_config(config);

        Self {
            ledger: BookingLedger::new(Arc::clone(&store)),
            generator: SlotGenerator::new(&scheduling),
            store,
        }
    }

    /// Calendar days within the horizon that have at least one free slot,
    /// ascending.
    pub async fn compute_available_days(
        &self,
        specialty_id: Uuid,
        service_id: Uuid,
    ) -> Result<Vec<NaiveDate>, AvailabilityError> {
        self.compute_available_days_from(specialty_id, service_id, Utc::now())
            .await
    }

    /// Free slots on one calendar day, ascending by start time then by
    /// practitioner id.
    pub async fn compute_available_slots(
        &self,
        specialty_id: Uuid,
        service_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, AvailabilityError> {
        self.compute_available_slots_from(specialty_id, service_id, date, Utc::now())
            .await
    }

    /// Clock-explicit variant of `compute_available_days`; `now` fixes the
    /// horizon's day zero and the past-slot cutoff.
    pub async fn compute_available_days_from(
        &self,
        specialty_id: Uuid,
        service_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<NaiveDate>, AvailabilityError> {
        let grouped = self.compute_grouped_availability(specialty_id, service_id, now).await?;
        Ok(grouped.into_iter().map(|day| day.date).collect())
    }

    /// Clock-explicit variant of `compute_available_slots`.
    pub async fn compute_available_slots_from(
        &self,
        specialty_id: Uuid,
        service_id: Uuid,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<Slot>, AvailabilityError> {
        let grouped = self.compute_grouped_availability(specialty_id, service_id, now).await?;

        Ok(grouped
            .into_iter()
            .find(|day| day.date == date)
            .map(|day| day.slots)
            .unwrap_or_default())
    }

    /// Full horizon availability grouped by calendar day, ascending.
    pub async fn compute_grouped_availability(
        &self,
        specialty_id: Uuid,
        service_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<DayAvailability>, AvailabilityError> {
        debug!(
            "Computing availability for specialty {} and service {}",
            specialty_id, service_id
        );

        self.validate_selection(specialty_id, service_id).await?;

        let practitioners = self.list_practitioners(specialty_id).await?;
        if practitioners.is_empty() {
            debug!("No practitioners qualify for specialty {}", specialty_id);
            return Ok(Vec::new());
        }

        // One ledger window covers the whole horizon.
        let window_start = now.date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc();
        let window_end = window_start + Duration::days(self.generator.horizon_days());

        // Pure read-then-compute per practitioner; safe to run in parallel.
        let expansions = practitioners.iter().map(|practitioner| async move {
            let booked = self
                .ledger
                .overlapping(practitioner.id, window_start, window_end)
                .await?;

            Ok::<Vec<Slot>, AvailabilityError>(self.generator.expand_horizon(
                practitioner,
                service_id,
                &booked,
                now,
            ))
        });

        let mut all_slots = Vec::new();
        for result in join_all(expansions).await {
            all_slots.extend(result?);
        }

        // Deterministic order: start time, then practitioner id.
        all_slots.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then(a.practitioner_id.cmp(&b.practitioner_id))
        });

        let mut by_date: BTreeMap<NaiveDate, Vec<Slot>> = BTreeMap::new();
        for slot in all_slots {
            by_date.entry(slot.start_time.date_naive()).or_default().push(slot);
        }

        let days: Vec<DayAvailability> = by_date
            .into_iter()
            .map(|(date, slots)| DayAvailability { date, slots })
            .collect();

        debug!(
            "Found {} available days across {} practitioners",
            days.len(),
            practitioners.len()
        );

        Ok(days)
    }

    // ==============================================================================
    // PRIVATE HELPER METHODS
    // ==============================================================================

    /// A selection is valid when the service exists and belongs to the
    /// requested specialty. Rejected before any slot work is attempted.
    async fn validate_selection(
        &self,
        specialty_id: Uuid,
        service_id: Uuid,
    ) -> Result<(), AvailabilityError> {
        let path = format!("/rest/v1/services?id=eq.{}", service_id);
        let result: Vec<Value> = self.store.request(Method::GET, &path, None).await?;

        if result.is_empty() {
            return Err(AvailabilityError::InvalidSelection(format!(
                "Service {} not found",
                service_id
            )));
        }

        let service: Service = serde_json::from_value(result[0].clone())
            .map_err(|e| AvailabilityError::DatabaseError(format!("Failed to parse service: {}", e)))?;

        if service.specialty_id != specialty_id {
            warn!(
                "Service {} does not belong to specialty {}",
                service_id, specialty_id
            );
            return Err(AvailabilityError::InvalidSelection(format!(
                "Service {} does not belong to specialty {}",
                service_id, specialty_id
            )));
        }

        Ok(())
    }

    async fn list_practitioners(&self, specialty_id: Uuid) -> Result<Vec<Practitioner>, AvailabilityError> {
        let path = format!(
            "/rest/v1/practitioners?specialty_id=eq.{}&order=id.asc",
            specialty_id
        );
        let result: Vec<Value> = self.store.request(Method::GET, &path, None).await?;

        let practitioners: Vec<Practitioner> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Practitioner>, _>>()
            .map_err(|e| AvailabilityError::DatabaseError(format!("Failed to parse practitioners: {}", e)))?;

        Ok(practitioners)
    }
}
