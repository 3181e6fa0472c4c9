// libs/availability-cell/src/services/ledger.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_database::StoreClient;

use crate::models::{AvailabilityError, BookedRange};

/// Read-only view over already-committed reservations.
///
/// Cancelled appointments free their slot immediately and are excluded from
/// every read. All interval comparisons are half-open: a booking ending at
/// 10:00 does not block a window starting at 10:00.
pub struct BookingLedger {
    store: Arc<StoreClient>,
}

impl BookingLedger {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    /// All non-cancelled `[start, end)` ranges of the practitioner that
    /// intersect the half-open window, from a single consistent store read.
    pub async fn overlapping(
        &self,
        practitioner_id: Uuid,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<BookedRange>, AvailabilityError> {
        debug!(
            "Fetching booked ranges for practitioner {} between {} and {}",
            practitioner_id, window_start, window_end
        );

        let path = format!(
            "/rest/v1/appointments?practitioner_id=eq.{}&status=in.(pending,confirmed)&start_time=lt.{}&end_time=gt.{}&select=start_time,end_time&order=start_time.asc",
            practitioner_id,
            urlencoding::encode(&window_end.to_rfc3339()),
            urlencoding::encode(&window_start.to_rfc3339()),
        );

        let result: Vec<Value> = self.store.request(Method::GET, &path, None).await?;

        let ranges: Vec<BookedRange> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<BookedRange>, _>>()
            .map_err(|e| AvailabilityError::DatabaseError(format!("Failed to parse booked ranges: {}", e)))?;

        Ok(ranges)
    }
}
