//! Occupancy index: active reservation counts for one date.
//!
//! The backend is queried per date, so the index carries no date dimension.
//! Keys are `"<court>-<slot>"`, e.g. `"Cancha 1-10:00-11:00"`.

use std::collections::HashMap;

use time::Date;
use tracing::{debug, warn};

use crate::api::{ApiError, BookingApi, OccupancyRecord};

/// Lookup key for a court and slot.
#[must_use]
pub fn occupancy_key(court: &str, slot: &str) -> String {
    format!("{court}-{slot}")
}

/// Read-only snapshot of reservation counts for a single date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyIndex {
    counts: HashMap<String, u32>,
}

impl OccupancyIndex {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the index from backend entries. A duplicated key keeps the last
    /// entry seen.
    #[must_use]
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = OccupancyRecord>,
    {
        let mut counts = HashMap::new();
        for record in records {
            let key = occupancy_key(&record.court, &record.slot);
            if let Some(previous) = counts.insert(key, record.count) {
                debug!(court = %record.court, slot = %record.slot, previous, "duplicate occupancy entry");
            }
        }
        Self { counts }
    }

    /// Reservations held for `court` and `slot`; zero when absent.
    #[must_use]
    pub fn count(&self, court: &str, slot: &str) -> u32 {
        self.counts.get(&occupancy_key(court, slot)).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Fetch reservation counts for exactly one date.
///
/// # Errors
///
/// Returns the [`ApiError`] from the backend call. Callers that want the
/// fail-open behaviour use [`OccupancyIndex::empty`] on error.
pub async fn load_occupancy(api: &dyn BookingApi, date: Date) -> Result<OccupancyIndex, ApiError> {
    match api.reservation_counts(date).await {
        Ok(records) => {
            let index = OccupancyIndex::from_records(records);
            debug!(%date, entries = index.len(), "occupancy loaded");
            Ok(index)
        }
        Err(e) => {
            warn!(%date, error = %e, "occupancy fetch failed");
            Err(e)
        }
    }
}

#[cfg(test)]
#[path = "occupancy_test.rs"]
mod tests;
