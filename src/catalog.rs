//! Slot catalog: courts and time slots, independent of the booking date.
//!
//! DESIGN
//! ======
//! Courts and slots come from two endpoints that fail independently. The
//! loader fetches both concurrently and reports each half separately in a
//! [`CatalogLoad`]; the caller decides whether a failed half degrades to an
//! empty list or keeps a previously loaded one.
//!
//! Slots are sorted by start time parsed from their `HH:MM-HH:MM` label.
//! A slot whose label does not parse is dropped with a warning so the
//! evaluator only ever sees well-formed start times.

use time::Time;
use tracing::{info, warn};

use crate::api::{ApiError, BookingApi, SlotRecord};

pub use crate::api::CourtRecord as Court;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid slot label '{label}' (expected HH:MM-HH:MM)")]
pub struct SlotLabelError {
    pub label: String,
}

/// A bookable time-of-day range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub id: i64,
    /// Display label, also the key the backend uses for the slot.
    pub label: String,
    pub start: Time,
}

impl Slot {
    /// Parse a wire slot.
    ///
    /// # Errors
    ///
    /// Returns [`SlotLabelError`] when the label is not `HH:MM-HH:MM`.
    pub fn from_record(record: SlotRecord) -> Result<Self, SlotLabelError> {
        let start = parse_slot_start(&record.label)?;
        Ok(Self { id: record.id, label: record.label, start })
    }
}

/// Start time of an `HH:MM-HH:MM` label. The end half is validated but only
/// the start matters for availability.
///
/// # Errors
///
/// Returns [`SlotLabelError`] for anything other than two `H:MM` or `HH:MM`
/// times joined by `-`.
pub fn parse_slot_start(label: &str) -> Result<Time, SlotLabelError> {
    let invalid = || SlotLabelError { label: label.to_string() };
    let (start, end) = label.split_once('-').ok_or_else(invalid)?;
    let (start_h, start_m) = parse_hh_mm(start).ok_or_else(invalid)?;
    let (end_h, end_m) = parse_hh_mm(end).ok_or_else(invalid)?;
    if end_h > 24 || (end_h == 24 && end_m != 0) {
        return Err(invalid());
    }
    Time::from_hms(start_h, start_m, 0).map_err(|_| invalid())
}

fn parse_hh_mm(raw: &str) -> Option<(u8, u8)> {
    let (h, m) = raw.trim().split_once(':')?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return None;
    }
    let (h, m) = (h.parse::<u8>().ok()?, m.parse::<u8>().ok()?);
    (m < 60).then_some((h, m))
}

/// Parse and sort wire slots ascending by start time.
#[must_use]
pub fn sort_slots(records: Vec<SlotRecord>) -> Vec<Slot> {
    let mut slots: Vec<Slot> = records
        .into_iter()
        .filter_map(|record| match Slot::from_record(record) {
            Ok(slot) => Some(slot),
            Err(e) => {
                warn!(error = %e, "dropping slot with unparseable label");
                None
            }
        })
        .collect();
    slots.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.label.cmp(&b.label)));
    slots
}

// =============================================================================
// CATALOG
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub courts: Vec<Court>,
    /// Sorted ascending by start time.
    pub slots: Vec<Slot>,
}

impl Catalog {
    #[cfg(test)]
    pub(crate) fn new(courts: Vec<Court>, slots: Vec<SlotRecord>) -> Self {
        Self { courts, slots: sort_slots(slots) }
    }

    /// Courts shown on the booking screen (enabled only).
    pub fn bookable_courts(&self) -> impl Iterator<Item = &Court> {
        self.courts.iter().filter(|c| c.enabled)
    }

    /// Slots a court offers, in start-time order. Courts without an explicit
    /// slot list offer every slot.
    #[must_use]
    pub fn slots_for(&self, court: &Court) -> Vec<&Slot> {
        match &court.slot_ids {
            Some(ids) => self.slots.iter().filter(|s| ids.contains(&s.id)).collect(),
            None => self.slots.iter().collect(),
        }
    }

    #[must_use]
    pub fn court_named(&self, name: &str) -> Option<&Court> {
        self.courts.iter().find(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }

    #[must_use]
    pub fn slot_labelled(&self, label: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.label == label.trim())
    }
}

// =============================================================================
// LOADER
// =============================================================================

/// Outcome of one catalog fetch; each half succeeds or fails on its own.
#[derive(Debug, Clone)]
pub struct CatalogLoad {
    pub courts: Result<Vec<Court>, ApiError>,
    pub slots: Result<Vec<Slot>, ApiError>,
}

/// Fetch courts and slots concurrently.
pub async fn load_catalog(api: &dyn BookingApi) -> CatalogLoad {
    let (courts, slots) = tokio::join!(api.list_courts(), api.list_slots());

    if let Err(e) = &courts {
        warn!(error = %e, "court list fetch failed");
    }
    if let Err(e) = &slots {
        warn!(error = %e, "slot list fetch failed");
    }

    let load = CatalogLoad { courts, slots: slots.map(sort_slots) };
    if let (Ok(courts), Ok(slots)) = (&load.courts, &load.slots) {
        info!(courts = courts.len(), slots = slots.len(), "catalog loaded");
    }
    load
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
