//! Availability evaluator: classify each court/slot as past, full, or available.
//!
//! DESIGN
//! ======
//! [`classify`] is a pure function of the slot start, the selected date, the
//! wall clock, the occupancy count and the rules. It keeps no state and is
//! recomputed on every render. Precedence: `Past` wins over `Full`, so a slot
//! that is both renders as past.

use time::{Date, Duration, PrimitiveDateTime};

use crate::catalog::{Catalog, Court, Slot};
use crate::config::{ClientConfig, DEFAULT_PAST_BUFFER_MINS, DEFAULT_SLOT_CAPACITY, MAX_PAST_BUFFER_MINS};
use crate::occupancy::OccupancyIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Today, and the slot starts within the no-booking buffer (or already started).
    Past,
    /// Occupancy reached capacity.
    Full,
    Available,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    pub state: SlotState,
    pub count: u32,
    pub remaining: u32,
}

impl Availability {
    #[must_use]
    pub fn is_bookable(&self) -> bool {
        self.state == SlotState::Available
    }
}

/// Capacity and the no-booking buffer, sourced from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityRules {
    /// Reservations per slot before it is full.
    pub capacity: u32,
    /// Slots starting sooner than this (today) cannot be booked.
    pub past_buffer: Duration,
}

impl AvailabilityRules {
    /// The buffer is clamped to `0..=MAX_PAST_BUFFER_MINS`.
    #[must_use]
    pub fn new(capacity: u32, past_buffer_mins: i64) -> Self {
        Self { capacity, past_buffer: Duration::minutes(past_buffer_mins.clamp(0, MAX_PAST_BUFFER_MINS)) }
    }

    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.slot_capacity, config.past_buffer_mins)
    }
}

impl Default for AvailabilityRules {
    fn default() -> Self {
        Self::new(DEFAULT_SLOT_CAPACITY, DEFAULT_PAST_BUFFER_MINS)
    }
}

/// Classify one court/slot pair on `date` as seen at `now`.
#[must_use]
pub fn classify(
    court: &str,
    slot: &Slot,
    date: Date,
    occupancy: &OccupancyIndex,
    now: PrimitiveDateTime,
    rules: AvailabilityRules,
) -> Availability {
    let count = occupancy.count(court, &slot.label);
    let remaining = rules.capacity.saturating_sub(count);

    let past = date == now.date() && slot.start - now.time() < rules.past_buffer;
    let state = if past {
        SlotState::Past
    } else if count >= rules.capacity {
        SlotState::Full
    } else {
        SlotState::Available
    };

    Availability { state, count, remaining }
}

// =============================================================================
// GRID
// =============================================================================

#[derive(Debug, Clone)]
pub struct SlotCell<'a> {
    pub slot: &'a Slot,
    pub availability: Availability,
}

#[derive(Debug, Clone)]
pub struct CourtRow<'a> {
    pub court: &'a Court,
    pub cells: Vec<SlotCell<'a>>,
}

/// One row per bookable court, one cell per slot that court offers.
/// An empty catalog yields an empty grid.
#[must_use]
pub fn availability_grid<'a>(
    catalog: &'a Catalog,
    occupancy: &OccupancyIndex,
    date: Date,
    now: PrimitiveDateTime,
    rules: AvailabilityRules,
) -> Vec<CourtRow<'a>> {
    catalog
        .bookable_courts()
        .map(|court| CourtRow {
            court,
            cells: catalog
                .slots_for(court)
                .into_iter()
                .map(|slot| SlotCell { slot, availability: classify(&court.name, slot, date, occupancy, now, rules) })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
#[path = "availability_test.rs"]
mod tests;
