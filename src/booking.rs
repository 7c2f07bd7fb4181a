//! Booking view model: catalog, per-date occupancy, slot selection and the
//! reservation round trip for one booking screen.
//!
//! DESIGN
//! ======
//! `BookingView` is single-owner state. Network calls happen outside it; the
//! view hands out tagged requests and later applies their results:
//!
//! - Occupancy requests carry the date they were issued for and a sequence
//!   number. A result is applied only if it answers the latest request for
//!   the currently selected date; anything else is reported as `Stale`.
//! - Catalog halves remember whether they were ever loaded. A failed refresh
//!   keeps the last good list instead of blanking the screen.
//! - A confirmed reservation marks its court/slot in flight until the result
//!   is applied, so a second click cannot submit a duplicate.
//!
//! ERROR HANDLING
//! ==============
//! Failures become transient [`Notice`]s drained by the caller. A 401 from
//! any call is reported as [`Outcome::SessionExpired`] and changes nothing;
//! the caller hands it to the session context.

use std::collections::HashSet;

use time::{Date, PrimitiveDateTime};
use tracing::{debug, info, warn};

use crate::api::{ApiError, BookingApi, ReservationRequest};
use crate::availability::{Availability, AvailabilityRules, CourtRow, SlotState, availability_grid, classify};
use crate::catalog::{Catalog, CatalogLoad, Court, Slot, load_catalog};
use crate::dates::format_date;
use crate::occupancy::{OccupancyIndex, load_occupancy, occupancy_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A transient, non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// What applying a result did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// The result answered an outdated request and was discarded.
    Stale,
    /// The backend rejected the session; nothing was applied.
    SessionExpired,
}

/// Ticket for one occupancy fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyRequest {
    pub date: Date,
    seq: u64,
}

/// A slot chosen for booking, awaiting confirmation or submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReservation {
    pub court: String,
    pub slot: String,
    pub date: Date,
}

impl PendingReservation {
    #[must_use]
    pub fn request(&self) -> ReservationRequest {
        ReservationRequest { court: self.court.clone(), slot: self.slot.clone(), date: self.date }
    }

    fn key(&self) -> String {
        occupancy_key(&self.court, &self.slot)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    #[error("unknown court '{0}'")]
    UnknownCourt(String),
    #[error("unknown time slot '{0}'")]
    UnknownSlot(String),
    #[error("{court} does not offer {slot}")]
    NotOffered { court: String, slot: String },
    #[error("{0} can no longer be booked")]
    Past(String),
    #[error("{0} is full")]
    Full(String),
    #[error("reservations for {0} are still loading")]
    Loading(String),
    #[error("a reservation for this slot is already being sent")]
    InFlight,
    #[error("no slot selected")]
    NothingSelected,
}

// =============================================================================
// VIEW
// =============================================================================

pub struct BookingView {
    rules: AvailabilityRules,
    courts: Option<Vec<Court>>,
    slots: Option<Vec<Slot>>,
    catalog: Catalog,
    selected_date: Date,
    occupancy: OccupancyIndex,
    occupancy_loaded: bool,
    issued_seq: u64,
    in_flight: HashSet<String>,
    selection: Option<PendingReservation>,
    notices: Vec<Notice>,
}

impl BookingView {
    #[must_use]
    pub fn new(rules: AvailabilityRules, date: Date) -> Self {
        Self {
            rules,
            courts: None,
            slots: None,
            catalog: Catalog::default(),
            selected_date: date,
            occupancy: OccupancyIndex::empty(),
            occupancy_loaded: false,
            issued_seq: 0,
            in_flight: HashSet::new(),
            selection: None,
            notices: Vec::new(),
        }
    }

    #[must_use]
    pub fn rules(&self) -> AvailabilityRules {
        self.rules
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Both catalog halves have loaded successfully at least once.
    #[must_use]
    pub fn catalog_loaded(&self) -> bool {
        self.courts.is_some() && self.slots.is_some()
    }

    #[must_use]
    pub fn selected_date(&self) -> Date {
        self.selected_date
    }

    #[must_use]
    pub fn occupancy(&self) -> &OccupancyIndex {
        &self.occupancy
    }

    /// Occupancy for the selected date has been applied (possibly fail-open empty).
    #[must_use]
    pub fn occupancy_loaded(&self) -> bool {
        self.occupancy_loaded
    }

    #[must_use]
    pub fn selection(&self) -> Option<&PendingReservation> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn is_in_flight(&self, court: &str, slot: &str) -> bool {
        self.in_flight.contains(&occupancy_key(court, slot))
    }

    /// Take all queued notices.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice { level, message: message.into() });
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    pub fn apply_catalog(&mut self, load: CatalogLoad) -> Outcome {
        if matches!(load.courts, Err(ApiError::Unauthorized)) || matches!(load.slots, Err(ApiError::Unauthorized)) {
            return Outcome::SessionExpired;
        }

        match load.courts {
            Ok(courts) => self.courts = Some(courts),
            Err(e) => self.notify(NoticeLevel::Error, format!("Could not load courts: {e}")),
        }
        match load.slots {
            Ok(slots) => self.slots = Some(slots),
            Err(e) => self.notify(NoticeLevel::Error, format!("Could not load time slots: {e}")),
        }

        self.catalog = Catalog {
            courts: self.courts.clone().unwrap_or_default(),
            slots: self.slots.clone().unwrap_or_default(),
        };
        Outcome::Applied
    }

    // -------------------------------------------------------------------------
    // Occupancy
    // -------------------------------------------------------------------------

    /// Switch the selected date and issue the occupancy request for it.
    /// Counts for the previous date are dropped and any selection is cleared.
    pub fn select_date(&mut self, date: Date) -> OccupancyRequest {
        if date != self.selected_date {
            self.selected_date = date;
            self.occupancy = OccupancyIndex::empty();
            self.occupancy_loaded = false;
            self.selection = None;
        }
        self.next_occupancy_request()
    }

    /// Re-issue the occupancy request for the selected date.
    pub fn refresh_occupancy(&mut self) -> OccupancyRequest {
        self.next_occupancy_request()
    }

    fn next_occupancy_request(&mut self) -> OccupancyRequest {
        self.issued_seq += 1;
        OccupancyRequest { date: self.selected_date, seq: self.issued_seq }
    }

    pub fn apply_occupancy(
        &mut self,
        request: OccupancyRequest,
        result: Result<OccupancyIndex, ApiError>,
    ) -> Outcome {
        if request.date != self.selected_date || request.seq != self.issued_seq {
            debug!(date = %request.date, selected = %self.selected_date, "discarding stale occupancy response");
            return Outcome::Stale;
        }

        match result {
            Ok(index) => self.occupancy = index,
            Err(ApiError::Unauthorized) => return Outcome::SessionExpired,
            Err(e) => {
                self.occupancy = OccupancyIndex::empty();
                self.notify(
                    NoticeLevel::Warning,
                    format!(
                        "Could not load reservations for {} ({e}); availability may be inaccurate",
                        format_date(request.date)
                    ),
                );
            }
        }
        self.occupancy_loaded = true;
        Outcome::Applied
    }

    // -------------------------------------------------------------------------
    // Availability
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn grid(&self, now: PrimitiveDateTime) -> Vec<CourtRow<'_>> {
        availability_grid(&self.catalog, &self.occupancy, self.selected_date, now, self.rules)
    }

    /// Classify one court/slot on the selected date.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError`] if the court or slot is unknown or not offered.
    pub fn availability(&self, court: &str, slot: &str, now: PrimitiveDateTime) -> Result<Availability, SelectError> {
        let (court, slot) = self.resolve(court, slot)?;
        Ok(classify(&court.name, slot, self.selected_date, &self.occupancy, now, self.rules))
    }

    fn resolve(&self, court: &str, slot: &str) -> Result<(&Court, &Slot), SelectError> {
        let court_ref = self
            .catalog
            .court_named(court)
            .filter(|c| c.enabled)
            .ok_or_else(|| SelectError::UnknownCourt(court.to_string()))?;
        let slot_ref = self
            .catalog
            .slot_labelled(slot)
            .ok_or_else(|| SelectError::UnknownSlot(slot.to_string()))?;
        if !self.catalog.slots_for(court_ref).iter().any(|s| s.id == slot_ref.id) {
            return Err(SelectError::NotOffered { court: court_ref.name.clone(), slot: slot_ref.label.clone() });
        }
        Ok((court_ref, slot_ref))
    }

    // -------------------------------------------------------------------------
    // Reservation
    // -------------------------------------------------------------------------

    /// Select an available slot, opening the confirmation step.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError`] unless the slot is known and offered, the
    /// selected date's counts have arrived, the slot is available, and it is
    /// not already being submitted.
    pub fn select_slot(
        &mut self,
        court: &str,
        slot: &str,
        now: PrimitiveDateTime,
    ) -> Result<PendingReservation, SelectError> {
        let (court_ref, slot_ref) = self.resolve(court, slot)?;
        if !self.occupancy_loaded {
            return Err(SelectError::Loading(format_date(self.selected_date)));
        }
        let pending = PendingReservation {
            court: court_ref.name.clone(),
            slot: slot_ref.label.clone(),
            date: self.selected_date,
        };
        if self.in_flight.contains(&pending.key()) {
            return Err(SelectError::InFlight);
        }
        let availability = classify(&court_ref.name, slot_ref, self.selected_date, &self.occupancy, now, self.rules);
        match availability.state {
            SlotState::Past => Err(SelectError::Past(pending.slot)),
            SlotState::Full => Err(SelectError::Full(pending.slot)),
            SlotState::Available => {
                self.selection = Some(pending.clone());
                Ok(pending)
            }
        }
    }

    pub fn cancel_selection(&mut self) {
        self.selection = None;
    }

    /// Confirm the current selection and mark it in flight. The caller sends
    /// [`PendingReservation::request`] and reports back via `finish_reservation`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::NothingSelected`] without a selection, or
    /// [`SelectError::InFlight`] if the same slot is already being sent.
    pub fn confirm(&mut self) -> Result<PendingReservation, SelectError> {
        let pending = self.selection.take().ok_or(SelectError::NothingSelected)?;
        if !self.in_flight.insert(pending.key()) {
            return Err(SelectError::InFlight);
        }
        info!(court = %pending.court, slot = %pending.slot, date = %pending.date, "submitting reservation");
        Ok(pending)
    }

    pub fn finish_reservation(&mut self, pending: &PendingReservation, result: Result<String, ApiError>) -> Outcome {
        self.in_flight.remove(&pending.key());
        match result {
            Ok(message) => {
                self.notify(NoticeLevel::Info, message);
                Outcome::Applied
            }
            Err(ApiError::Unauthorized) => Outcome::SessionExpired,
            Err(e) => {
                warn!(court = %pending.court, slot = %pending.slot, error = %e, "reservation rejected");
                self.notify(NoticeLevel::Error, e.to_string());
                Outcome::Applied
            }
        }
    }

    // -------------------------------------------------------------------------
    // Round trips
    // -------------------------------------------------------------------------

    /// Reload the catalog and the occupancy of the selected date.
    pub async fn refresh(&mut self, api: &dyn BookingApi) -> Outcome {
        let load = load_catalog(api).await;
        if self.apply_catalog(load) == Outcome::SessionExpired {
            return Outcome::SessionExpired;
        }
        let request = self.refresh_occupancy();
        let result = load_occupancy(api, request.date).await;
        self.apply_occupancy(request, result)
    }

    /// Submit the confirmed selection, then refresh occupancy on success.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError`] if there is nothing to submit.
    pub async fn submit(&mut self, api: &dyn BookingApi) -> Result<Outcome, SelectError> {
        let pending = self.confirm()?;
        let result = api.create_reservation(&pending.request()).await;
        let succeeded = result.is_ok();
        let outcome = self.finish_reservation(&pending, result);
        if succeeded && pending.date == self.selected_date {
            let request = self.refresh_occupancy();
            let refreshed = load_occupancy(api, request.date).await;
            return Ok(self.apply_occupancy(request, refreshed));
        }
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "booking_test.rs"]
mod tests;
