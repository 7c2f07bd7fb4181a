//! In-memory [`BookingApi`] for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use time::Date;

use super::types::{CourtRecord, DetailQuery, OccupancyRecord, ReservationDetail, ReservationRequest, SlotRecord};
use super::{ApiError, BookingApi};

pub(crate) struct MockApi {
    pub courts: Mutex<Result<Vec<CourtRecord>, ApiError>>,
    pub slots: Mutex<Result<Vec<SlotRecord>, ApiError>>,
    pub counts: Mutex<HashMap<Date, Result<Vec<OccupancyRecord>, ApiError>>>,
    pub detail: Mutex<Result<ReservationDetail, ApiError>>,
    pub create_result: Mutex<Result<String, ApiError>>,
    pub cancel_result: Mutex<Result<String, ApiError>>,
    pub created: Mutex<Vec<ReservationRequest>>,
    pub cancelled: Mutex<Vec<i64>>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self {
            courts: Mutex::new(Ok(Vec::new())),
            slots: Mutex::new(Ok(Vec::new())),
            counts: Mutex::new(HashMap::new()),
            detail: Mutex::new(Err(ApiError::Rejected { status: 404, detail: "Not Found".into() })),
            create_result: Mutex::new(Ok("Reserva creada".into())),
            cancel_result: Mutex::new(Ok("Reserva cancelada".into())),
            created: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
        }
    }
}

impl MockApi {
    pub fn with_catalog(courts: Vec<CourtRecord>, slots: Vec<SlotRecord>) -> Self {
        let api = Self::default();
        *api.courts.lock().unwrap() = Ok(courts);
        *api.slots.lock().unwrap() = Ok(slots);
        api
    }

    pub fn set_counts(&self, date: Date, result: Result<Vec<OccupancyRecord>, ApiError>) {
        self.counts.lock().unwrap().insert(date, result);
    }
}

pub(crate) fn court(id: i64, name: &str) -> CourtRecord {
    CourtRecord { id, name: name.into(), enabled: true, description: None, image: None, slot_ids: None }
}

pub(crate) fn slot(id: i64, label: &str) -> SlotRecord {
    SlotRecord { id, label: label.into() }
}

pub(crate) fn occupied(court: &str, slot: &str, count: u32) -> OccupancyRecord {
    OccupancyRecord { court: court.into(), slot: slot.into(), count }
}

#[async_trait::async_trait]
impl BookingApi for MockApi {
    async fn list_courts(&self) -> Result<Vec<CourtRecord>, ApiError> {
        self.courts.lock().unwrap().clone()
    }

    async fn list_slots(&self) -> Result<Vec<SlotRecord>, ApiError> {
        self.slots.lock().unwrap().clone()
    }

    async fn reservation_counts(&self, date: Date) -> Result<Vec<OccupancyRecord>, ApiError> {
        self.counts.lock().unwrap().get(&date).cloned().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn reservation_detail(&self, _query: &DetailQuery) -> Result<ReservationDetail, ApiError> {
        self.detail.lock().unwrap().clone()
    }

    async fn create_reservation(&self, request: &ReservationRequest) -> Result<String, ApiError> {
        self.created.lock().unwrap().push(request.clone());
        self.create_result.lock().unwrap().clone()
    }

    async fn cancel_reservation(&self, reservation_id: i64) -> Result<String, ApiError> {
        self.cancelled.lock().unwrap().push(reservation_id);
        self.cancel_result.lock().unwrap().clone()
    }
}
