//! Booking REST API boundary.
//!
//! DESIGN
//! ======
//! [`BookingApi`] is the only seam between the view model and the network.
//! Every backend response is turned into `Result<T, ApiError>` here, so the
//! loaders and the booking view match on a closed set of error kinds instead
//! of re-inspecting JSON bodies.
//!
//! ERROR HANDLING
//! ==============
//! - no response at all -> [`ApiError::Transport`]
//! - HTTP 401 -> [`ApiError::Unauthorized`], handed to the session-expiry path
//! - any other non-2xx -> [`ApiError::Rejected`] carrying the server's `detail`
//!   text untouched, because it is shown to the user as-is
//! - a 2xx body of the wrong shape -> [`ApiError::Decode`]
//!
//! Nothing is retried at this layer.

pub mod http;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

use time::Date;

pub use http::HttpApi;
pub use types::{CourtRecord, DetailQuery, OccupancyRecord, Player, ReservationDetail, ReservationRequest, SlotRecord};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect failure, timeout, ...).
    #[error("connection error: {0}")]
    Transport(String),

    /// The backend rejected the credentials; the session is over.
    #[error("session expired")]
    Unauthorized,

    /// The backend answered with an error status.
    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    /// A success response whose body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Async access to the booking backend. Enables mocking in tests.
#[async_trait::async_trait]
pub trait BookingApi: Send + Sync {
    /// `GET courts/list`
    async fn list_courts(&self) -> Result<Vec<CourtRecord>, ApiError>;

    /// `GET schedules/list`
    async fn list_slots(&self) -> Result<Vec<SlotRecord>, ApiError>;

    /// `GET reservations/count?fecha=DD-MM-YYYY`
    async fn reservation_counts(&self, date: Date) -> Result<Vec<OccupancyRecord>, ApiError>;

    /// `GET reservations/detail`
    async fn reservation_detail(&self, query: &DetailQuery) -> Result<ReservationDetail, ApiError>;

    /// `POST reservations/create`, returning the server's confirmation text.
    async fn create_reservation(&self, request: &ReservationRequest) -> Result<String, ApiError>;

    /// `DELETE reservations/cancel/{id}`, returning the server's confirmation text.
    async fn cancel_reservation(&self, reservation_id: i64) -> Result<String, ApiError>;
}
