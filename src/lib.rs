//! Boulevard81 booking client.
//!
//! DESIGN
//! ======
//! A client-side view model for a padel-court booking REST API:
//!
//! - `catalog`: courts and time slots, sorted and independent of the date
//! - `occupancy`: reservation counts for one date, keyed `"<court>-<slot>"`
//! - `availability`: pure past/full/available classification
//! - `booking`: single-screen state with stale-response discard and
//!   double-submit protection
//! - `session`: stored credentials and the inactivity watchdog
//!
//! `api` is the only module that talks to the network.

pub mod api;
pub mod availability;
pub mod booking;
pub mod catalog;
pub mod config;
pub mod dates;
pub mod occupancy;
pub mod session;

pub use api::{ApiError, BookingApi, HttpApi};
pub use availability::{Availability, AvailabilityRules, SlotState, classify};
pub use booking::{BookingView, Notice, NoticeLevel, Outcome};
pub use catalog::{Catalog, load_catalog};
pub use config::ClientConfig;
pub use occupancy::{OccupancyIndex, load_occupancy};
pub use session::{Credentials, SessionContext};
