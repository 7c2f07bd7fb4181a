//! Calendar helpers for the booking window and the `DD-MM-YYYY` wire format.

use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime};

/// Number of consecutive days, starting today, that can be booked.
pub const BOOKING_WINDOW_DAYS: u8 = 7;

#[derive(Debug, thiserror::Error)]
#[error("invalid date '{input}' (expected DD-MM-YYYY)")]
pub struct DateError {
    pub input: String,
}

/// Format a date the way the REST API expects it (`DD-MM-YYYY`).
#[must_use]
pub fn format_date(date: Date) -> String {
    // Formatting a plain date with day/month/year components cannot fail.
    date.format(format_description!("[day]-[month]-[year]")).unwrap_or_default()
}

/// Parse a `DD-MM-YYYY` date.
///
/// # Errors
///
/// Returns [`DateError`] when the input is not a valid calendar date in wire format.
pub fn parse_date(input: &str) -> Result<Date, DateError> {
    Date::parse(input.trim(), format_description!("[day]-[month]-[year]")).map_err(|_| DateError { input: input.to_string() })
}

/// The bookable dates: today plus the following six days.
#[must_use]
pub fn booking_window(today: Date) -> Vec<Date> {
    (0..i64::from(BOOKING_WINDOW_DAYS))
        .filter_map(|offset| today.checked_add(Duration::days(offset)))
        .collect()
}

/// Current local wall-clock time, falling back to UTC when the local offset
/// cannot be determined.
#[must_use]
pub fn local_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    PrimitiveDateTime::new(now.date(), now.time())
}

#[cfg(test)]
#[path = "dates_test.rs"]
mod tests;
