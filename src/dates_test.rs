use super::*;
use time::macros::date;

#[test]
fn format_date_pads_day_and_month() {
    assert_eq!(format_date(date!(2026 - 03 - 07)), "07-03-2026");
}

#[test]
fn parse_date_accepts_wire_format() {
    assert_eq!(parse_date("18-10-2026").unwrap(), date!(2026 - 10 - 18));
}

#[test]
fn parse_date_trims_whitespace() {
    assert_eq!(parse_date(" 01-01-2027 \n").unwrap(), date!(2027 - 01 - 01));
}

#[test]
fn parse_date_rejects_iso_format() {
    let err = parse_date("2026-10-18").unwrap_err();
    assert_eq!(err.input, "2026-10-18");
    assert!(err.to_string().contains("DD-MM-YYYY"));
}

#[test]
fn parse_date_rejects_impossible_day() {
    assert!(parse_date("31-02-2026").is_err());
}

#[test]
fn booking_window_is_seven_consecutive_days_from_today() {
    let window = booking_window(date!(2026 - 12 - 28));
    assert_eq!(window.len(), 7);
    assert_eq!(window[0], date!(2026 - 12 - 28));
    assert_eq!(window[3], date!(2026 - 12 - 31));
    assert_eq!(window[6], date!(2027 - 01 - 03));
}
