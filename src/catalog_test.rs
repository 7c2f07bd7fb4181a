use super::*;
use crate::api::mock::{MockApi, court, slot};
use time::macros::time;

// =============================================================================
// parse_slot_start
// =============================================================================

#[test]
fn parses_start_of_label() {
    assert_eq!(parse_slot_start("10:00-11:30").unwrap(), time!(10:00));
}

#[test]
fn accepts_single_digit_hour_and_spaces() {
    assert_eq!(parse_slot_start("9:30 - 10:30").unwrap(), time!(09:30));
}

#[test]
fn accepts_midnight_end() {
    assert_eq!(parse_slot_start("23:00-24:00").unwrap(), time!(23:00));
}

#[test]
fn rejects_malformed_labels() {
    for label in ["", "10:00", "10-11", "25:00-26:00", "10:60-11:00", "10:00-24:30", "ab:cd-ef:gh"] {
        let err = parse_slot_start(label).unwrap_err();
        assert_eq!(err.label, label);
    }
}

// =============================================================================
// sort_slots
// =============================================================================

#[test]
fn slots_are_sorted_by_start_time_not_text() {
    let sorted = sort_slots(vec![slot(1, "18:00-19:00"), slot(2, "9:00-10:00"), slot(3, "10:30-11:30")]);
    let labels: Vec<&str> = sorted.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, ["9:00-10:00", "10:30-11:30", "18:00-19:00"]);
}

#[test]
fn unparseable_slots_are_dropped() {
    let sorted = sort_slots(vec![slot(1, "mañana"), slot(2, "08:00-09:00")]);
    assert_eq!(sorted.len(), 1);
    assert_eq!(sorted[0].id, 2);
}

// =============================================================================
// Catalog
// =============================================================================

#[test]
fn court_with_slot_list_only_offers_those_slots() {
    let mut c = court(1, "Cancha 1");
    c.slot_ids = Some(vec![3, 1]);
    let catalog = Catalog::new(
        vec![c.clone()],
        vec![slot(1, "08:00-09:00"), slot(2, "09:00-10:00"), slot(3, "10:00-11:00")],
    );

    let ids: Vec<i64> = catalog.slots_for(&c).iter().map(|s| s.id).collect();
    assert_eq!(ids, [1, 3]);
}

#[test]
fn court_without_slot_list_offers_every_slot() {
    let c = court(1, "Cancha 1");
    let catalog = Catalog::new(vec![c.clone()], vec![slot(1, "08:00-09:00"), slot(2, "09:00-10:00")]);
    assert_eq!(catalog.slots_for(&c).len(), 2);
}

#[test]
fn disabled_courts_are_not_bookable() {
    let mut closed = court(2, "Cancha 2");
    closed.enabled = false;
    let catalog = Catalog::new(vec![court(1, "Cancha 1"), closed], vec![]);

    let names: Vec<&str> = catalog.bookable_courts().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Cancha 1"]);
}

#[test]
fn lookups_by_name_and_label() {
    let catalog = Catalog::new(vec![court(1, "Cancha 1")], vec![slot(1, "08:00-09:00")]);
    assert_eq!(catalog.court_named("cancha 1").map(|c| c.id), Some(1));
    assert_eq!(catalog.slot_labelled(" 08:00-09:00").map(|s| s.id), Some(1));
    assert!(catalog.court_named("Cancha 9").is_none());
}

// =============================================================================
// load_catalog
// =============================================================================

#[tokio::test]
async fn load_catalog_success() {
    let api = MockApi::with_catalog(
        vec![court(1, "Cancha 1"), court(2, "Cancha 2")],
        vec![slot(2, "19:00-20:00"), slot(1, "08:00-09:00")],
    );

    let load = load_catalog(&api).await;

    assert_eq!(load.courts.unwrap().len(), 2);
    let ids: Vec<i64> = load.slots.unwrap().iter().map(|s| s.id).collect();
    assert_eq!(ids, [1, 2]);
}

#[tokio::test]
async fn slot_failure_leaves_courts_intact() {
    let api = MockApi::with_catalog(vec![court(1, "A"), court(2, "B"), court(3, "C")], vec![]);
    *api.slots.lock().unwrap() = Err(ApiError::Transport("connection refused".into()));

    let load = load_catalog(&api).await;

    assert_eq!(load.courts.unwrap().len(), 3);
    assert_eq!(load.slots.unwrap_err(), ApiError::Transport("connection refused".into()));
}

#[tokio::test]
async fn both_halves_can_fail_independently() {
    let api = MockApi::default();
    *api.courts.lock().unwrap() = Err(ApiError::Rejected { status: 500, detail: "boom".into() });
    *api.slots.lock().unwrap() = Err(ApiError::Transport("timeout".into()));

    let load = load_catalog(&api).await;

    assert_eq!(load.courts.unwrap_err(), ApiError::Rejected { status: 500, detail: "boom".into() });
    assert_eq!(load.slots.unwrap_err(), ApiError::Transport("timeout".into()));
}
