use super::*;
use crate::api::mock::{court, occupied, slot};
use crate::catalog::sort_slots;
use time::macros::{date, datetime};

const TODAY: Date = date!(2026 - 10 - 18);
const TOMORROW: Date = date!(2026 - 10 - 19);

fn slot_at(label: &str) -> Slot {
    sort_slots(vec![slot(1, label)]).remove(0)
}

fn index(count: u32) -> OccupancyIndex {
    OccupancyIndex::from_records(vec![occupied("Cancha 1", "10:00-11:00", count)])
}

fn rules(capacity: u32) -> AvailabilityRules {
    AvailabilityRules::new(capacity, 60)
}

// =============================================================================
// classify: worked examples
// =============================================================================

#[test]
fn full_when_count_reaches_capacity() {
    let a = classify("Cancha 1", &slot_at("10:00-11:00"), TODAY, &index(6), datetime!(2026-10-18 08:00), rules(6));
    assert_eq!(a, Availability { state: SlotState::Full, count: 6, remaining: 0 });
}

#[test]
fn available_with_remaining_capacity() {
    let a = classify("Cancha 1", &slot_at("10:00-11:00"), TODAY, &index(3), datetime!(2026-10-18 08:00), rules(6));
    assert_eq!(a, Availability { state: SlotState::Available, count: 3, remaining: 3 });
    assert!(a.is_bookable());
}

#[test]
fn past_when_start_is_within_buffer_today() {
    let a = classify(
        "Cancha 1",
        &slot_at("09:00-10:00"),
        TODAY,
        &OccupancyIndex::empty(),
        datetime!(2026-10-18 08:35),
        rules(6),
    );
    assert_eq!(a.state, SlotState::Past);
}

#[test]
fn same_slot_tomorrow_is_not_past() {
    let a = classify(
        "Cancha 1",
        &slot_at("09:00-10:00"),
        TOMORROW,
        &OccupancyIndex::empty(),
        datetime!(2026-10-18 08:35),
        rules(6),
    );
    assert_eq!(a.state, SlotState::Available);
}

// =============================================================================
// classify: boundaries and precedence
// =============================================================================

#[test]
fn exactly_one_hour_before_start_is_bookable() {
    let a = classify("Cancha 1", &slot_at("10:00-11:00"), TODAY, &index(0), datetime!(2026-10-18 09:00), rules(4));
    assert_eq!(a.state, SlotState::Available);

    let a = classify("Cancha 1", &slot_at("10:00-11:00"), TODAY, &index(0), datetime!(2026-10-18 09:00:01), rules(4));
    assert_eq!(a.state, SlotState::Past);
}

#[test]
fn slot_already_started_today_is_past() {
    let a = classify("Cancha 1", &slot_at("10:00-11:00"), TODAY, &index(0), datetime!(2026-10-18 21:00), rules(4));
    assert_eq!(a.state, SlotState::Past);
}

#[test]
fn past_takes_precedence_over_full() {
    let a = classify("Cancha 1", &slot_at("10:00-11:00"), TODAY, &index(6), datetime!(2026-10-18 09:30), rules(6));
    assert_eq!(a.state, SlotState::Past);
    assert_eq!(a.remaining, 0);
}

#[test]
fn over_capacity_is_full_with_zero_remaining() {
    let a = classify("Cancha 1", &slot_at("10:00-11:00"), TOMORROW, &index(9), datetime!(2026-10-18 09:30), rules(4));
    assert_eq!(a, Availability { state: SlotState::Full, count: 9, remaining: 0 });
}

#[test]
fn never_past_on_other_dates_at_any_hour() {
    for hour in 0..24u8 {
        let now = PrimitiveDateTime::new(TODAY, time::Time::from_hms(hour, 59, 0).unwrap());
        for d in [TOMORROW, date!(2026 - 10 - 24), date!(2026 - 10 - 17)] {
            let a = classify("Cancha 1", &slot_at("00:00-01:00"), d, &OccupancyIndex::empty(), now, rules(4));
            assert_ne!(a.state, SlotState::Past, "hour {hour} date {d}");
        }
    }
}

#[test]
fn not_past_state_follows_count() {
    let now = datetime!(2026-10-18 06:00);
    for count in 0..10 {
        let a = classify("Cancha 1", &slot_at("10:00-11:00"), TODAY, &index(count), now, rules(4));
        if count >= 4 {
            assert_eq!((a.state, a.remaining), (SlotState::Full, 0));
        } else {
            assert_eq!((a.state, a.remaining), (SlotState::Available, 4 - count));
        }
    }
}

#[test]
fn classify_is_deterministic() {
    let s = slot_at("10:00-11:00");
    let idx = index(2);
    let now = datetime!(2026-10-18 07:15);
    let first = classify("Cancha 1", &s, TODAY, &idx, now, rules(4));
    let second = classify("Cancha 1", &s, TODAY, &idx, now, rules(4));
    assert_eq!(first, second);
}

#[test]
fn default_rules_use_configured_defaults() {
    let r = AvailabilityRules::default();
    assert_eq!(r.capacity, 4);
    assert_eq!(r.past_buffer, Duration::hours(1));
}

#[test]
fn rules_clamp_out_of_range_buffer() {
    assert_eq!(AvailabilityRules::new(4, i64::MAX).past_buffer, Duration::minutes(MAX_PAST_BUFFER_MINS));
    assert_eq!(AvailabilityRules::new(4, -30).past_buffer, Duration::ZERO);
}

// =============================================================================
// availability_grid
// =============================================================================

#[test]
fn grid_with_empty_slot_list_renders_courts_without_cells() {
    let catalog = Catalog::new(vec![court(1, "A"), court(2, "B"), court(3, "C")], vec![]);
    let grid = availability_grid(&catalog, &OccupancyIndex::empty(), TODAY, datetime!(2026-10-18 08:00), rules(4));

    assert_eq!(grid.len(), 3);
    assert!(grid.iter().all(|row| row.cells.is_empty()));
}

#[test]
fn grid_of_empty_catalog_is_empty() {
    let empty = Catalog::default();
    let grid = availability_grid(
        &empty,
        &OccupancyIndex::empty(),
        TODAY,
        datetime!(2026-10-18 08:00),
        rules(4),
    );
    assert!(grid.is_empty());
}

#[test]
fn grid_classifies_per_court() {
    let mut closed = court(3, "Cancha 3");
    closed.enabled = false;
    let catalog = Catalog::new(
        vec![court(1, "Cancha 1"), court(2, "Cancha 2"), closed],
        vec![slot(1, "10:00-11:00"), slot(2, "08:00-09:00")],
    );
    let occupancy = index(4);

    let grid = availability_grid(&catalog, &occupancy, TODAY, datetime!(2026-10-18 07:30), rules(4));

    assert_eq!(grid.len(), 2);
    let first: Vec<SlotState> = grid[0].cells.iter().map(|c| c.availability.state).collect();
    assert_eq!(first, [SlotState::Past, SlotState::Full]);
    let second: Vec<SlotState> = grid[1].cells.iter().map(|c| c.availability.state).collect();
    assert_eq!(second, [SlotState::Past, SlotState::Available]);
}
