//! Engine and slot finder behavior over a schedule file created from scratch.
//!
//! The engine writes a starter document on first use. These tests pin down
//! what that document promises: Berlin time, 30-minute slots, Mon-Fri
//! availability with a lunch gap, German holidays honored.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Weekday};
use chrono_tz::Europe::Berlin;
use proptest::prelude::*;
use tempfile::TempDir;

use termin::mail::MemoryMailbox;
use termin::schedule::{overlaps, ScheduleStore, SchedulingEngine, SlotFinder, SlotQuery};

fn create_engine(data_dir: &std::path::Path) -> SchedulingEngine {
    let store = ScheduleStore::new(data_dir.join("schedule.json"));
    SchedulingEngine::new(store, Arc::new(MemoryMailbox::new())).unwrap()
}

#[tokio::test]
async fn test_engine_writes_starter_document() {
    let data_dir = TempDir::new().unwrap();
    let engine = create_engine(data_dir.path());

    assert!(data_dir.path().join("schedule.json").is_file());

    let document = engine.store().load().unwrap();
    assert_eq!(document.schedule.timezone, "Europe/Berlin");
    assert_eq!(document.schedule.slot_duration, 30);
    assert_eq!(document.schedule.region.as_deref(), Some("DE"));
    assert!(document.blocked.is_empty());
}

#[tokio::test]
async fn test_free_slots_stay_inside_weekly_windows() {
    let data_dir = TempDir::new().unwrap();
    let engine = create_engine(data_dir.path());

    let slots = engine.free_slots();
    assert_eq!(slots.len(), 50);

    let morning_start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    let morning_end = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
    let afternoon_start = NaiveTime::from_hms_opt(13, 0, 0).unwrap();
    let afternoon_end = NaiveTime::from_hms_opt(17, 0, 0).unwrap();

    for slot in &slots {
        assert!(
            !matches!(slot.date.weekday(), Weekday::Sat | Weekday::Sun),
            "Slot {} falls on a weekend",
            slot
        );
        let in_morning = slot.start >= morning_start && slot.end <= morning_end;
        let in_afternoon = slot.start >= afternoon_start && slot.end <= afternoon_end;
        assert!(
            in_morning || in_afternoon,
            "Slot {} lies outside the availability windows",
            slot
        );
        assert_eq!(slot.end - slot.start, Duration::minutes(30));
        assert_eq!(slot.timezone, "Europe/Berlin");
    }

    for pair in slots.windows(2) {
        assert!(
            (pair[0].date, pair[0].start) < (pair[1].date, pair[1].start),
            "Slots are not sorted earliest first"
        );
    }
}

#[tokio::test]
async fn test_starter_document_slot_enumeration() {
    let data_dir = TempDir::new().unwrap();
    let engine = create_engine(data_dir.path());

    // Frozen vantage point: Saturday morning two days before a free Monday.
    let document = engine.store().load().unwrap();
    let finder =
        SlotFinder::with_reference_date(document, NaiveDate::from_ymd_opt(2030, 6, 1).unwrap())
            .unwrap();
    let now = Berlin.with_ymd_and_hms(2030, 6, 1, 8, 0, 0).unwrap();

    let slots = finder
        .find_available_slots_at(now, &SlotQuery::default())
        .unwrap();
    assert_eq!(slots.len(), 10);

    // The weekend is skipped; everything lands on Monday, starting at 09:00.
    let monday = NaiveDate::from_ymd_opt(2030, 6, 3).unwrap();
    assert!(slots.iter().all(|slot| slot.date == monday));
    assert_eq!(slots[0].start, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    assert_eq!(slots[0].end, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
}

#[tokio::test]
async fn test_starter_document_bookability() {
    let data_dir = TempDir::new().unwrap();
    let engine = create_engine(data_dir.path());

    let document = engine.store().load().unwrap();
    let finder =
        SlotFinder::with_reference_date(document, NaiveDate::from_ymd_opt(2030, 6, 1).unwrap())
            .unwrap();
    let now = Berlin.with_ymd_and_hms(2030, 6, 1, 8, 0, 0).unwrap();
    let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
    let eleven = NaiveTime::from_hms_opt(11, 0, 0).unwrap();

    // A plain Monday morning is free.
    let monday = NaiveDate::from_ymd_opt(2030, 6, 3).unwrap();
    let (bookable, reason) = finder.is_slot_bookable_at(now, monday, ten, eleven).unwrap();
    assert!(bookable);
    assert_eq!(reason, "");

    // The same time on Saturday is outside the weekly windows.
    let saturday = NaiveDate::from_ymd_opt(2030, 6, 8).unwrap();
    let (bookable, reason) = finder
        .is_slot_bookable_at(now, saturday, ten, eleven)
        .unwrap();
    assert!(!bookable);
    assert_eq!(reason, "Outside of availability");

    // So is the lunch gap on a weekday.
    let (bookable, reason) = finder
        .is_slot_bookable_at(
            now,
            monday,
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
        )
        .unwrap();
    assert!(!bookable);
    assert_eq!(reason, "Outside of availability");

    // Whit Monday 2030 is a working-day holiday and is reported by name.
    let whit_monday = NaiveDate::from_ymd_opt(2030, 6, 10).unwrap();
    let (bookable, reason) = finder
        .is_slot_bookable_at(now, whit_monday, ten, eleven)
        .unwrap();
    assert!(!bookable);
    assert_eq!(reason, "Whit Monday");
}

// ============================================================================
// Interval Overlap Properties
// ============================================================================

proptest! {
    /// Overlap does not depend on the order of the two intervals.
    #[test]
    fn overlap_is_symmetric(
        a_start in 0i64..10_000,
        a_len in 1i64..600,
        b_start in 0i64..10_000,
        b_len in 1i64..600,
    ) {
        let a_end = a_start + a_len;
        let b_end = b_start + b_len;
        prop_assert_eq!(
            overlaps(&a_start, &a_end, &b_start, &b_end),
            overlaps(&b_start, &b_end, &a_start, &a_end)
        );
    }

    /// Intervals that merely touch at a boundary never overlap.
    #[test]
    fn touching_intervals_never_overlap(
        start in 0i64..10_000,
        first_len in 1i64..600,
        second_len in 1i64..600,
    ) {
        let boundary = start + first_len;
        let end = boundary + second_len;
        prop_assert!(!overlaps(&start, &boundary, &boundary, &end));
        prop_assert!(!overlaps(&boundary, &end, &start, &boundary));
    }

    /// An interval nested inside another always overlaps it.
    #[test]
    fn nested_interval_overlaps(
        outer_start in 0i64..10_000,
        lead in 0i64..300,
        inner_len in 1i64..300,
        tail in 0i64..300,
    ) {
        let inner_start = outer_start + lead;
        let inner_end = inner_start + inner_len;
        let outer_end = inner_end + tail;
        prop_assert!(overlaps(&outer_start, &outer_end, &inner_start, &inner_end));
    }
}
