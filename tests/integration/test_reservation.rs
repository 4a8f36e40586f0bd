//! End-to-end reservation flow against real files.
//!
//! These tests drive the scheduling engine with a file-backed mailbox, the
//! same wiring the MCP server uses, and verify both sides of a reservation:
//! the blocked interval in the schedule file and the draft in the maildir.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Europe::Berlin;
use tempfile::TempDir;

use termin::mail::FileMailbox;
use termin::schedule::{ReservationRequest, ScheduleStore, SchedulingEngine, SlotFinder};

/// Wire an engine the way the server does, rooted in a temp directory.
fn create_engine(data_dir: &std::path::Path) -> SchedulingEngine {
    let store = ScheduleStore::new(data_dir.join("schedule.json"));
    let mailbox = Arc::new(FileMailbox::new(
        data_dir.join("mail"),
        "Drafts",
        "scheduler@example.com",
    ));
    SchedulingEngine::new(store, mailbox).unwrap()
}

/// A reservation on a Monday morning, well inside the default availability.
fn reservation() -> ReservationRequest {
    ReservationRequest {
        datetime: "2030-06-03T10:00:00+02:00".to_string(),
        duration: 60,
        reason: "Meeting with Lisa".to_string(),
        subject: "Re: Meeting request".to_string(),
        body: "Confirmed for Monday at 10:00. Looking forward to it.".to_string(),
        to: "lisa@example.com".to_string(),
        in_reply_to: Some("<original@example.com>".to_string()),
    }
}

#[tokio::test]
async fn test_reservation_persists_block_and_draft() {
    let data_dir = TempDir::new().unwrap();
    let engine = create_engine(data_dir.path());

    let saved = engine.reserve_slot_and_notify(&reservation()).await;
    assert!(saved, "Reservation should block the slot and save the draft");

    // The blocked interval is on disk.
    let document = engine.store().load().unwrap();
    assert_eq!(document.blocked.len(), 1);
    assert_eq!(
        document.blocked[0].reason.as_deref(),
        Some("Meeting with Lisa")
    );

    // The draft is on disk too, as one JSON file in the drafts folder.
    let drafts_dir = data_dir.path().join("mail").join("Drafts");
    let drafts: Vec<_> = std::fs::read_dir(&drafts_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(drafts.len(), 1);
    assert_eq!(
        drafts[0].extension().and_then(|e| e.to_str()),
        Some("json")
    );
}

#[tokio::test]
async fn test_reserved_slot_is_rejected_afterwards() {
    let data_dir = TempDir::new().unwrap();
    let engine = create_engine(data_dir.path());

    assert!(engine.reserve_slot_and_notify(&reservation()).await);

    // Check bookability from a fixed vantage point two days earlier.
    let document = engine.store().load().unwrap();
    let finder =
        SlotFinder::with_reference_date(document, NaiveDate::from_ymd_opt(2030, 6, 1).unwrap())
            .unwrap();
    let now = Berlin.with_ymd_and_hms(2030, 6, 1, 8, 0, 0).unwrap();
    let date = NaiveDate::from_ymd_opt(2030, 6, 3).unwrap();

    let (bookable, reason) = finder
        .is_slot_bookable_at(
            now,
            date,
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        )
        .unwrap();
    assert!(!bookable);
    assert_eq!(reason, "Meeting with Lisa");

    // The hour right after the meeting is still free.
    let (bookable, reason) = finder
        .is_slot_bookable_at(
            now,
            date,
            NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        )
        .unwrap();
    assert!(bookable);
    assert_eq!(reason, "");
}

#[tokio::test]
async fn test_search_finds_recorded_draft() {
    let data_dir = TempDir::new().unwrap();
    let engine = create_engine(data_dir.path());

    assert!(engine.reserve_slot_and_notify(&reservation()).await);

    let messages = engine.search_messages("Drafts", "ALL").await.unwrap();
    assert_eq!(messages.len(), 1);

    let (_, draft) = &messages[0];
    assert_eq!(draft.subject, "Re: Meeting request");
    assert_eq!(draft.from, "scheduler@example.com");
    assert_eq!(draft.to, "lisa@example.com");
    assert_eq!(draft.in_reply_to, "<original@example.com>");
    assert_eq!(draft.references, "<original@example.com>");
    assert!(draft.message_id.ends_with("@termin.local>"));

    // Fetching the draft marked it seen, so an unseen search comes up empty.
    let unseen = engine.search_messages("Drafts", "UNSEEN").await.unwrap();
    assert!(unseen.is_empty());
}

#[tokio::test]
async fn test_invalid_start_leaves_no_trace() {
    let data_dir = TempDir::new().unwrap();
    let engine = create_engine(data_dir.path());

    let mut request = reservation();
    request.datetime = "next Tuesday".to_string();

    let saved = engine.reserve_slot_and_notify(&request).await;
    assert!(!saved);

    let document = engine.store().load().unwrap();
    assert!(document.blocked.is_empty());
    assert!(!data_dir.path().join("mail").join("Drafts").exists());
}

#[tokio::test]
async fn test_consecutive_reservations_accumulate() {
    let data_dir = TempDir::new().unwrap();
    let engine = create_engine(data_dir.path());

    assert!(engine.reserve_slot_and_notify(&reservation()).await);

    let mut second = reservation();
    second.datetime = "2030-06-03T14:00:00+02:00".to_string();
    second.reason = "Follow-up with Lisa".to_string();
    assert!(engine.reserve_slot_and_notify(&second).await);

    let document = engine.store().load().unwrap();
    assert_eq!(document.blocked.len(), 2);

    let drafts = engine.search_messages("Drafts", "ALL").await.unwrap();
    assert_eq!(drafts.len(), 2);
}
