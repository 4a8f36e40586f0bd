//! Schedule module for availability, blocking, and reservations.
//!
//! This module provides the scheduling core:
//!
//! - **Schedule Document**: Weekly availability rules, blocked intervals,
//!   timezone, and slot granularity, persisted as JSON
//! - **Holiday Calendar**: Precomputed regional holidays, including the
//!   movable feasts derived from Easter
//! - **Slot Finder**: Expands availability into bookable slots and answers
//!   point queries with a human-readable rejection reason
//! - **Scheduling Engine**: Reservation and notification flows over the
//!   store and a mailbox
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  SchedulingEngine                    │
//! │  free_slots / check_slot / reserve_slot_and_notify   │
//! └───────────────┬──────────────────────┬───────────────┘
//!                 │                      │
//!                 ▼                      ▼
//! ┌───────────────────────────┐  ┌──────────────────────┐
//! │         SlotFinder        │  │       Mailbox        │
//! │  candidate expansion,     │  │  confirmation drafts │
//! │  holiday + block checks   │  └──────────────────────┘
//! └───────────────┬───────────┘
//!                 ▼
//! ┌───────────────────────────┐
//! │       ScheduleStore       │
//! │  schedule.json load/save  │
//! └───────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use termin::schedule::{ScheduleStore, SlotFinder, SlotQuery};
//!
//! let store = ScheduleStore::new("schedule.json");
//! store.ensure_exists()?;
//!
//! let finder = SlotFinder::new(store.load()?)?;
//! let slots = finder.find_available_slots(&SlotQuery::default())?;
//! ```

mod engine;
pub mod finder;
pub mod holidays;
mod store;
pub mod types;

pub use engine::{ReservationRequest, SchedulingEngine};
pub use finder::{overlaps, SlotFinder, SlotQuery};
pub use holidays::HolidayCalendar;
pub use store::ScheduleStore;
pub use types::{
    parse_zoned_datetime, AvailableSlot, BlockedInterval, Schedule, ScheduleDocument, TimeInterval,
    Weekday, WeeklyAvailability,
};
