//! Termin: Meeting Scheduling MCP Server
//!
//! A Rust MCP server exposing calendar availability built from weekly
//! rules, regional holidays, and blocked intervals, with confirmation
//! email drafts filed through a pluggable mailbox.

pub mod config;
pub mod error;
pub mod mail;
pub mod mcp;
pub mod schedule;

pub use config::Config;
pub use error::{ConfigError, MailError, Result, StorageError, TerminError, ValidationError};
pub use mail::{FileMailbox, Mailbox, MemoryMailbox, MessageMetadata};
pub use mcp::{run_server, TerminServer};
pub use schedule::{
    overlaps, parse_zoned_datetime, AvailableSlot, BlockedInterval, HolidayCalendar,
    ReservationRequest, Schedule, ScheduleDocument, ScheduleStore, SchedulingEngine, SlotFinder,
    SlotQuery, TimeInterval, Weekday, WeeklyAvailability,
};
