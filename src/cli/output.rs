//! Output formatting for CLI commands.
//!
//! This module handles formatting output as either JSON or human-readable text.

use std::path::Path;

use chrono::{NaiveDate, NaiveTime};

use termin::AvailableSlot;

/// Print available slots.
pub fn print_slots(slots: &[AvailableSlot], json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(slots).unwrap());
    } else {
        if slots.is_empty() {
            println!("No free slots found.");
            return;
        }

        println!("{:<12} {:<7} {:<7} TIMEZONE", "DATE", "START", "END");
        println!("{}", "-".repeat(46));

        for slot in slots {
            println!(
                "{:<12} {:<7} {:<7} {}",
                slot.date.format("%Y-%m-%d"),
                slot.start.format("%H:%M"),
                slot.end.format("%H:%M"),
                slot.timezone
            );
        }

        println!("\nTotal: {} slots", slots.len());
    }
}

/// Print a bookability verdict.
pub fn print_check(
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    bookable: bool,
    reason: &str,
    json: bool,
) {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "date": date.format("%Y-%m-%d").to_string(),
                "start": start.format("%H:%M").to_string(),
                "end": end.format("%H:%M").to_string(),
                "bookable": bookable,
                "reason": reason,
            }))
            .unwrap()
        );
    } else if bookable {
        println!(
            "{} {}-{} is bookable",
            date.format("%Y-%m-%d"),
            start.format("%H:%M"),
            end.format("%H:%M")
        );
    } else {
        println!(
            "{} {}-{} is not bookable: {}",
            date.format("%Y-%m-%d"),
            start.format("%H:%M"),
            end.format("%H:%M"),
            reason
        );
    }
}

/// Print the init result.
pub fn print_init(path: &Path, existed: bool, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "path": path.display().to_string(),
                "created": !existed,
            }))
            .unwrap()
        );
    } else if existed {
        println!("Schedule document already exists at {}", path.display());
    } else {
        println!("Created default schedule document at {}", path.display());
    }
}
