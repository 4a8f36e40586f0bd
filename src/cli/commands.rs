//! CLI command handlers.
//!
//! Each handler loads the schedule document, runs one operation, and
//! prints the result through the output module.

use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};

use termin::{Config, FileMailbox, ScheduleStore, SchedulingEngine, SlotFinder, SlotQuery};

use super::output;

fn build_store(config: &Config) -> Result<ScheduleStore> {
    Ok(ScheduleStore::new(config.schedule_path()?))
}

fn build_engine(config: &Config) -> Result<SchedulingEngine> {
    let mailbox = Arc::new(FileMailbox::new(
        config.maildir_path()?,
        config.mail.drafts_folder.clone(),
        config.mail.sender.clone(),
    ));
    Ok(SchedulingEngine::new(build_store(config)?, mailbox)?)
}

/// Run the slots command.
pub fn run_slots(
    config: Config,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    max: usize,
    notice: i64,
    json_output: bool,
) -> Result<()> {
    let store = build_store(&config)?;
    store.ensure_exists()?;

    let finder = SlotFinder::new(store.load()?)?;
    let mut query = SlotQuery::default()
        .with_max_results(max)
        .with_min_notice_hours(notice);
    if let Some(from) = from {
        query = query.with_from_date(from);
    }
    if let Some(to) = to {
        query = query.with_to_date(to);
    }

    let slots = finder.find_available_slots(&query)?;
    output::print_slots(&slots, json_output);
    Ok(())
}

/// Run the check command.
pub fn run_check(
    config: Config,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    json_output: bool,
) -> Result<()> {
    let engine = build_engine(&config)?;
    let (bookable, reason) = engine.check_slot(date, start, end)?;
    output::print_check(date, start, end, bookable, &reason, json_output);
    Ok(())
}

/// Run the init command.
pub fn run_init(config: Config, json_output: bool) -> Result<()> {
    let store = build_store(&config)?;
    let existed = store.path().exists();
    store.ensure_exists()?;
    output::print_init(store.path(), existed, json_output);
    Ok(())
}
