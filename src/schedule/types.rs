//! Schedule model types.
//!
//! This module defines the persisted schedule document (timezone, slot
//! granularity, weekly availability rules, blocked intervals) and the
//! computed slot values produced when querying it.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

// ============================================================================
// Weekdays
// ============================================================================

/// Day of the week, serialized as its lowercase three-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// ISO weekday number (1=Monday, 7=Sunday).
    pub fn iso_number(self) -> u32 {
        match self {
            Self::Mon => 1,
            Self::Tue => 2,
            Self::Wed => 3,
            Self::Thu => 4,
            Self::Fri => 5,
            Self::Sat => 6,
            Self::Sun => 7,
        }
    }

    /// Whether the given calendar date falls on this weekday.
    pub fn matches(self, date: NaiveDate) -> bool {
        self.iso_number() == date.weekday().number_from_monday()
    }
}

// ============================================================================
// Time Intervals
// ============================================================================

/// A wall-clock time window within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    /// Start of the window.
    #[serde(with = "hm_time")]
    pub start: NaiveTime,
    /// End of the window, strictly after start.
    #[serde(with = "hm_time")]
    pub end: NaiveTime,
}

impl TimeInterval {
    /// Create an interval, rejecting end <= start.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        let interval = Self { start, end };
        interval.validate()?;
        Ok(interval)
    }

    /// Check the ordering invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.end <= self.start {
            return Err(ValidationError::EmptyInterval {
                start: self.start.format("%H:%M").to_string(),
                end: self.end.format("%H:%M").to_string(),
            });
        }
        Ok(())
    }

    /// Window length in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Serde adapter for `HH:MM` time-of-day fields.
///
/// Accepts `HH:MM:SS` on input for documents written by older tooling.
mod hm_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Weekly Availability
// ============================================================================

/// A recurring rule binding a set of weekdays to daily time windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    /// Weekdays the rule applies to. Must not be empty.
    pub days: Vec<Weekday>,
    /// Time windows available on each of those days.
    pub slots: Vec<TimeInterval>,
}

impl WeeklyAvailability {
    /// Create a rule, rejecting an empty weekday set.
    pub fn new(days: Vec<Weekday>, slots: Vec<TimeInterval>) -> Result<Self, ValidationError> {
        let rule = Self { days, slots };
        rule.validate()?;
        Ok(rule)
    }

    /// Check the non-empty-days invariant and each interval.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.days.is_empty() {
            return Err(ValidationError::NoDays);
        }
        for slot in &self.slots {
            slot.validate()?;
        }
        Ok(())
    }

    /// Whether this rule covers the given date's weekday.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.days.iter().any(|day| day.matches(date))
    }
}

// ============================================================================
// Blocked Intervals
// ============================================================================

/// A reservation removing availability from the calendar.
///
/// The start is either a bare date (all-day entry) or an ISO-8601 datetime.
/// Exactly one of `duration` and `until` bounds a timed entry; an all-day
/// entry may carry neither and then spans to 23:59:59 of its date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedInterval {
    /// Start instant: `2025-01-06` or `2025-01-06T10:00+01:00`.
    pub datetime: String,
    /// Length in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Explicit end instant, ISO-8601. A bare date means end of that date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
    /// Free-text reason shown to callers asking why a slot is unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BlockedInterval {
    /// Create an entry, enforcing the duration/until mutual exclusion and
    /// requiring a bound for timed entries.
    pub fn new(
        datetime: impl Into<String>,
        duration: Option<u32>,
        until: Option<String>,
        reason: Option<String>,
    ) -> Result<Self, ValidationError> {
        let entry = Self {
            datetime: datetime.into(),
            duration,
            until,
            reason,
        };
        entry.check_bounds()?;
        Ok(entry)
    }

    /// True iff the start has no time component.
    pub fn is_all_day(&self) -> bool {
        !self.datetime.contains('T')
    }

    fn check_bounds(&self) -> Result<(), ValidationError> {
        if self.duration.is_some() && self.until.is_some() {
            return Err(ValidationError::DurationAndUntil);
        }
        if self.duration.is_none() && self.until.is_none() && !self.is_all_day() {
            return Err(ValidationError::UnboundedBlock);
        }
        Ok(())
    }

    /// Start instant in the document's timezone. All-day entries start at
    /// local midnight; offset-less datetimes are interpreted in `zone`.
    pub fn resolved_start(&self, zone: Tz) -> Result<DateTime<Tz>, ValidationError> {
        if self.is_all_day() {
            let date = parse_plain_date(&self.datetime)?;
            return localize(date.and_time(NaiveTime::MIN), zone);
        }
        parse_zoned_datetime(&self.datetime, zone)
    }

    /// End instant in the document's timezone: the explicit `until` if given
    /// (a bare date meaning 23:59:59 of that date), else start + duration,
    /// else 23:59:59 of an all-day entry's date.
    pub fn resolved_end(&self, zone: Tz) -> Result<DateTime<Tz>, ValidationError> {
        if let Some(until) = &self.until {
            if until.contains('T') {
                return parse_zoned_datetime(until, zone);
            }
            let date = parse_plain_date(until)?;
            return localize(end_of_day(date), zone);
        }
        if let Some(minutes) = self.duration {
            let start = self.resolved_start(zone)?;
            return Ok(start + Duration::minutes(i64::from(minutes)));
        }
        if self.is_all_day() {
            let date = parse_plain_date(&self.datetime)?;
            return localize(end_of_day(date), zone);
        }
        Err(ValidationError::UnboundedBlock)
    }

    /// Check bounds and that both endpoints resolve in `zone`.
    pub fn validate(&self, zone: Tz) -> Result<(), ValidationError> {
        self.check_bounds()?;
        self.resolved_start(zone)?;
        self.resolved_end(zone)?;
        Ok(())
    }
}

// ============================================================================
// Schedule Document
// ============================================================================

/// Availability policy: timezone, slot granularity, and weekly rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// IANA timezone identifier, e.g. `Europe/Berlin`.
    pub timezone: String,
    /// Slot granularity in minutes, 5..=480.
    pub slot_duration: u32,
    /// Region code selecting a holiday rule table, e.g. `DE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Weekly availability rules. A weekday's windows are the union across
    /// all rules that include it.
    pub weekly: Vec<WeeklyAvailability>,
}

impl Schedule {
    /// Parse the timezone identifier.
    pub fn tz(&self) -> Result<Tz, ValidationError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ValidationError::UnknownTimezone(self.timezone.clone()))
    }

    /// Check timezone, granularity bounds, and every weekly rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.tz()?;
        if !(5..=480).contains(&self.slot_duration) {
            return Err(ValidationError::SlotDurationOutOfRange(self.slot_duration));
        }
        for weekly in &self.weekly {
            weekly.validate()?;
        }
        Ok(())
    }
}

/// Root of the durable schedule file.
///
/// The sole persisted aggregate: loaded fully per operation, mutated only by
/// appending blocked entries, rewritten wholesale on save. Blocked entries
/// keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDocument {
    /// Availability policy.
    pub schedule: Schedule,
    /// Blocked intervals, append order preserved.
    #[serde(default)]
    pub blocked: Vec<BlockedInterval>,
}

impl ScheduleDocument {
    /// Check the policy and every blocked entry against the document zone.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.schedule.validate()?;
        let zone = self.schedule.tz()?;
        for blocked in &self.blocked {
            blocked.validate(zone)?;
        }
        Ok(())
    }
}

impl Default for ScheduleDocument {
    /// A reasonable starter document: Berlin time, 30-minute slots, German
    /// holidays, Mon-Fri 09:00-12:00 and 13:00-17:00.
    fn default() -> Self {
        Self {
            schedule: Schedule {
                timezone: "Europe/Berlin".to_string(),
                slot_duration: 30,
                region: Some("DE".to_string()),
                weekly: vec![WeeklyAvailability {
                    days: vec![
                        Weekday::Mon,
                        Weekday::Tue,
                        Weekday::Wed,
                        Weekday::Thu,
                        Weekday::Fri,
                    ],
                    slots: vec![
                        TimeInterval {
                            start: hm(9, 0),
                            end: hm(12, 0),
                        },
                        TimeInterval {
                            start: hm(13, 0),
                            end: hm(17, 0),
                        },
                    ],
                }],
            },
            blocked: Vec::new(),
        }
    }
}

// ============================================================================
// Available Slots
// ============================================================================

/// A computed candidate bookable interval. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSlot {
    /// Calendar date of the slot.
    pub date: NaiveDate,
    /// Start time of day.
    pub start: NaiveTime,
    /// End time of day, exactly one granularity step after start.
    pub end: NaiveTime,
    /// Timezone the times are expressed in.
    pub timezone: String,
}

impl fmt::Display for AvailableSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}",
            self.date.format("%a %d.%m."),
            self.start.format("%H:%M")
        )
    }
}

// ============================================================================
// Datetime Parsing
// ============================================================================

/// Parse an ISO-8601 instant into the given zone.
///
/// Accepts offset-qualified datetimes with or without seconds, offset-less
/// datetimes (interpreted in `zone`), and bare dates (local midnight).
pub fn parse_zoned_datetime(value: &str, zone: Tz) -> Result<DateTime<Tz>, ValidationError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&zone));
    }
    if let Ok(parsed) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z") {
        return Ok(parsed.with_timezone(&zone));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
    {
        return localize(naive, zone);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return localize(date.and_time(NaiveTime::MIN), zone);
    }
    Err(ValidationError::InvalidDatetime(value.to_string()))
}

fn parse_plain_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDatetime(value.to_string()))
}

/// Resolve a local wall-clock time to an instant. Ambiguous times (DST fold)
/// take the earlier offset; nonexistent times (DST gap) are rejected.
pub(crate) fn localize(naive: NaiveDateTime, zone: Tz) -> Result<DateTime<Tz>, ValidationError> {
    zone.from_local_datetime(&naive).earliest().ok_or_else(|| {
        ValidationError::NonexistentLocalTime(naive.to_string(), zone.name().to_string())
    })
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 59, 59).unwrap_or(NaiveDateTime::MIN)
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

// ============================================================================
// Tests
// ============================================================================
