//! Slot generation and bookability checks.
//!
//! The finder expands weekly availability rules into granularity-aligned
//! candidate slots over a date range, drops holidays, short-notice starts,
//! and anything overlapping a blocked interval, and answers point queries
//! for a specific interval with a human-readable rejection reason.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::error::ValidationError;
use crate::schedule::holidays::HolidayCalendar;
use crate::schedule::types::{localize, AvailableSlot, ScheduleDocument, TimeInterval};

/// Half-open interval overlap test. Touching intervals, where one's end
/// equals the other's start, do not overlap.
pub fn overlaps<T: PartialOrd>(a_start: &T, a_end: &T, b_start: &T, b_end: &T) -> bool {
    a_start < b_end && b_start < a_end
}

/// Parameters for a slot enumeration.
#[derive(Debug, Clone)]
pub struct SlotQuery {
    /// First date to consider. Defaults to today in the document's timezone.
    pub from_date: Option<NaiveDate>,
    /// Last date to consider, inclusive. Defaults to 30 days after from.
    pub to_date: Option<NaiveDate>,
    /// Truncate the result to at most this many slots.
    pub max_results: usize,
    /// No slot may start within this many hours from now.
    pub min_notice_hours: i64,
}

impl Default for SlotQuery {
    fn default() -> Self {
        Self {
            from_date: None,
            to_date: None,
            max_results: 10,
            min_notice_hours: 2,
        }
    }
}

impl SlotQuery {
    pub fn with_from_date(mut self, date: NaiveDate) -> Self {
        self.from_date = Some(date);
        self
    }

    pub fn with_to_date(mut self, date: NaiveDate) -> Self {
        self.to_date = Some(date);
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_min_notice_hours(mut self, hours: i64) -> Self {
        self.min_notice_hours = hours;
        self
    }
}

/// Finds available slots in a loaded schedule document.
pub struct SlotFinder {
    document: ScheduleDocument,
    tz: Tz,
    holidays: HolidayCalendar,
}

impl SlotFinder {
    /// Build a finder over the document, with the holiday window anchored
    /// at today.
    pub fn new(document: ScheduleDocument) -> Result<Self, ValidationError> {
        let today = Utc::now().date_naive();
        Self::with_reference_date(document, today)
    }

    /// Build a finder whose holiday window is anchored at the given date.
    pub fn with_reference_date(
        document: ScheduleDocument,
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let tz = document.schedule.tz()?;
        let holidays =
            HolidayCalendar::with_reference_date(document.schedule.region.as_deref(), today);
        Ok(Self {
            document,
            tz,
            holidays,
        })
    }

    /// The document's timezone.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    /// Enumerate available slots for the query, relative to the wall clock.
    pub fn find_available_slots(
        &self,
        query: &SlotQuery,
    ) -> Result<Vec<AvailableSlot>, ValidationError> {
        self.find_available_slots_at(self.now(), query)
    }

    /// Enumerate available slots for the query, relative to an explicit
    /// "now". Results are chronological by construction: dates ascend and
    /// slot starts ascend within a date.
    pub fn find_available_slots_at(
        &self,
        now: DateTime<Tz>,
        query: &SlotQuery,
    ) -> Result<Vec<AvailableSlot>, ValidationError> {
        let from_date = query.from_date.unwrap_or_else(|| now.date_naive());
        let to_date = query.to_date.unwrap_or(from_date + Duration::days(30));
        let min_bookable = now + Duration::hours(query.min_notice_hours);

        let mut available = Vec::new();
        let mut current = from_date;

        while current <= to_date && available.len() < query.max_results {
            available.extend(self.slots_for_date(current, min_bookable)?);
            current += Duration::days(1);
        }

        available.truncate(query.max_results);
        Ok(available)
    }

    /// Generate the surviving candidate slots for one date.
    fn slots_for_date(
        &self,
        date: NaiveDate,
        min_bookable: DateTime<Tz>,
    ) -> Result<Vec<AvailableSlot>, ValidationError> {
        if self.holidays.is_holiday(date) {
            return Ok(Vec::new());
        }

        // Union of windows across every rule covering this weekday.
        // Duplicates between overlapping rules are kept as configured.
        let mut windows: Vec<TimeInterval> = Vec::new();
        for weekly in &self.document.schedule.weekly {
            if weekly.applies_on(date) {
                windows.extend(weekly.slots.iter().copied());
            }
        }
        if windows.is_empty() {
            return Ok(Vec::new());
        }

        let step = Duration::minutes(i64::from(self.document.schedule.slot_duration));
        let mut available = Vec::new();

        for window in windows {
            let mut current = localize(date.and_time(window.start), self.tz)?;
            let window_end = localize(date.and_time(window.end), self.tz)?;

            while current + step <= window_end {
                let slot_start = current.time();
                let slot_end = (current + step).time();

                if current >= min_bookable && !self.is_blocked(date, slot_start, slot_end)? {
                    available.push(AvailableSlot {
                        date,
                        start: slot_start,
                        end: slot_end,
                        timezone: self.document.schedule.timezone.clone(),
                    });
                }

                current += step;
            }
        }

        Ok(available)
    }

    /// Whether [start,end) on the date overlaps any blocked interval.
    fn is_blocked(
        &self,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<bool, ValidationError> {
        let slot_start = localize(date.and_time(start), self.tz)?;
        let slot_end = localize(date.and_time(end), self.tz)?;

        for blocked in &self.document.blocked {
            let block_start = blocked.resolved_start(self.tz)?;
            let block_end = blocked.resolved_end(self.tz)?;

            if overlaps(&slot_start, &slot_end, &block_start, &block_end) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Whether [start,end) on the date could be booked, relative to the
    /// wall clock.
    pub fn is_slot_bookable(
        &self,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<(bool, String), ValidationError> {
        self.is_slot_bookable_at(self.now(), date, start, end)
    }

    /// Whether [start,end) on the date could be booked, relative to an
    /// explicit "now". The first failing check wins and supplies the
    /// rejection reason; an accepted slot carries an empty reason.
    ///
    /// Minimum notice is deliberately not consulted here. A caller naming a
    /// specific slot is asking whether it is legally available, not whether
    /// it satisfies the enumeration's lead-time policy.
    pub fn is_slot_bookable_at(
        &self,
        now: DateTime<Tz>,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<(bool, String), ValidationError> {
        let slot_start = localize(date.and_time(start), self.tz)?;

        if slot_start < now {
            return Ok((false, "Timepoint is in the past".to_string()));
        }

        if self.holidays.is_holiday(date) {
            let name = self
                .holidays
                .holiday_name(date)
                .unwrap_or_else(|| "Holiday".to_string());
            return Ok((false, name));
        }

        let mut day_available = false;
        for weekly in &self.document.schedule.weekly {
            if weekly.applies_on(date) {
                for window in &weekly.slots {
                    if window.start <= start && end <= window.end {
                        day_available = true;
                        break;
                    }
                }
            }
        }
        if !day_available {
            return Ok((false, "Outside of availability".to_string()));
        }

        if self.is_blocked(date, start, end)? {
            let slot_end = localize(date.and_time(end), self.tz)?;
            for blocked in &self.document.blocked {
                let block_start = blocked.resolved_start(self.tz)?;
                let block_end = blocked.resolved_end(self.tz)?;

                if overlaps(&slot_start, &slot_end, &block_start, &block_end) {
                    let reason = blocked
                        .reason
                        .clone()
                        .filter(|reason| !reason.is_empty())
                        .unwrap_or_else(|| "Blocked".to_string());
                    return Ok((false, reason));
                }
            }
        }

        Ok((true, String::new()))
    }
}
