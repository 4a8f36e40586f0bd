//! Holiday calendar with per-region rule tables.
//!
//! A region code selects a rule table; construction eagerly expands the rules
//! into a date set spanning one year back and three years forward, so that
//! the slot finder can test dates in tight loops without re-deriving them.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use std::collections::HashSet;

/// A single holiday derivation rule.
#[derive(Debug, Clone, Copy)]
enum HolidayRule {
    /// Same month and day every year.
    Fixed {
        name: &'static str,
        month: u32,
        day: u32,
    },
    /// A fixed offset in days from Easter Sunday.
    EasterOffset { name: &'static str, days: i64 },
}

impl HolidayRule {
    fn name(&self) -> &'static str {
        match self {
            Self::Fixed { name, .. } => name,
            Self::EasterOffset { name, .. } => name,
        }
    }

    /// The rule's date in the given year, if it derives one.
    fn evaluate(&self, year: i32) -> Option<NaiveDate> {
        match *self {
            Self::Fixed { month, day, .. } => NaiveDate::from_ymd_opt(year, month, day),
            Self::EasterOffset { days, .. } => {
                easter_sunday(year).map(|easter| easter + Duration::days(days))
            }
        }
    }
}

/// German public holidays (nationwide set plus Reformation Day and the
/// half-day customs of Christmas Eve and New Year's Eve).
const GERMAN_RULES: &[HolidayRule] = &[
    HolidayRule::Fixed {
        name: "New Year's Day",
        month: 1,
        day: 1,
    },
    HolidayRule::EasterOffset {
        name: "Good Friday",
        days: -2,
    },
    HolidayRule::EasterOffset {
        name: "Easter Monday",
        days: 1,
    },
    HolidayRule::EasterOffset {
        name: "Ascension Day",
        days: 39,
    },
    HolidayRule::EasterOffset {
        name: "Whit Monday",
        days: 50,
    },
    HolidayRule::Fixed {
        name: "Labor Day",
        month: 5,
        day: 1,
    },
    HolidayRule::Fixed {
        name: "German Unity Day",
        month: 10,
        day: 3,
    },
    HolidayRule::Fixed {
        name: "Reformation Day",
        month: 10,
        day: 31,
    },
    HolidayRule::Fixed {
        name: "Christmas Eve",
        month: 12,
        day: 24,
    },
    HolidayRule::Fixed {
        name: "Christmas Day",
        month: 12,
        day: 25,
    },
    HolidayRule::Fixed {
        name: "Boxing Day",
        month: 12,
        day: 26,
    },
    HolidayRule::Fixed {
        name: "New Year's Eve",
        month: 12,
        day: 31,
    },
];

fn rule_table(region: &str) -> Option<&'static [HolidayRule]> {
    match region {
        "DE" => Some(GERMAN_RULES),
        _ => None,
    }
}

/// Gregorian Easter Sunday by the Meeus/Jones/Butcher computus.
fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Answers whether a date is a holiday for a configured region.
#[derive(Debug, Clone)]
pub struct HolidayCalendar {
    region: Option<String>,
    dates: HashSet<NaiveDate>,
}

impl HolidayCalendar {
    /// Build a calendar for the optional region code, anchored at today.
    /// Unknown or missing codes yield a calendar with no holidays.
    pub fn new(region: Option<&str>) -> Self {
        Self::with_reference_date(region, Utc::now().date_naive())
    }

    /// Build a calendar whose precomputed window is anchored at `today`:
    /// one year back through three years forward.
    pub fn with_reference_date(region: Option<&str>, today: NaiveDate) -> Self {
        let mut dates = HashSet::new();

        if let Some(rules) = region.and_then(rule_table) {
            let window_start = shift_years(today, -1);
            let window_end = shift_years(today, 3);
            for year in window_start.year()..=window_end.year() {
                for rule in rules {
                    if let Some(date) = rule.evaluate(year) {
                        if date >= window_start && date <= window_end {
                            dates.insert(date);
                        }
                    }
                }
            }
        }

        Self {
            region: region.map(str::to_string),
            dates,
        }
    }

    /// True iff the date falls inside the precomputed holiday set.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// Display name of the holiday on `date`, if any.
    ///
    /// Re-evaluates the rule table against the date's year rather than the
    /// cached window, so names resolve outside the window too. Rules that
    /// fail to derive a date for that year are skipped.
    pub fn holiday_name(&self, date: NaiveDate) -> Option<String> {
        let rules = self.region.as_deref().and_then(rule_table)?;
        rules
            .iter()
            .find(|rule| rule.evaluate(date.year()) == Some(date))
            .map(|rule| rule.name().to_string())
    }
}

fn shift_years(date: NaiveDate, years: i32) -> NaiveDate {
    date.with_year(date.year() + years)
        .unwrap_or_else(|| date + Duration::days(i64::from(years) * 365))
}
