//! Calendar dates with overflow normalization
//!
//! A [`CalendarDate`] is a (year, month, day) triple where the month is 0-based
//! (January = 0). Construction from raw integers always normalizes the triple:
//! days past the end of a month roll into the following months, months outside
//! `0..=11` roll into adjacent years, and underflow borrows from the preceding
//! month. Once built a date is never mutated; arithmetic reconstructs.

use crate::{ValueError, ValueResult};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Days in a 400 year Gregorian cycle
const DAYS_PER_CYCLE: i64 = 146_097;

/// A normalized calendar date
///
/// Field order matters: the derived ordering is lexicographic on
/// (year, month, day), which is only meaningful because every instance is
/// normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    year: i32,
    month: i32,
    day: i32,
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in a 0-based month
fn days_in_month(year: i32, month: i32) -> i32 {
    match month {
        0 | 2 | 4 | 6 | 7 | 9 | 11 => 31,
        3 | 5 | 8 | 10 => 30,
        _ => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

impl CalendarDate {
    /// Build a date from raw fields, normalizing any overflow
    pub fn new(year: i32, month: i32, day: i32) -> Self {
        let mut year = i64::from(year) + i64::from(month.div_euclid(12));
        let mut month = month.rem_euclid(12);

        // Whole Gregorian cycles first, so huge day offsets stay cheap.
        let offset = i64::from(day) - 1;
        year += 400 * offset.div_euclid(DAYS_PER_CYCLE);
        let mut day = offset.rem_euclid(DAYS_PER_CYCLE) + 1;

        loop {
            let length = i64::from(days_in_month(clamp_year(year), month));
            if day <= length {
                break;
            }
            day -= length;
            if month == 11 {
                month = 0;
                year += 1;
            } else {
                month += 1;
            }
        }

        Self {
            year: clamp_year(year),
            month,
            day: day as i32,
        }
    }

    /// Build a date from a chrono date
    pub fn from_naive(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month0() as i32, date.day() as i32)
    }

    /// Build a date from the calendar fields of an instant, in its own time zone
    pub fn from_date_time<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self::from_naive(instant.date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// 0-based month (January = 0)
    pub fn month(&self) -> i32 {
        self.month
    }

    pub fn day_of_month(&self) -> i32 {
        self.day
    }

    /// Convert to a chrono date, `None` when outside chrono's supported range
    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, (self.month + 1) as u32, self.day as u32)
    }

    /// Midnight UTC of this date
    pub fn start_of_day(&self) -> Option<DateTime<FixedOffset>> {
        self.to_naive().and_then(crate::value_type::start_of_day)
    }

    pub fn add_days(&self, days: i32) -> Self {
        Self::new(self.year, self.month, self.day.saturating_add(days))
    }

    /// Add months; a day past the end of the target month rolls over
    pub fn add_months(&self, months: i32) -> Self {
        Self::new(self.year, self.month.saturating_add(months), self.day)
    }

    pub fn add_years(&self, years: i32) -> Self {
        Self::new(self.year.saturating_add(years), self.month, self.day)
    }
}

fn clamp_year(year: i64) -> i32 {
    year.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self::from_naive(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month + 1, self.day)
    }
}

impl FromStr for CalendarDate {
    type Err = ValueError;

    fn from_str(s: &str) -> ValueResult<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self::from_naive)
            .map_err(|e| ValueError::coercion(s, "date", e.to_string()))
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
