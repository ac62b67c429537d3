//! Epidemiological week (MMWR) date arithmetic.
//!
//! Surveillance weeks run Sunday through Saturday and carry their own
//! week/year numbering, distinct from the ISO calendar:
//!
//! - a date's week is identified by the Saturday that ends it
//! - the epi year of a week is the calendar year of its Wednesday (the 4th
//!   day), so week 1 is the Sun-Sat week with at least 4 days in January
//!
//! Everything here is pure date arithmetic; no I/O, no state.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// The Saturday that ends the epi-week containing `date`.
///
/// A Saturday maps to itself.
pub fn week_ending_saturday(date: NaiveDate) -> NaiveDate {
    let days_from_sunday = date.weekday().num_days_from_sunday() as i64;
    date + Duration::days(6 - days_from_sunday)
}

/// An MMWR epi-week identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EpiWeek {
    pub year: i32,
    pub week: u32,
}

impl std::fmt::Display for EpiWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}w{:02}", self.year, self.week)
    }
}

/// Epi year and week number of the week containing `date`.
pub fn epi_week_of(date: NaiveDate) -> EpiWeek {
    // The Wednesday of the Sun-Sat week owns the epi year; its ordinal within
    // that year determines the week number.
    let sunday = date - Duration::days(date.weekday().num_days_from_sunday() as i64);
    let wednesday = sunday + Duration::days(3);
    EpiWeek {
        year: wednesday.year(),
        week: (wednesday.ordinal() - 1) / 7 + 1,
    }
}

/// Signed epi-week count between two week-ending Saturdays.
///
/// `floor((target_end_date - reference_date) / 7)`: negative for hindcast
/// weeks, 0 for the week containing the forecast date, positive beyond it.
pub fn horizon_weeks(reference_date: NaiveDate, target_end_date: NaiveDate) -> i32 {
    (target_end_date - reference_date).num_days().div_euclid(7) as i32
}
