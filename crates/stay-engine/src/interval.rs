//! Inclusive calendar-date intervals and the arithmetic both engines share.
//!
//! All intervals here are closed: `[start, end]` covers both endpoint days, so a
//! trip entering and leaving on the same day counts as one day. An interval
//! whose `end` precedes its `start` is *degenerate*: it covers nothing and
//! contributes zero days, but is never rejected.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// Wire and display format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `yyyy-MM-dd` string into a calendar date.
///
/// # Errors
/// Returns `PlannerError::InvalidDate` for anything else, including datetimes.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| PlannerError::InvalidDate(s.to_string()))
}

/// Format a date as `yyyy-MM-dd`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Number of days from `start` to `end`, counting both endpoints.
///
/// Zero or negative when `end < start`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Shift a date forward by whole calendar years.
///
/// Feb 29 lands on Feb 28 when the target year is not a leap year. Saturates
/// at the end of chrono's date range.
pub fn add_years(date: NaiveDate, years: u32) -> NaiveDate {
    date.checked_add_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MAX)
}

/// Shift a date backward by whole calendar years. See [`add_years`].
pub fn sub_years(date: NaiveDate, years: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN)
}

/// A closed `[start, end]` range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse both endpoints from `yyyy-MM-dd` strings.
    ///
    /// # Errors
    /// Returns `PlannerError::InvalidDate` naming the first unparseable string.
    pub fn from_strs(start: &str, end: &str) -> Result<Self> {
        Ok(Self::new(parse_date(start)?, parse_date(end)?))
    }

    pub fn is_degenerate(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Inclusive overlap test: sharing a single endpoint day counts.
    pub fn overlaps(&self, other: &DateInterval) -> bool {
        !self.is_degenerate()
            && !other.is_degenerate()
            && self.start <= other.end
            && other.start <= self.end
    }

    /// The days covered by both intervals, if any.
    pub fn clamped_overlap(&self, other: &DateInterval) -> Option<DateInterval> {
        let clipped = DateInterval::new(self.start.max(other.start), self.end.min(other.end));
        (!clipped.is_degenerate()).then_some(clipped)
    }

    /// The part of this interval on or before `limit`, if any.
    pub fn clip_end(&self, limit: NaiveDate) -> Option<DateInterval> {
        let clipped = DateInterval::new(self.start, self.end.min(limit));
        (!clipped.is_degenerate()).then_some(clipped)
    }

    /// Inclusive day count; `0` for degenerate intervals.
    pub fn day_count(&self) -> i64 {
        days_inclusive(self.start, self.end).max(0)
    }
}

/// Coalesce intervals into a sorted, disjoint list.
///
/// Intervals that overlap or touch on consecutive days are merged, since at
/// day granularity there is no gap between them. Degenerate intervals are
/// discarded.
pub fn merge_intervals(mut intervals: Vec<DateInterval>) -> Vec<DateInterval> {
    intervals.retain(|iv| !iv.is_degenerate());
    intervals.sort_by_key(|iv| (iv.start, iv.end));

    let mut merged: Vec<DateInterval> = Vec::with_capacity(intervals.len());
    for iv in intervals {
        if let Some(last) = merged.last_mut() {
            let touches = last
                .end
                .checked_add_days(Days::new(1))
                .is_none_or(|next_day| iv.start <= next_day);
            if touches {
                last.end = last.end.max(iv.end);
                continue;
            }
        }
        merged.push(iv);
    }

    merged
}
