//! Find date ranges in which no tracked member is present.
//!
//! Trip intervals from every member are merged into covered blocks; the gaps
//! between blocks inside the scan horizon are the empty periods. The scan
//! starts at the earliest trip date (but never before today) and runs to the
//! latest trip date or one year from today, whichever is later.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::interval::{add_years, days_inclusive, merge_intervals, DateInterval};
use crate::model::{FamilyMember, Trip};

/// A maximal run of days with nobody present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Inclusive day count.
    pub duration: i64,
}

impl EmptyPeriod {
    fn spanning(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: start,
            end_date: end,
            duration: days_inclusive(start, end),
        }
    }
}

/// Compute the empty periods across all trips, in chronological order.
///
/// Returns nothing when there are no members. With no usable trips, the whole
/// year from `today` to `today + 1 year` is one empty period.
pub fn compute_empty_periods(
    trips: &[Trip],
    members: &[FamilyMember],
    today: NaiveDate,
) -> Vec<EmptyPeriod> {
    if members.is_empty() {
        return Vec::new();
    }

    let spans: Vec<DateInterval> = trips
        .iter()
        .filter_map(|trip| match trip.interval() {
            Ok(span) => Some(span),
            Err(e) => {
                warn!(trip_id = %trip.id, error = %e, "skipping trip with malformed dates");
                None
            }
        })
        .collect();

    let horizon_end = add_years(today, 1);
    let min_date = spans.iter().map(|s| s.start.min(s.end)).min();
    let max_date = spans.iter().map(|s| s.start.max(s.end)).max();
    let (Some(min_date), Some(max_date)) = (min_date, max_date) else {
        return vec![EmptyPeriod::spanning(today, horizon_end)];
    };

    let scan = DateInterval::new(min_date.max(today), max_date.max(horizon_end));
    find_gaps(&spans, scan)
}

/// Gaps inside `scan` not covered by any of `spans`.
///
/// Degenerate spans cover nothing. The result is sorted, disjoint, and no two
/// periods are adjacent.
pub fn find_gaps(spans: &[DateInterval], scan: DateInterval) -> Vec<EmptyPeriod> {
    if scan.is_degenerate() {
        return Vec::new();
    }

    let covered = merge_intervals(
        spans
            .iter()
            .filter_map(|span| span.clamped_overlap(&scan))
            .collect(),
    );

    let mut gaps = Vec::new();
    let mut cursor = Some(scan.start);

    for busy in &covered {
        if let (Some(free_from), Some(free_until)) = (cursor, busy.start.pred_opt()) {
            if free_from <= free_until {
                gaps.push(EmptyPeriod::spanning(free_from, free_until));
            }
        }
        cursor = busy.end.succ_opt();
    }

    // Trailing gap after the last covered block.
    if let Some(free_from) = cursor {
        if free_from <= scan.end {
            gaps.push(EmptyPeriod::spanning(free_from, scan.end));
        }
    }

    gaps
}
