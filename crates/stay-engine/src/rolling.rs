//! Rolling-year day accounting per family member.
//!
//! For every member the engine derives presence on the reference date, the
//! next upcoming trip, and a set of *highlighted* trips near the reference
//! date. Each highlighted trip anchors its own rolling year
//! `[entry, entry + 1 year]`; the member's days inside that year (this trip and
//! every later one, clipped at the anchor) are summed and checked against the
//! yearly limit.
//!
//! Everything here is a pure function of its inputs. Trips whose dates do not
//! parse are logged and skipped; they never abort the computation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::interval::{add_years, sub_years, DateInterval};
use crate::model::{FamilyMember, PlannerState, Trip};
use crate::warnings::evaluate_warnings;

/// Whether a member is inside a trip on the reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Present,
    Away,
}

/// A trip selected for rolling-year reporting, with its day count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightTrip {
    pub trip: Trip,
    /// Entry date plus one calendar year: the end of this trip's rolling year.
    pub ref_date: NaiveDate,
    /// Days spent from this trip's entry up to and including `ref_date`.
    pub days_in_year: i64,
    pub is_over_limit: bool,
}

/// Derived dashboard summary for one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
    pub member_id: String,
    pub name: String,
    pub color: String,
    pub current_status: PresenceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_trip: Option<Trip>,
    pub highlight_trips: Vec<HighlightTrip>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_trip: Option<Trip>,
    pub active_warnings: Vec<String>,
}

/// Test deciding which trips are near enough to the reference date to be
/// highlighted.
///
/// Both variants compare against `reference - 1 year` and `reference + 1 year`
/// with strict inequalities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowPredicate {
    /// `end > reference - 1y || start < reference + 1y`. Admits almost every
    /// trip; kept as the default for compatibility with existing dashboards.
    #[default]
    Either,
    /// `end > reference - 1y && start < reference + 1y`: the trip actually
    /// overlaps the two-year window around the reference date.
    Overlapping,
}

impl WindowPredicate {
    pub fn admits(self, span: &DateInterval, reference: NaiveDate) -> bool {
        let after_past = span.end > sub_years(reference, 1);
        let before_future = span.start < add_years(reference, 1);
        match self {
            WindowPredicate::Either => after_past || before_future,
            WindowPredicate::Overlapping => after_past && before_future,
        }
    }
}

/// Inputs to [`compute_stats_with`] beyond the members and trips themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsOptions {
    pub year_limit: i64,
    pub reference_date: NaiveDate,
    pub window: WindowPredicate,
    /// When false, `active_warnings` is always empty.
    pub warnings_enabled: bool,
}

impl StatsOptions {
    pub fn new(year_limit: i64, reference_date: NaiveDate) -> Self {
        Self {
            year_limit,
            reference_date,
            window: WindowPredicate::default(),
            warnings_enabled: true,
        }
    }

    pub fn with_window(mut self, window: WindowPredicate) -> Self {
        self.window = window;
        self
    }
}

/// A member's trip paired with its parsed dates.
struct DatedTrip<'a> {
    trip: &'a Trip,
    span: DateInterval,
}

/// Compute stats for every member, in input order, with the default window.
pub fn compute_stats(
    members: &[FamilyMember],
    trips: &[Trip],
    year_limit: i64,
    reference_date: NaiveDate,
) -> Vec<MemberStats> {
    compute_stats_with(members, trips, &StatsOptions::new(year_limit, reference_date))
}

/// Compute stats for every member, in input order.
pub fn compute_stats_with(
    members: &[FamilyMember],
    trips: &[Trip],
    options: &StatsOptions,
) -> Vec<MemberStats> {
    members
        .iter()
        .map(|member| member_stats(member, trips, options))
        .collect()
}

/// Compute stats over a whole snapshot, honoring its year limit and global
/// warning switch.
pub fn compute_state_stats(
    state: &PlannerState,
    reference_date: NaiveDate,
    window: WindowPredicate,
) -> Vec<MemberStats> {
    let options = StatsOptions {
        warnings_enabled: state.global_settings.warnings.enabled,
        ..StatsOptions::new(state.global_settings.year_limit, reference_date)
    }
    .with_window(window);
    compute_stats_with(&state.members, &state.trips, &options)
}

fn member_stats(member: &FamilyMember, trips: &[Trip], options: &StatsOptions) -> MemberStats {
    let selected = select_member_trips(trips, &member.id);
    let reference = options.reference_date;

    let current_trip = selected.iter().find(|t| t.span.contains(reference));
    let next_trip = selected.iter().find(|t| t.span.start > reference);

    let highlight_trips: Vec<HighlightTrip> = selected
        .iter()
        .enumerate()
        .filter(|(_, t)| options.window.admits(&t.span, reference))
        .map(|(i, t)| {
            let ref_date = add_years(t.span.start, 1);
            let days_in_year = days_until(&selected[i..], ref_date);
            HighlightTrip {
                trip: t.trip.clone(),
                ref_date,
                days_in_year,
                is_over_limit: days_in_year > options.year_limit,
            }
        })
        .collect();

    let active_warnings = if options.warnings_enabled {
        let entry_dates: Vec<NaiveDate> = selected.iter().map(|t| t.span.start).collect();
        evaluate_warnings(&member.warnings, &entry_dates, &highlight_trips)
    } else {
        Vec::new()
    };

    MemberStats {
        member_id: member.id.clone(),
        name: member.name.clone(),
        color: member.color.clone(),
        current_status: if current_trip.is_some() {
            PresenceStatus::Present
        } else {
            PresenceStatus::Away
        },
        current_trip: current_trip.map(|t| t.trip.clone()),
        highlight_trips,
        next_trip: next_trip.map(|t| t.trip.clone()),
        active_warnings,
    }
}

/// Sum the days of `later` trips (sorted by entry) that fall on or before
/// `ref_date`. Stops at the first trip entering after `ref_date`.
fn days_until(later: &[DatedTrip<'_>], ref_date: NaiveDate) -> i64 {
    later
        .iter()
        .take_while(|t| t.span.start <= ref_date)
        .filter_map(|t| t.span.clip_end(ref_date))
        .map(|clipped| clipped.day_count())
        .sum()
}

/// The member's trips with parseable dates, stably sorted by entry date.
fn select_member_trips<'a>(trips: &'a [Trip], member_id: &str) -> Vec<DatedTrip<'a>> {
    let mut selected: Vec<DatedTrip<'a>> = trips
        .iter()
        .filter(|trip| trip.includes(member_id))
        .filter_map(|trip| match trip.interval() {
            Ok(span) => Some(DatedTrip { trip, span }),
            Err(e) => {
                warn!(trip_id = %trip.id, member_id, error = %e, "skipping trip with malformed dates");
                None
            }
        })
        .collect();
    selected.sort_by_key(|t| t.span.start);
    selected
}

/// Days a member spent in the trailing year `[reference - 1y, reference]`.
pub fn stay_duration(trips: &[Trip], member_id: &str, reference_date: NaiveDate) -> i64 {
    let window = DateInterval::new(sub_years(reference_date, 1), reference_date);
    select_member_trips(trips, member_id)
        .iter()
        .filter_map(|t| t.span.clamped_overlap(&window))
        .map(|overlap| overlap.day_count())
        .sum()
}

/// A member's trips entering within one year either side of the reference
/// date (inclusive), sorted by entry date.
pub fn trips_in_range<'a>(
    trips: &'a [Trip],
    member_id: &str,
    reference_date: NaiveDate,
) -> Vec<&'a Trip> {
    let window = DateInterval::new(sub_years(reference_date, 1), add_years(reference_date, 1));
    select_member_trips(trips, member_id)
        .into_iter()
        .filter(|t| window.contains(t.span.start))
        .map(|t| t.trip)
        .collect()
}

/// Reference date to use when a user picks `clicked` on the calendar.
///
/// A past date is read as "the rolling year starting then", so it is moved
/// forward one year; today or a future date is used as is.
pub fn rolling_reference_for(clicked: NaiveDate, today: NaiveDate) -> NaiveDate {
    if clicked < today {
        add_years(clicked, 1)
    } else {
        clicked
    }
}
