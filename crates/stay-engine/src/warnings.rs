//! Per-member warning rule evaluation.

use chrono::{Datelike, NaiveDate};

use crate::model::{WarningKind, WarningRule};
use crate::rolling::HighlightTrip;

/// Evaluate a member's enabled rules and collect the messages that fire.
///
/// `entry_dates` are the parsed entry dates of every trip selected for the
/// member. Each rule contributes its message at most once, in rule order,
/// however many trips violate it. A rule missing its criterion never fires.
pub fn evaluate_warnings(
    rules: &[WarningRule],
    entry_dates: &[NaiveDate],
    highlights: &[HighlightTrip],
) -> Vec<String> {
    rules
        .iter()
        .filter(|rule| rule.enabled)
        .filter(|rule| rule_fires(rule, entry_dates, highlights))
        .map(|rule| rule.criteria.message.clone())
        .collect()
}

fn rule_fires(rule: &WarningRule, entry_dates: &[NaiveDate], highlights: &[HighlightTrip]) -> bool {
    match rule.kind {
        WarningKind::FlightDays => match &rule.criteria.days {
            Some(allowed) => entry_dates
                .iter()
                .any(|date| !allowed.contains(&weekday_index(*date))),
            None => false,
        },
        WarningKind::StayLimit => match rule.criteria.limit {
            Some(limit) => highlights.iter().any(|h| h.days_in_year > limit),
            None => false,
        },
        WarningKind::Custom => false,
    }
}

/// Weekday as 0..=6 with 0 = Sunday.
fn weekday_index(date: NaiveDate) -> u8 {
    // num_days_from_sunday is always < 7
    date.weekday().num_days_from_sunday() as u8
}
