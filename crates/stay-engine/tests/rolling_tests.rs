//! Tests for per-member rolling-year statistics.

use chrono::NaiveDate;
use stay_engine::model::{FamilyMember, PlannerState, Trip, WarningCriteria, WarningKind, WarningRule};
use stay_engine::rolling::{
    compute_state_stats, compute_stats, compute_stats_with, rolling_reference_for, stay_duration,
    trips_in_range, PresenceStatus, StatsOptions, WindowPredicate,
};
use stay_engine::DateInterval;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn date(s: &str) -> NaiveDate {
    stay_engine::parse_date(s).unwrap()
}

fn member(id: &str) -> FamilyMember {
    FamilyMember {
        id: id.to_string(),
        name: format!("Member {id}"),
        color: "#336699".to_string(),
        warnings: vec![],
    }
}

fn member_with_rules(id: &str, warnings: Vec<WarningRule>) -> FamilyMember {
    FamilyMember {
        warnings,
        ..member(id)
    }
}

fn trip(id: &str, members: &[&str], entry: &str, departure: &str) -> Trip {
    Trip {
        id: id.to_string(),
        member_ids: members.iter().map(|m| m.to_string()).collect(),
        entry_date: entry.to_string(),
        departure_date: departure.to_string(),
        notes: None,
    }
}

fn flight_days_rule(days: Vec<u8>, message: &str) -> WarningRule {
    WarningRule {
        id: "flight".to_string(),
        kind: WarningKind::FlightDays,
        criteria: WarningCriteria {
            days: Some(days),
            limit: None,
            message: message.to_string(),
        },
        enabled: true,
    }
}

fn stay_limit_rule(limit: i64, message: &str) -> WarningRule {
    WarningRule {
        id: "stay".to_string(),
        kind: WarningKind::StayLimit,
        criteria: WarningCriteria {
            days: None,
            limit: Some(limit),
            message: message.to_string(),
        },
        enabled: true,
    }
}

// ── Day counting ────────────────────────────────────────────────────────────

#[test]
fn single_day_trip_counts_one_day() {
    let trips = vec![trip("t1", &["m1"], "2026-03-10", "2026-03-10")];
    let stats = compute_stats(&[member("m1")], &trips, 180, date("2026-03-10"));

    assert_eq!(stats[0].highlight_trips.len(), 1);
    assert_eq!(stats[0].highlight_trips[0].days_in_year, 1);
    assert_eq!(stats[0].highlight_trips[0].ref_date, date("2027-03-10"));
}

#[test]
fn rolling_year_sums_later_trips_up_to_anchor() {
    // Jan 1-10 (10 days) + Dec 20-31 (12 days), both inside the year ending 2026-01-01.
    let trips = vec![
        trip("jan", &["m1"], "2025-01-01", "2025-01-10"),
        trip("dec", &["m1"], "2025-12-20", "2025-12-31"),
    ];
    let stats = compute_stats(&[member("m1")], &trips, 15, date("2025-06-01"));
    let highlights = &stats[0].highlight_trips;

    assert_eq!(highlights.len(), 2);

    assert_eq!(highlights[0].trip.id, "jan");
    assert_eq!(highlights[0].ref_date, date("2026-01-01"));
    assert_eq!(highlights[0].days_in_year, 22);
    assert!(highlights[0].is_over_limit);

    // The December trip's own rolling year only sees itself.
    assert_eq!(highlights[1].trip.id, "dec");
    assert_eq!(highlights[1].ref_date, date("2026-12-20"));
    assert_eq!(highlights[1].days_in_year, 12);
    assert!(!highlights[1].is_over_limit);
}

#[test]
fn trip_crossing_anchor_is_clipped_at_anchor() {
    // Dec 20 2025 - Jan 5 2026 only counts Dec 20 .. Jan 1 (13 days) toward
    // the rolling year ending 2026-01-01.
    let trips = vec![
        trip("jan", &["m1"], "2025-01-01", "2025-01-10"),
        trip("dec", &["m1"], "2025-12-20", "2026-01-05"),
    ];
    let stats = compute_stats(&[member("m1")], &trips, 180, date("2025-06-01"));
    let highlights = &stats[0].highlight_trips;

    assert_eq!(highlights[0].days_in_year, 10 + 13);
    assert_eq!(highlights[1].days_in_year, 17);
}

#[test]
fn trips_entering_after_anchor_are_ignored() {
    let trips = vec![
        trip("a", &["m1"], "2025-01-01", "2025-01-10"),
        trip("b", &["m1"], "2026-01-02", "2026-01-20"),
    ];
    let stats = compute_stats(&[member("m1")], &trips, 180, date("2025-06-01"));

    assert_eq!(stats[0].highlight_trips[0].days_in_year, 10);
}

#[test]
fn trip_entering_exactly_on_anchor_counts_one_day() {
    let trips = vec![
        trip("a", &["m1"], "2025-01-01", "2025-01-10"),
        trip("b", &["m1"], "2026-01-01", "2026-01-20"),
    ];
    let stats = compute_stats(&[member("m1")], &trips, 180, date("2025-06-01"));

    assert_eq!(stats[0].highlight_trips[0].days_in_year, 11);
}

#[test]
fn leap_day_anchor_lands_on_feb_28() {
    let trips = vec![trip("t1", &["m1"], "2024-02-29", "2024-03-02")];
    let stats = compute_stats(&[member("m1")], &trips, 180, date("2024-06-01"));

    assert_eq!(stats[0].highlight_trips[0].ref_date, date("2025-02-28"));
    assert_eq!(stats[0].highlight_trips[0].days_in_year, 3);
}

#[test]
fn over_limit_is_strictly_greater_than_limit() {
    // 2026-01-01 .. 2026-06-29 is exactly 180 days.
    let trips = vec![trip("t1", &["m1"], "2026-01-01", "2026-06-29")];

    let at_limit = compute_stats(&[member("m1")], &trips, 180, date("2026-02-01"));
    assert_eq!(at_limit[0].highlight_trips[0].days_in_year, 180);
    assert!(!at_limit[0].highlight_trips[0].is_over_limit);

    let below = compute_stats(&[member("m1")], &trips, 179, date("2026-02-01"));
    assert!(below[0].highlight_trips[0].is_over_limit);
}

// ── Presence and next trip ──────────────────────────────────────────────────

#[test]
fn presence_includes_both_endpoints() {
    let trips = vec![trip("t1", &["m1"], "2026-03-01", "2026-03-05")];
    let members = [member("m1")];

    for reference in ["2026-03-01", "2026-03-03", "2026-03-05"] {
        let stats = compute_stats(&members, &trips, 180, date(reference));
        assert_eq!(
            stats[0].current_status,
            PresenceStatus::Present,
            "should be present on {reference}"
        );
        assert_eq!(stats[0].current_trip.as_ref().unwrap().id, "t1");
    }

    let after = compute_stats(&members, &trips, 180, date("2026-03-06"));
    assert_eq!(after[0].current_status, PresenceStatus::Away);
    assert!(after[0].current_trip.is_none());
}

#[test]
fn next_trip_is_earliest_strictly_after_reference() {
    let trips = vec![
        trip("jan", &["m1"], "2026-01-01", "2026-01-05"),
        trip("may", &["m1"], "2026-05-01", "2026-05-03"),
        trip("apr", &["m1"], "2026-04-01", "2026-04-02"),
    ];
    let stats = compute_stats(&[member("m1")], &trips, 180, date("2026-03-01"));
    assert_eq!(stats[0].next_trip.as_ref().unwrap().id, "apr");

    // Entering today means present, not upcoming.
    let stats = compute_stats(&[member("m1")], &trips, 180, date("2026-04-01"));
    assert_eq!(stats[0].current_status, PresenceStatus::Present);
    assert_eq!(stats[0].next_trip.as_ref().unwrap().id, "may");
}

#[test]
fn highlight_trips_are_sorted_by_entry_date() {
    let trips = vec![
        trip("late", &["m1"], "2026-06-01", "2026-06-05"),
        trip("early", &["m1"], "2026-02-01", "2026-02-05"),
    ];
    let stats = compute_stats(&[member("m1")], &trips, 180, date("2026-03-01"));
    let ids: Vec<&str> = stats[0]
        .highlight_trips
        .iter()
        .map(|h| h.trip.id.as_str())
        .collect();
    assert_eq!(ids, vec!["early", "late"]);
}

#[test]
fn member_without_trips_is_away_with_no_results() {
    let stats = compute_stats(&[member("m1")], &[], 180, date("2026-03-01"));

    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].current_status, PresenceStatus::Away);
    assert!(stats[0].current_trip.is_none());
    assert!(stats[0].highlight_trips.is_empty());
    assert!(stats[0].next_trip.is_none());
    assert!(stats[0].active_warnings.is_empty());
}

#[test]
fn output_preserves_member_order() {
    let members = [member("b"), member("a"), member("c")];
    let stats = compute_stats(&members, &[], 180, date("2026-03-01"));
    let ids: Vec<&str> = stats.iter().map(|s| s.member_id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a", "c"]);
}

// ── Shared and malformed trips ──────────────────────────────────────────────

#[test]
fn shared_trip_counts_for_each_member_independently() {
    let trips = vec![
        trip("shared", &["m1", "m2"], "2026-03-01", "2026-03-10"),
        trip("solo", &["m1"], "2026-04-01", "2026-04-05"),
    ];
    let stats = compute_stats(&[member("m1"), member("m2")], &trips, 180, date("2026-03-05"));

    assert_eq!(stats[0].highlight_trips[0].days_in_year, 15);
    assert_eq!(stats[1].highlight_trips[0].days_in_year, 10);
    assert_eq!(stats[0].current_status, PresenceStatus::Present);
    assert_eq!(stats[1].current_status, PresenceStatus::Present);
}

#[test]
fn malformed_trip_is_skipped_without_affecting_others() {
    let trips = vec![
        trip("bad", &["m1", "m2"], "2026-13-45", "2026-03-10"),
        trip("good", &["m1"], "2026-03-01", "2026-03-10"),
        trip("other", &["m2"], "2026-03-02", "2026-03-03"),
    ];
    let stats = compute_stats(&[member("m1"), member("m2")], &trips, 180, date("2026-03-05"));

    assert_eq!(stats[0].highlight_trips.len(), 1);
    assert_eq!(stats[0].highlight_trips[0].trip.id, "good");
    assert_eq!(stats[0].highlight_trips[0].days_in_year, 10);

    assert_eq!(stats[1].highlight_trips.len(), 1);
    assert_eq!(stats[1].highlight_trips[0].days_in_year, 2);
    assert_eq!(stats[1].current_status, PresenceStatus::Away);
}

#[test]
fn degenerate_trip_contributes_nothing() {
    let trips = vec![trip("backwards", &["m1"], "2026-03-10", "2026-03-05")];
    let stats = compute_stats(&[member("m1")], &trips, 180, date("2026-03-07"));

    assert_eq!(stats[0].current_status, PresenceStatus::Away);
    assert_eq!(stats[0].highlight_trips.len(), 1);
    assert_eq!(stats[0].highlight_trips[0].days_in_year, 0);
}

#[test]
fn trips_for_unknown_members_are_ignored() {
    let trips = vec![trip("ghost", &["nobody"], "2026-03-01", "2026-03-10")];
    let stats = compute_stats(&[member("m1")], &trips, 180, date("2026-03-05"));

    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].current_status, PresenceStatus::Away);
    assert!(stats[0].highlight_trips.is_empty());
}

// ── Window predicate ────────────────────────────────────────────────────────

#[test]
fn either_predicate_admits_old_trips_overlapping_does_not() {
    let old = DateInterval::from_strs("2020-01-01", "2020-01-10").unwrap();
    let reference = date("2026-03-01");

    assert!(WindowPredicate::Either.admits(&old, reference));
    assert!(!WindowPredicate::Overlapping.admits(&old, reference));

    let near = DateInterval::from_strs("2025-06-01", "2025-06-10").unwrap();
    assert!(WindowPredicate::Overlapping.admits(&near, reference));

    let far_future = DateInterval::from_strs("2028-01-01", "2028-01-10").unwrap();
    assert!(WindowPredicate::Either.admits(&far_future, reference));
    assert!(!WindowPredicate::Overlapping.admits(&far_future, reference));
}

#[test]
fn default_window_highlights_historic_trips() {
    let trips = vec![
        trip("old", &["m1"], "2020-01-01", "2020-01-10"),
        trip("recent", &["m1"], "2026-02-01", "2026-02-05"),
    ];
    let members = [member("m1")];

    let default = compute_stats(&members, &trips, 180, date("2026-03-01"));
    assert_eq!(default[0].highlight_trips.len(), 2);

    let options = StatsOptions::new(180, date("2026-03-01")).with_window(WindowPredicate::Overlapping);
    let strict = compute_stats_with(&members, &trips, &options);
    assert_eq!(strict[0].highlight_trips.len(), 1);
    assert_eq!(strict[0].highlight_trips[0].trip.id, "recent");
}

// ── Warnings ────────────────────────────────────────────────────────────────

#[test]
fn flight_days_warning_fires_once_for_many_violations() {
    // 2026-03-04 and 2026-03-11 are Wednesdays; allowed are Monday and Friday.
    let members = [member_with_rules(
        "m1",
        vec![flight_days_rule(vec![1, 5], "Fly on Monday or Friday")],
    )];
    let trips = vec![
        trip("t1", &["m1"], "2026-03-04", "2026-03-06"),
        trip("t2", &["m1"], "2026-03-11", "2026-03-13"),
    ];
    let stats = compute_stats(&members, &trips, 180, date("2026-03-01"));

    assert_eq!(stats[0].active_warnings, vec!["Fly on Monday or Friday".to_string()]);
}

#[test]
fn flight_days_warning_silent_on_allowed_days() {
    // 2026-03-02 is a Monday, 2026-03-06 a Friday.
    let members = [member_with_rules(
        "m1",
        vec![flight_days_rule(vec![1, 5], "Fly on Monday or Friday")],
    )];
    let trips = vec![
        trip("t1", &["m1"], "2026-03-02", "2026-03-04"),
        trip("t2", &["m1"], "2026-03-06", "2026-03-08"),
    ];
    let stats = compute_stats(&members, &trips, 180, date("2026-03-01"));

    assert!(stats[0].active_warnings.is_empty());
}

#[test]
fn stay_limit_warning_fires_when_any_year_exceeds_limit() {
    let members = [member_with_rules("m1", vec![stay_limit_rule(180, "Too long")])];

    // 2026-01-01 .. 2026-07-19 is 200 days.
    let long = vec![trip("t1", &["m1"], "2026-01-01", "2026-07-19")];
    let stats = compute_stats(&members, &long, 180, date("2026-02-01"));
    assert_eq!(stats[0].highlight_trips[0].days_in_year, 200);
    assert_eq!(stats[0].active_warnings, vec!["Too long".to_string()]);

    let within = vec![trip("t1", &["m1"], "2026-01-01", "2026-06-29")];
    let stats = compute_stats(&members, &within, 180, date("2026-02-01"));
    assert!(stats[0].active_warnings.is_empty());
}

#[test]
fn disabled_rules_never_fire() {
    let mut rule = stay_limit_rule(1, "Too long");
    rule.enabled = false;
    let members = [member_with_rules("m1", vec![rule])];
    let trips = vec![trip("t1", &["m1"], "2026-01-01", "2026-01-10")];

    let stats = compute_stats(&members, &trips, 180, date("2026-01-05"));
    assert!(stats[0].active_warnings.is_empty());
}

#[test]
fn warnings_follow_rule_order() {
    let members = [member_with_rules(
        "m1",
        vec![
            stay_limit_rule(5, "Over five"),
            flight_days_rule(vec![0], "Sundays only"),
        ],
    )];
    let trips = vec![trip("t1", &["m1"], "2026-03-04", "2026-03-20")];
    let stats = compute_stats(&members, &trips, 180, date("2026-03-01"));

    assert_eq!(
        stats[0].active_warnings,
        vec!["Over five".to_string(), "Sundays only".to_string()]
    );
}

#[test]
fn global_warning_switch_suppresses_warnings() {
    let mut state = PlannerState {
        members: vec![member_with_rules("m1", vec![stay_limit_rule(1, "Too long")])],
        trips: vec![trip("t1", &["m1"], "2026-01-01", "2026-01-10")],
        ..PlannerState::default()
    };

    let on = compute_state_stats(&state, date("2026-01-05"), WindowPredicate::Either);
    assert_eq!(on[0].active_warnings.len(), 1);

    state.global_settings.warnings.enabled = false;
    let off = compute_state_stats(&state, date("2026-01-05"), WindowPredicate::Either);
    assert!(off[0].active_warnings.is_empty());
}

#[test]
fn state_stats_use_configured_year_limit() {
    let mut state = PlannerState {
        members: vec![member("m1")],
        trips: vec![trip("t1", &["m1"], "2026-01-01", "2026-01-10")],
        ..PlannerState::default()
    };
    state.global_settings.year_limit = 9;

    let stats = compute_state_stats(&state, date("2026-01-05"), WindowPredicate::Either);
    assert!(stats[0].highlight_trips[0].is_over_limit);
}

#[test]
fn state_stats_apply_requested_window() {
    let state = PlannerState {
        members: vec![member("m1")],
        trips: vec![trip("t1", &["m1"], "2026-01-01", "2026-01-10")],
        ..PlannerState::default()
    };

    let loose = compute_state_stats(&state, date("2028-06-01"), WindowPredicate::Either);
    assert_eq!(loose[0].highlight_trips.len(), 1);

    let strict = compute_state_stats(&state, date("2028-06-01"), WindowPredicate::Overlapping);
    assert!(strict[0].highlight_trips.is_empty());
}

// ── Purity ──────────────────────────────────────────────────────────────────

#[test]
fn repeated_calls_are_identical_and_leave_inputs_untouched() {
    let members = vec![member_with_rules("m1", vec![stay_limit_rule(3, "Too long")])];
    let trips = vec![
        trip("b", &["m1"], "2026-05-01", "2026-05-04"),
        trip("a", &["m1"], "2026-03-01", "2026-03-05"),
    ];
    let members_before = members.clone();
    let trips_before = trips.clone();

    let first = compute_stats(&members, &trips, 180, date("2026-03-03"));
    let second = compute_stats(&members, &trips, 180, date("2026-03-03"));

    assert_eq!(first, second);
    assert_eq!(members, members_before);
    assert_eq!(trips, trips_before);
}

// ── Serialization ───────────────────────────────────────────────────────────

#[test]
fn member_stats_serialize_with_wire_names() {
    let trips = vec![trip("t1", &["m1"], "2026-03-01", "2026-03-05")];
    let stats = compute_stats(&[member("m1")], &trips, 180, date("2026-03-02"));
    let json = serde_json::to_value(&stats[0]).unwrap();

    assert_eq!(json["memberId"], "m1");
    assert_eq!(json["currentStatus"], "present");
    assert_eq!(json["currentTrip"]["memberIds"][0], "m1");
    assert_eq!(json["highlightTrips"][0]["refDate"], "2027-03-01");
    assert_eq!(json["highlightTrips"][0]["daysInYear"], 5);
    assert_eq!(json["highlightTrips"][0]["isOverLimit"], false);
    assert!(json.get("nextTrip").is_none());
}

// ── Dashboard helpers ───────────────────────────────────────────────────────

#[test]
fn stay_duration_counts_trailing_year_only() {
    let trips = vec![
        trip("old", &["m1"], "2025-02-20", "2025-03-05"),
        trip("now", &["m1"], "2026-02-25", "2026-03-10"),
        trip("other", &["m2"], "2025-06-01", "2025-06-30"),
    ];
    // Window 2025-03-01 ..= 2026-03-01: Mar 1-5 (5) + Feb 25 - Mar 1 (5).
    assert_eq!(stay_duration(&trips, "m1", date("2026-03-01")), 10);
    assert_eq!(stay_duration(&trips, "m2", date("2026-03-01")), 30);
    assert_eq!(stay_duration(&trips, "nobody", date("2026-03-01")), 0);
}

#[test]
fn trips_in_range_uses_inclusive_two_year_window() {
    let trips = vec![
        trip("too-early", &["m1"], "2025-02-28", "2025-03-02"),
        trip("last-year", &["m1"], "2025-03-01", "2025-03-02"),
        trip("next-year", &["m1"], "2027-03-01", "2027-03-02"),
        trip("too-late", &["m1"], "2027-03-02", "2027-03-03"),
    ];
    let ids: Vec<&str> = trips_in_range(&trips, "m1", date("2026-03-01"))
        .iter()
        .map(|t| t.id.as_str())
        .collect();
    assert_eq!(ids, vec!["last-year", "next-year"]);
}

#[test]
fn past_click_moves_reference_forward_one_year() {
    let today = date("2026-03-01");
    assert_eq!(rolling_reference_for(date("2026-01-10"), today), date("2027-01-10"));
    assert_eq!(rolling_reference_for(date("2026-04-01"), today), date("2026-04-01"));
    assert_eq!(rolling_reference_for(today, today), today);
}
