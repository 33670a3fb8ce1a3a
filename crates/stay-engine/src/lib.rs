//! # stay-engine
//!
//! Rolling-year day accounting for family travel planning.
//!
//! Given family members, their trips, and per-member warning rules, the engine
//! derives who is present on a reference date, how many days each member has
//! accrued in the rolling year starting at each nearby trip, which configured
//! warnings fire, and which date ranges have nobody present at all.
//!
//! The engines are pure functions over a [`PlannerState`] snapshot. State
//! transitions, persistence, and export live in their own modules and never
//! feed back into the computation.
//!
//! ## Modules
//!
//! - [`interval`] — Inclusive calendar-date intervals and year arithmetic
//! - [`rolling`] — Per-member presence, highlighted trips, and rolling-year day counts
//! - [`warnings`] — Flight-day and stay-limit rule evaluation
//! - [`empty`] — Date ranges with no member present
//! - [`model`] — Members, trips, rules, and the planner snapshot
//! - [`store`] — Reducer-style state transitions and listeners
//! - [`persistence`] — Snapshot storage and legacy migration
//! - [`export`] — CSV export of trips
//! - [`error`] — Error types

pub mod empty;
pub mod error;
pub mod export;
pub mod interval;
pub mod model;
pub mod persistence;
pub mod rolling;
pub mod store;
pub mod warnings;

pub use empty::{compute_empty_periods, EmptyPeriod};
pub use error::PlannerError;
pub use interval::{parse_date, DateInterval};
pub use model::{FamilyMember, GlobalSettings, PlannerState, Trip, WarningKind, WarningRule};
pub use rolling::{
    compute_state_stats, compute_stats, compute_stats_with, HighlightTrip, MemberStats,
    PresenceStatus, StatsOptions, WindowPredicate,
};
pub use store::{reduce, Action, PlannerStore};
