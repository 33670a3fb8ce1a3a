//! WASM bindings for stay-engine.
//!
//! Exposes member statistics, empty-period detection, and snapshot migration
//! to the browser UI via `wasm-bindgen`. Snapshots and results cross the
//! boundary as JSON strings in the same camelCase shape the UI persists, and
//! dates are `yyyy-MM-dd` strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p stay-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/src/wasm/ \
//!   target/wasm32-unknown-unknown/release/stay_engine_wasm.wasm
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use stay_engine::rolling::{self, WindowPredicate};
use stay_engine::{compute_empty_periods, persistence, PlannerState};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Helpers: parse inputs and serialize outputs as JSON
// ---------------------------------------------------------------------------

fn parse_date(s: &str) -> Result<NaiveDate, JsValue> {
    stay_engine::parse_date(s).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Parse a planner snapshot, migrating legacy `memberId` trips.
fn parse_state(json: &str) -> Result<PlannerState, JsValue> {
    persistence::parse_snapshot(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid planner state: {}", e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Compute per-member statistics for a planner snapshot.
///
/// Returns a JSON array of `MemberStats` objects, one per member in snapshot
/// order. The snapshot's `yearLimit` and global warning switch apply.
///
/// # Arguments
/// - `state_json` -- the planner snapshot
/// - `reference_date` -- the "today" anchor, `yyyy-MM-dd`
/// - `strict_window` -- only highlight trips overlapping the year around the reference date
#[wasm_bindgen(js_name = "computeMemberStats")]
pub fn compute_member_stats(
    state_json: &str,
    reference_date: &str,
    strict_window: bool,
) -> Result<String, JsValue> {
    let state = parse_state(state_json)?;
    let reference = parse_date(reference_date)?;

    let window = if strict_window {
        WindowPredicate::Overlapping
    } else {
        WindowPredicate::Either
    };
    to_json(&rolling::compute_state_stats(&state, reference, window))
}

/// Find date ranges with no member present.
///
/// Returns a JSON array of `{startDate, endDate, duration}` objects in
/// chronological order. `today` is passed in because the browser's clock, not
/// the module's, defines the scan start.
#[wasm_bindgen(js_name = "computeEmptyPeriods")]
pub fn empty_periods(state_json: &str, today: &str) -> Result<String, JsValue> {
    let state = parse_state(state_json)?;
    let today = parse_date(today)?;

    to_json(&compute_empty_periods(&state.trips, &state.members, today))
}

/// Days a member spent in the year ending on `reference_date`.
#[wasm_bindgen(js_name = "stayDuration")]
pub fn stay_duration(
    state_json: &str,
    member_id: &str,
    reference_date: &str,
) -> Result<f64, JsValue> {
    let state = parse_state(state_json)?;
    let reference = parse_date(reference_date)?;

    // Day counts stay far below 2^53.
    Ok(rolling::stay_duration(&state.trips, member_id, reference) as f64)
}

/// Reference date to use after the user clicks `clicked` on the calendar.
#[wasm_bindgen(js_name = "rollingReferenceFor")]
pub fn rolling_reference_for(clicked: &str, today: &str) -> Result<String, JsValue> {
    let clicked = parse_date(clicked)?;
    let today = parse_date(today)?;

    Ok(stay_engine::interval::format_date(rolling::rolling_reference_for(
        clicked, today,
    )))
}

/// Rewrite a stored snapshot in the current shape (`memberIds` lists).
#[wasm_bindgen(js_name = "migrateSnapshot")]
pub fn migrate_snapshot(state_json: &str) -> Result<String, JsValue> {
    let state = parse_state(state_json)?;
    to_json(&state)
}
