//! CSV export of trips, one row per traveling member.

use crate::error::{PlannerError, Result};
use crate::model::PlannerState;

const HEADER: [&str; 4] = ["Member", "Entry Date", "Departure Date", "Notes"];

/// Render all trips as CSV.
///
/// Rows follow trip order, then each trip's `memberIds` order. Ids with no
/// matching member are skipped.
///
/// # Errors
/// Returns `PlannerError::Csv` if a row cannot be written.
pub fn trips_to_csv(state: &PlannerState) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for trip in &state.trips {
        for member in trip.member_ids.iter().filter_map(|id| state.member(id)) {
            writer.write_record([
                member.name.as_str(),
                trip.entry_date.as_str(),
                trip.departure_date.as_str(),
                trip.notes.as_deref().unwrap_or(""),
            ])?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| PlannerError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| PlannerError::Export(e.to_string()))
}
