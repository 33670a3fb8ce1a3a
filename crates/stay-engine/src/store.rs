//! Reducer-style state transitions and a small store that owns the current
//! snapshot.
//!
//! [`reduce`] is pure: old state plus an [`Action`] gives a new state. Id
//! generation is injected through [`IdGenerator`], and side effects such as
//! persistence hang off the store as [`StateListener`]s.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlannerError, Result};
use crate::model::{FamilyMember, PlannerState, Trip, WarningRule, WarningSettings};

/// Source of fresh ids for new members and trips.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random v4 UUIDs.
#[cfg(feature = "random-ids")]
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

#[cfg(feature = "random-ids")]
impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Deterministic `prefix-1`, `prefix-2`, ... ids.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub warnings: Vec<WarningRule>,
}

/// Fields to overwrite on an existing member; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub warnings: Option<Vec<WarningRule>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    pub member_ids: Vec<String>,
    pub entry_date: String,
    pub departure_date: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Fields to overwrite on an existing trip. `notes: Some(None)` clears notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPatch {
    pub member_ids: Option<Vec<String>>,
    pub entry_date: Option<String>,
    pub departure_date: Option<String>,
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub warnings: Option<WarningSettings>,
    pub year_limit: Option<i64>,
}

/// A state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddMember(NewMember),
    UpdateMember { id: String, patch: MemberPatch },
    DeleteMember(String),
    AddTrip(NewTrip),
    UpdateTrip { id: String, patch: TripPatch },
    DeleteTrip(String),
    UpdateGlobalSettings(SettingsPatch),
    /// Replace the whole state, e.g. after a JSON import.
    Import(PlannerState),
}

/// Apply `action` to `state`, producing the next state.
///
/// Updating or deleting an unknown id leaves the state unchanged. Deleting a
/// member removes it from every trip and drops trips left without members.
///
/// # Errors
/// Returns `PlannerError::EmptyTrip` if a trip would end up with no members.
pub fn reduce(
    state: &PlannerState,
    action: Action,
    ids: &mut dyn IdGenerator,
) -> Result<PlannerState> {
    let mut next = state.clone();

    match action {
        Action::AddMember(new) => {
            next.members.push(FamilyMember {
                id: ids.next_id(),
                name: new.name,
                color: new.color,
                warnings: new.warnings,
            });
        }
        Action::UpdateMember { id, patch } => match next.members.iter_mut().find(|m| m.id == id) {
            Some(member) => {
                if let Some(name) = patch.name {
                    member.name = name;
                }
                if let Some(color) = patch.color {
                    member.color = color;
                }
                if let Some(warnings) = patch.warnings {
                    member.warnings = warnings;
                }
            }
            None => debug!(member_id = %id, "update for unknown member ignored"),
        },
        Action::DeleteMember(id) => {
            next.members.retain(|m| m.id != id);
            for trip in &mut next.trips {
                trip.member_ids.retain(|m| *m != id);
            }
            let before = next.trips.len();
            next.trips.retain(|t| !t.member_ids.is_empty());
            debug!(
                member_id = %id,
                dropped_trips = before - next.trips.len(),
                "member deleted"
            );
        }
        Action::AddTrip(new) => {
            if new.member_ids.is_empty() {
                return Err(PlannerError::EmptyTrip);
            }
            next.trips.push(Trip {
                id: ids.next_id(),
                member_ids: new.member_ids,
                entry_date: new.entry_date,
                departure_date: new.departure_date,
                notes: new.notes,
            });
        }
        Action::UpdateTrip { id, patch } => match next.trips.iter_mut().find(|t| t.id == id) {
            Some(trip) => {
                if let Some(member_ids) = patch.member_ids {
                    if member_ids.is_empty() {
                        return Err(PlannerError::EmptyTrip);
                    }
                    trip.member_ids = member_ids;
                }
                if let Some(entry_date) = patch.entry_date {
                    trip.entry_date = entry_date;
                }
                if let Some(departure_date) = patch.departure_date {
                    trip.departure_date = departure_date;
                }
                if let Some(notes) = patch.notes {
                    trip.notes = notes;
                }
            }
            None => debug!(trip_id = %id, "update for unknown trip ignored"),
        },
        Action::DeleteTrip(id) => {
            next.trips.retain(|t| t.id != id);
        }
        Action::UpdateGlobalSettings(patch) => {
            if let Some(warnings) = patch.warnings {
                next.global_settings.warnings = warnings;
            }
            if let Some(year_limit) = patch.year_limit {
                next.global_settings.year_limit = year_limit;
            }
        }
        Action::Import(imported) => {
            next = imported;
        }
    }

    Ok(next)
}

/// Observer notified after every state change.
pub trait StateListener {
    /// # Errors
    /// Implementations report their own failures, e.g. a storage write.
    fn on_change(&mut self, state: &PlannerState) -> Result<()>;
}

/// Owns the current [`PlannerState`] and applies actions to it.
pub struct PlannerStore<G: IdGenerator> {
    state: PlannerState,
    ids: G,
    listeners: Vec<Box<dyn StateListener>>,
}

impl<G: IdGenerator> PlannerStore<G> {
    pub fn new(state: PlannerState, ids: G) -> Self {
        Self {
            state,
            ids,
            listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    /// Register a listener; listeners run in registration order.
    pub fn subscribe(&mut self, listener: Box<dyn StateListener>) {
        self.listeners.push(listener);
    }

    /// Apply `action`, then notify listeners if the state changed.
    ///
    /// # Errors
    /// Returns the reducer's error with the state untouched, or the first
    /// listener error. A listener failure does not roll back the new state.
    pub fn dispatch(&mut self, action: Action) -> Result<&PlannerState> {
        let next = reduce(&self.state, action, &mut self.ids)?;
        if next != self.state {
            self.state = next;
            for listener in &mut self.listeners {
                listener.on_change(&self.state)?;
            }
        }
        Ok(&self.state)
    }
}
