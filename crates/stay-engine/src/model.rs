//! Planner data model: members, trips, warning rules, and the global snapshot.
//!
//! Field names on the wire are camelCase so a snapshot written by the browser
//! UI deserializes unchanged. Trip dates stay as strings here; they are parsed
//! lazily by the engines so one malformed trip cannot poison a whole snapshot.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::interval::DateInterval;

/// Default rolling-year day limit when none is configured.
pub const DEFAULT_YEAR_LIMIT: i64 = 180;

/// A tracked family member and their personal warning rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub warnings: Vec<WarningRule>,
}

/// A stay shared by one or more members, with inclusive `yyyy-MM-dd` dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub member_ids: Vec<String>,
    pub entry_date: String,
    pub departure_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Trip {
    /// Whether `member_id` is one of this trip's travelers.
    pub fn includes(&self, member_id: &str) -> bool {
        self.member_ids.iter().any(|id| id == member_id)
    }

    /// Parse the trip's dates into an inclusive interval.
    ///
    /// # Errors
    /// Returns `PlannerError::InvalidDate` if either date is not `yyyy-MM-dd`.
    pub fn interval(&self) -> Result<DateInterval> {
        DateInterval::from_strs(&self.entry_date, &self.departure_date)
    }
}

/// The kind of check a [`WarningRule`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// Entry dates must fall on one of the allowed weekdays.
    FlightDays,
    /// No rolling year may exceed the rule's day limit.
    StayLimit,
    /// Reserved; never triggers.
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningCriteria {
    /// Allowed weekday indices, 0 = Sunday.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningRule {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub criteria: WarningCriteria,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningSettings {
    pub enabled: bool,
    /// Not read by the engines; member rules live on each [`FamilyMember`].
    #[serde(default)]
    pub rules: Vec<WarningRule>,
}

impl Default for WarningSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            rules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    #[serde(default)]
    pub warnings: WarningSettings,
    #[serde(default = "default_year_limit")]
    pub year_limit: i64,
}

fn default_year_limit() -> i64 {
    DEFAULT_YEAR_LIMIT
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            warnings: WarningSettings::default(),
            year_limit: DEFAULT_YEAR_LIMIT,
        }
    }
}

/// The whole application state, persisted as one JSON blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerState {
    #[serde(default)]
    pub members: Vec<FamilyMember>,
    #[serde(default)]
    pub trips: Vec<Trip>,
    #[serde(default)]
    pub global_settings: GlobalSettings,
}

impl PlannerState {
    pub fn member(&self, id: &str) -> Option<&FamilyMember> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn trip(&self, id: &str) -> Option<&Trip> {
        self.trips.iter().find(|t| t.id == id)
    }
}
