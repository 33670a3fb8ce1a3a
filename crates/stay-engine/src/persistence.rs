//! Load and save planner snapshots, including the legacy trip migration.
//!
//! Snapshots are stored as one JSON document under [`STORAGE_KEY`]. Older
//! snapshots recorded a single `memberId` per trip; they are rewritten to the
//! `memberIds` list on load and the migrated form is persisted straight away.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{PlannerError, Result};
use crate::model::PlannerState;
use crate::store::StateListener;

/// Key under which the planner snapshot is stored.
pub const STORAGE_KEY: &str = "family-planner-data";

/// Key that keeps an unreadable snapshot before the planner starts over.
pub const BACKUP_KEY: &str = "family-planner-data-backup";

/// A string key-value store.
pub trait Storage {
    /// # Errors
    /// Returns an error if the backend cannot be read. A missing key is `Ok(None)`.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// # Errors
    /// Returns an error if the backend cannot be written.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory storage, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// # Errors
    /// Returns `PlannerError::Storage` for keys that would leave the directory.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.contains(['/', '\\']) {
            return Err(PlannerError::Storage(format!("invalid storage key: {key}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, value)?;
        Ok(())
    }
}

/// Rewrite legacy `memberId` trips into the `memberIds` shape.
///
/// Returns the (possibly) rewritten snapshot and whether anything changed.
/// Trips that already carry `memberIds` only lose the stale `memberId` field.
/// Numeric ids are kept as strings; a legacy trip whose `memberId` is neither
/// a string nor a number has no member left and is dropped.
pub fn migrate_snapshot(mut snapshot: Value) -> (Value, bool) {
    let mut migrated = false;

    let Some(trips) = snapshot.get_mut("trips").and_then(Value::as_array_mut) else {
        return (snapshot, false);
    };

    trips.retain_mut(|trip| {
        let Some(trip) = trip.as_object_mut() else {
            return true;
        };
        let Some(legacy) = trip.remove("memberId") else {
            return true;
        };
        migrated = true;
        if trip.contains_key("memberIds") {
            return true;
        }
        let member_id = match legacy {
            Value::String(id) => id,
            Value::Number(n) => n.to_string(),
            other => {
                warn!(
                    trip = ?trip.get("id"),
                    member_id = %other,
                    "dropping legacy trip without a member"
                );
                return false;
            }
        };
        trip.insert(
            "memberIds".to_string(),
            Value::Array(vec![Value::String(member_id)]),
        );
        true
    });

    (snapshot, migrated)
}

/// Parse a snapshot, applying the legacy migration first.
///
/// # Errors
/// Returns `PlannerError::Json` if the text is not a valid snapshot.
pub fn parse_snapshot(json: &str) -> Result<PlannerState> {
    let raw: Value = serde_json::from_str(json)?;
    let (migrated, _) = migrate_snapshot(raw);
    Ok(serde_json::from_value(migrated)?)
}

/// Serialize a snapshot in its persisted form.
///
/// # Errors
/// Returns `PlannerError::Json` if serialization fails.
pub fn to_snapshot(state: &PlannerState) -> Result<String> {
    Ok(serde_json::to_string(state)?)
}

/// Load the planner state from `storage`.
///
/// A missing snapshot yields the default state, as does a corrupt one (with a
/// warning). A corrupt snapshot is first copied to [`BACKUP_KEY`] so the next
/// save cannot destroy it. A snapshot that needed migration is written back in
/// its new form.
///
/// # Errors
/// Returns storage errors from reading or writing back the migrated snapshot.
pub fn load_state(storage: &mut dyn Storage) -> Result<PlannerState> {
    let Some(text) = storage.read(STORAGE_KEY)? else {
        debug!("no stored snapshot, starting from defaults");
        return Ok(PlannerState::default());
    };

    let raw: Value = match serde_json::from_str(&text) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "stored snapshot is not valid JSON, starting from defaults");
            return start_over(storage, &text);
        }
    };

    let (raw, migrated) = migrate_snapshot(raw);
    let state: PlannerState = match serde_json::from_value(raw) {
        Ok(state) => state,
        Err(e) => {
            warn!(error = %e, "stored snapshot has an unexpected shape, starting from defaults");
            return start_over(storage, &text);
        }
    };

    if migrated {
        debug!(trips = state.trips.len(), "migrated legacy memberId trips");
        save_state(storage, &state)?;
    }

    Ok(state)
}

fn start_over(storage: &mut dyn Storage, text: &str) -> Result<PlannerState> {
    storage.write(BACKUP_KEY, text)?;
    info!(key = BACKUP_KEY, "kept unreadable snapshot");
    Ok(PlannerState::default())
}

/// Persist `state` under [`STORAGE_KEY`].
///
/// # Errors
/// Returns serialization or storage errors.
pub fn save_state(storage: &mut dyn Storage, state: &PlannerState) -> Result<()> {
    storage.write(STORAGE_KEY, &to_snapshot(state)?)
}

/// A [`StateListener`] that saves every new state to its storage.
pub struct PersistListener<S: Storage> {
    storage: S,
}

impl<S: Storage> PersistListener<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }
}

impl<S: Storage> StateListener for PersistListener<S> {
    fn on_change(&mut self, state: &PlannerState) -> Result<()> {
        save_state(&mut self.storage, state)
    }
}
