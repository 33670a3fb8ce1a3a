//! Error types for stay-engine operations.
//!
//! The engines themselves never fail on bad data; these errors come from
//! parsing, state transitions, and the persistence/export collaborators.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Invalid date '{0}': expected yyyy-MM-dd")]
    InvalidDate(String),

    #[error("Trip must have at least one member")]
    EmptyTrip,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Export error: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
