//! Error types for schedule generation.
//!
//! Only conditions that abort a call live here. Non-fatal problems
//! (a job with no compatible equipment, a material shortage) are
//! logged through `tracing` and the call continues.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that abort a schedule generation call.
#[derive(Error, Debug)]
pub enum SchedulingError {
    /// No job remains after filtering to schedulable statuses.
    #[error("no schedulable jobs: no job is scheduled or ready")]
    NoEligibleJobs,

    /// No equipment remains after removing offline equipment.
    #[error("no eligible equipment: every equipment unit is offline")]
    NoEligibleEquipment,

    /// Structural problems in the input snapshot.
    #[error("invalid input: {}", summarize(.0))]
    InvalidInput(Vec<ValidationError>),

    /// Configuration outside the accepted range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The caller cancelled the search before it produced an answer.
    #[error("schedule generation cancelled")]
    Cancelled,
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SchedulingError>;
