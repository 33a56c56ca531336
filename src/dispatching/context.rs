//! Dispatching context for rule evaluation.

use chrono::NaiveDateTime;

/// Runtime state passed to dispatching rules.
///
/// `now` is the reference instant for time-remaining calculations
/// (critical ratio). The scheduler sets it to the shift start unless the
/// caller supplies one, keeping dispatch deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchContext {
    /// Reference instant.
    pub now: NaiveDateTime,
}

impl DispatchContext {
    /// Creates a context at the given instant.
    pub fn at(now: NaiveDateTime) -> Self {
        Self { now }
    }
}
