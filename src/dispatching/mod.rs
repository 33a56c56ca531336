//! Dispatching rules and rule engine for job ordering.
//!
//! Provides the priority dispatching rules used by the greedy strategies
//! (FIFO, SPT, EDD, CR) and a composable rule engine for ordering jobs
//! with tie-breakers.
//!
//! # Usage
//!
//! ```
//! use prod_schedule::dispatching::{DispatchContext, RuleEngine};
//! use prod_schedule::dispatching::rules;
//! use prod_schedule::models::Job;
//! use chrono::NaiveDate;
//!
//! let now = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap().and_hms_opt(6, 0, 0).unwrap();
//! let jobs = vec![
//!     Job::new("long", "WO-1").with_work(30, 60.0),
//!     Job::new("short", "WO-2").with_work(5, 60.0),
//!     Job::new("due", "WO-3").with_work(40, 60.0).with_due_time(now),
//! ];
//! let engine = RuleEngine::new()
//!     .with_rule(rules::Edd)
//!     .with_rule(rules::Spt);
//! let order = engine.sort_indices(&jobs, &DispatchContext::at(now));
//! assert_eq!(order, vec![2, 1, 0]);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod context;
mod engine;
pub mod rules;

pub use context::DispatchContext;
pub use engine::{RuleEngine, TieBreaker};

use std::cmp::Ordering;
use std::fmt::Debug;

use crate::models::Job;

/// Score returned by numeric dispatching rules.
///
/// Lower scores = higher priority (dispatched first).
pub type RuleScore = f64;

/// A dispatching rule that orders jobs.
///
/// # Ordering Convention
/// `Ordering::Less` means `a` is dispatched before `b`.
/// Rules must be total orders so that sorting is deterministic.
///
/// # Reference
/// Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "SPT", "EDD").
    fn name(&self) -> &'static str;

    /// Compares two jobs under the current context.
    fn compare(&self, a: &Job, b: &Job, context: &DispatchContext) -> Ordering;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Orders two numeric scores ascending, treating NaN as equal.
#[inline]
pub(crate) fn by_score(a: RuleScore, b: RuleScore) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
