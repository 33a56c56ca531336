//! Rule engine for multi-criteria dispatching.
//!
//! Applies rules in sequence: the next rule is consulted only when all
//! previous rules tie. The sort is stable, so jobs that tie on every rule
//! keep their input order unless a final tie-breaker says otherwise.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::sync::Arc;

use super::{DispatchContext, DispatchingRule};
use crate::models::Job;

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreaker {
    /// Keep input order (stable sort).
    #[default]
    NextRule,
    /// Deterministic by job ID (lexicographic).
    ById,
}

/// A composable rule engine for job ordering.
///
/// # Example
/// ```
/// use prod_schedule::dispatching::RuleEngine;
/// use prod_schedule::dispatching::rules;
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::Edd)
///     .with_rule(rules::Spt);
/// assert_eq!(engine.rule_names(), vec!["EDD", "SPT"]);
/// ```
#[derive(Clone, Default)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn DispatchingRule>>,
    tie_breaker: TieBreaker,
}

impl RuleEngine {
    /// Creates an empty rule engine (keeps input order).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule; earlier rules take precedence.
    pub fn with_rule<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Names of the configured rules, in precedence order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Sorts jobs by priority (dispatched first = index 0).
    ///
    /// Returns indices into the original job slice.
    pub fn sort_indices(&self, jobs: &[Job], context: &DispatchContext) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..jobs.len()).collect();
        indices.sort_by(|&a, &b| self.compare(&jobs[a], &jobs[b], context));
        indices
    }

    /// Returns the index of the job that would be dispatched first.
    pub fn select_best(&self, jobs: &[Job], context: &DispatchContext) -> Option<usize> {
        self.sort_indices(jobs, context).first().copied()
    }

    fn compare(&self, a: &Job, b: &Job, context: &DispatchContext) -> Ordering {
        for rule in &self.rules {
            match rule.compare(a, b, context) {
                Ordering::Equal => continue,
                decided => return decided,
            }
        }

        match self.tie_breaker {
            TieBreaker::NextRule => Ordering::Equal,
            TieBreaker::ById => a.id.cmp(&b.id),
        }
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_names())
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}
