//! Schedule scoring.
//!
//! Two measures live here:
//!
//! - [`plan_fitness`]: the objective GA and SA optimize, evaluated on a
//!   plan in ms coordinates.
//! - [`Scorer`]: the 0..100 optimization score attached to every finished
//!   schedule, whatever strategy produced it.
//!
//! # Score
//!
//! | Term | Definition |
//! |------|-----------|
//! | Utilization | mean allocation utilization (%) |
//! | Tardiness | sum of max(0, end - due) over placed jobs (min) |
//! | Makespan | latest end - earliest start (min) |
//! | Ideal makespan | sum of quantity x cycle time over placed jobs (min) |
//!
//! ```text
//! score = 100 - (100 - utilization) * 0.3
//!             - min(tardiness * 0.1, 30)
//!             + (ideal / makespan * 100 - 100) * 0.2
//! ```
//! clamped to [0, 100]. An empty schedule scores 0; a zero makespan drops
//! the efficiency term.

use std::collections::BTreeSet;

use super::allocator::Plan;
use super::problem::Problem;
use crate::config::{FitnessWeights, MakespanBaseline, ScoreConfig};
use crate::models::ProductionSchedule;

const MS_PER_MIN: f64 = 60_000.0;

/// Fitness of a plan: `-a*makespan - b*tardiness + c*utilization`.
///
/// Makespan and tardiness in minutes, utilization in percent.
/// Higher is better.
pub fn plan_fitness(problem: &Problem, plan: &Plan, weights: &FitnessWeights) -> f64 {
    let makespan = plan.makespan_ms() as f64 / MS_PER_MIN;

    let mut tardiness_ms: i64 = 0;
    let mut utilization_sum = 0.0;
    for slot in &plan.slots {
        if let Some(due) = problem.due_ms(slot.job) {
            tardiness_ms += (slot.end_ms - due).max(0);
        }
        utilization_sum += slot.utilization();
    }
    let tardiness = tardiness_ms as f64 / MS_PER_MIN;
    let utilization = if plan.slots.is_empty() {
        0.0
    } else {
        utilization_sum / plan.slots.len() as f64
    };

    -weights.makespan * makespan - weights.tardiness * tardiness + weights.utilization * utilization
}

/// The terms behind an optimization score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    /// Mean allocation utilization (%).
    pub utilization: f64,
    /// Total tardiness (minutes).
    pub tardiness_mins: f64,
    /// Makespan (minutes).
    pub makespan_mins: f64,
    /// Ideal makespan under the configured baseline (minutes).
    pub ideal_makespan_mins: f64,
    /// Final clamped score.
    pub score: f64,
}

/// Computes the optimization score of finished schedules.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scorer {
    baseline: MakespanBaseline,
}

impl Scorer {
    /// Creates a scorer from configuration.
    pub fn new(config: &ScoreConfig) -> Self {
        Self {
            baseline: config.makespan_baseline,
        }
    }

    /// Sets the ideal-makespan baseline.
    pub fn with_baseline(mut self, baseline: MakespanBaseline) -> Self {
        self.baseline = baseline;
        self
    }

    /// Score in [0, 100].
    pub fn score(&self, schedule: &ProductionSchedule) -> f64 {
        self.breakdown(schedule).score
    }

    /// Score with its individual terms.
    pub fn breakdown(&self, schedule: &ProductionSchedule) -> ScoreBreakdown {
        if schedule.allocations.is_empty() {
            return ScoreBreakdown {
                utilization: 0.0,
                tardiness_mins: 0.0,
                makespan_mins: 0.0,
                ideal_makespan_mins: 0.0,
                score: 0.0,
            };
        }

        let utilization = schedule
            .allocations
            .iter()
            .map(|a| a.utilization_percentage)
            .sum::<f64>()
            / schedule.allocations.len() as f64;
        let tardiness_mins: f64 = schedule.jobs.iter().map(|j| j.tardiness_mins()).sum();
        let makespan_mins = schedule.makespan_mins();

        let serial: f64 = schedule.jobs.iter().map(|j| j.processing_mins()).sum();
        let ideal_makespan_mins = match self.baseline {
            MakespanBaseline::Serial => serial,
            MakespanBaseline::PerEquipment => {
                let used: BTreeSet<&str> = schedule
                    .allocations
                    .iter()
                    .map(|a| a.equipment_id.as_str())
                    .collect();
                serial / used.len().max(1) as f64
            }
        };

        let mut score = 100.0 - (100.0 - utilization) * 0.3 - (tardiness_mins * 0.1).min(30.0);
        if makespan_mins > 0.0 {
            score += (ideal_makespan_mins / makespan_mins * 100.0 - 100.0) * 0.2;
        }

        ScoreBreakdown {
            utilization,
            tardiness_mins,
            makespan_mins,
            ideal_makespan_mins,
            score: score.clamp(0.0, 100.0),
        }
    }
}
