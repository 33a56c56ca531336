//! Simulated annealing over job permutations.
//!
//! # Algorithm
//!
//! Starts from the FIFO order. Each temperature step runs
//! `iterations_per_temperature` moves; a move swaps two random positions
//! and is re-materialized by the allocation engine. With energy
//! `E = -fitness`, a move is accepted when `dE < 0`, otherwise with
//! probability `exp(-dE / T)`. The temperature starts at
//! `initial_temperature` and is multiplied by `cooling_rate` after each
//! step until it drops below `min_temperature`. The best state ever
//! visited is returned.
//!
//! # Reference
//! Kirkpatrick et al. (1983), "Optimization by Simulated Annealing"

use rand::Rng;
use tracing::info;

use crate::cancel::CancelToken;
use crate::config::SaConfig;
use crate::dispatching::{rules, DispatchContext, RuleEngine};
use crate::error::Result;
use crate::ga::operators::swap_mutation;
use crate::models::Algorithm;
use crate::scheduler::{Plan, Problem, Strategy};

/// Result of an annealing run.
#[derive(Debug, Clone)]
pub struct SaOutcome {
    /// Best permutation found.
    pub best_order: Vec<usize>,
    /// Its energy (negated fitness, lower is better).
    pub best_energy: f64,
    /// Temperature steps completed.
    pub temperature_steps: usize,
    /// Accepted moves.
    pub accepted: usize,
    /// Whether the run stopped on cancellation.
    pub cancelled: bool,
}

/// Simulated annealing over job permutations.
#[derive(Debug, Clone, Default)]
pub struct SimulatedAnnealing {
    config: SaConfig,
}

impl SimulatedAnnealing {
    /// Creates an annealer with the given schedule.
    pub fn new(config: SaConfig) -> Self {
        Self { config }
    }

    /// The annealing parameters.
    pub fn config(&self) -> &SaConfig {
        &self.config
    }

    /// Anneals job orders for `problem`.
    pub fn run<R: Rng>(&self, problem: &Problem, rng: &mut R, cancel: &CancelToken) -> SaOutcome {
        let cfg = &self.config;
        let energy = |order: &[usize]| -problem.fitness(&problem.materialize(order));

        let context = DispatchContext::at(problem.now());
        let mut current = RuleEngine::new()
            .with_rule(rules::Fifo)
            .sort_indices(problem.jobs(), &context);
        let mut current_energy = energy(&current);
        let mut best_order = current.clone();
        let mut best_energy = current_energy;

        let mut temperature = cfg.initial_temperature;
        let mut steps = 0;
        let mut accepted = 0;
        let mut cancelled = false;

        while temperature >= cfg.min_temperature {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            for _ in 0..cfg.iterations_per_temperature {
                let mut neighbor = current.clone();
                swap_mutation(&mut neighbor, rng);
                let neighbor_energy = energy(&neighbor);
                let delta = neighbor_energy - current_energy;

                if delta < 0.0 || rng.random::<f64>() < (-delta / temperature).exp() {
                    current = neighbor;
                    current_energy = neighbor_energy;
                    accepted += 1;

                    if current_energy < best_energy {
                        best_energy = current_energy;
                        best_order.clone_from(&current);
                    }
                }
            }

            temperature *= cfg.cooling_rate;
            steps += 1;
        }

        if cancelled {
            info!(steps, best_energy, "simulated annealing cancelled, returning best so far");
        } else {
            info!(steps, accepted, best_energy, "simulated annealing finished");
        }

        SaOutcome {
            best_order,
            best_energy,
            temperature_steps: steps,
            accepted,
            cancelled,
        }
    }
}

impl Strategy for SimulatedAnnealing {
    fn algorithm(&self) -> Algorithm {
        Algorithm::SimulatedAnnealing
    }

    fn plan<R: Rng>(&self, problem: &Problem, rng: &mut R, cancel: &CancelToken) -> Result<Plan> {
        let outcome = self.run(problem, rng, cancel);
        Ok(problem.materialize(&outcome.best_order))
    }
}
