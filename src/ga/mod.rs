//! Permutation genetic algorithm.
//!
//! # Encoding
//!
//! An individual is a permutation of job indices. It is decoded by running
//! the sequential allocation engine over the permutation, so every
//! individual is a feasible schedule.
//!
//! # Algorithm
//!
//! 1. Random initial population (default 50).
//! 2. Each generation: tournament selection (size 3, with replacement),
//!    order crossover on consecutive parent pairs with probability
//!    `crossover_rate`, swap mutation per child with probability
//!    `mutation_rate`.
//! 3. Stop after `max_generations`, when the best fitness exceeds
//!    `convergence_threshold`, or when cancelled.
//! 4. Return the best individual ever seen.
//!
//! Fitness is [`plan_fitness`](crate::scheduler::score::plan_fitness).
//!
//! # Submodules
//!
//! - [`operators`]: selection, crossover and mutation
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization, and Machine Learning"
//! - Cheng et al. (1996), "A Tutorial Survey of JSSP using GA"

pub mod operators;
mod population;

pub use population::Population;

use rand::Rng;
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::config::GaConfig;
use crate::error::Result;
use crate::models::Algorithm;
use crate::scheduler::{Plan, Problem, Strategy};
use operators::{order_crossover, swap_mutation, tournament_select};

/// Result of a GA run.
#[derive(Debug, Clone)]
pub struct GaOutcome {
    /// Best permutation found.
    pub best_order: Vec<usize>,
    /// Its fitness.
    pub best_fitness: f64,
    /// Generations completed.
    pub generations: usize,
    /// Whether the run stopped on cancellation.
    pub cancelled: bool,
}

/// Genetic algorithm over job permutations.
#[derive(Debug, Clone, Default)]
pub struct GeneticAlgorithm {
    config: GaConfig,
}

impl GeneticAlgorithm {
    /// Creates a GA with the given parameters.
    pub fn new(config: GaConfig) -> Self {
        Self { config }
    }

    /// The GA parameters.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Evolves job orders for `problem`.
    pub fn run<R: Rng>(&self, problem: &Problem, rng: &mut R, cancel: &CancelToken) -> GaOutcome {
        let cfg = &self.config;
        let n = problem.job_count();
        let size = cfg.population_size;
        let evaluate = |order: &[usize]| problem.fitness(&problem.materialize(order));

        let mut population = Population::random(size, n, rng, &evaluate);
        let (mut best_order, mut best_fitness) = match population.best() {
            Some(b) => (population.individual(b).to_vec(), population.fitness(b)),
            None => {
                let order: Vec<usize> = (0..n).collect();
                let fitness = evaluate(&order);
                (order, fitness)
            }
        };

        let mut next = Population::with_capacity(size, n);
        let mut parents: Vec<usize> = Vec::with_capacity(size);
        let mut generations = 0;
        let mut cancelled = false;

        while generations < cfg.max_generations && !population.is_empty() {
            if cfg.convergence_threshold.is_some_and(|t| best_fitness > t) {
                debug!(generations, best_fitness, "converged");
                break;
            }
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            parents.clear();
            for _ in 0..size {
                parents.push(tournament_select(&population, cfg.tournament_size, rng));
            }

            next.clear();
            for pair in parents.chunks(2) {
                let p1 = population.individual(pair[0]);
                let p2 = population.individual(pair.get(1).copied().unwrap_or(pair[0]));

                let (mut c1, mut c2) = if rng.random_bool(cfg.crossover_rate) {
                    order_crossover(p1, p2, rng)
                } else {
                    (p1.to_vec(), p2.to_vec())
                };
                for child in [&mut c1, &mut c2] {
                    if rng.random_bool(cfg.mutation_rate) {
                        swap_mutation(child, rng);
                    }
                }
                for child in [c1, c2] {
                    if next.size() < size {
                        let fitness = evaluate(&child);
                        next.push(&child, fitness);
                    }
                }
            }

            std::mem::swap(&mut population, &mut next);
            generations += 1;

            if let Some(b) = population.best() {
                if population.fitness(b) > best_fitness {
                    best_fitness = population.fitness(b);
                    best_order = population.individual(b).to_vec();
                }
            }
        }

        if cancelled {
            info!(generations, best_fitness, "genetic algorithm cancelled, returning best so far");
        } else {
            info!(generations, best_fitness, "genetic algorithm finished");
        }

        GaOutcome {
            best_order,
            best_fitness,
            generations,
            cancelled,
        }
    }
}

impl Strategy for GeneticAlgorithm {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Genetic
    }

    fn plan<R: Rng>(&self, problem: &Problem, rng: &mut R, cancel: &CancelToken) -> Result<Plan> {
        let outcome = self.run(problem, rng, cancel);
        Ok(problem.materialize(&outcome.best_order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Equipment, Job};
    use crate::scheduler::problem::tests::{day, problem, uniform_jobs};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// One machine; the FIFO order makes the short urgent job late.
    fn due_problem() -> Problem {
        let at = |h, m| day().and_hms_opt(h, m, 0).unwrap();
        let jobs = vec![
            Job::new("long", "WO-1").with_work(120, 60.0),
            Job::new("mid", "WO-2").with_work(60, 60.0).with_due_time(at(8, 0)),
            Job::new("urgent", "WO-3").with_work(15, 60.0).with_due_time(at(6, 30)),
        ];
        problem(jobs, vec![Equipment::new("M1")])
    }

    fn permutations3() -> Vec<Vec<usize>> {
        vec![
            vec![0, 1, 2],
            vec![0, 2, 1],
            vec![1, 0, 2],
            vec![1, 2, 0],
            vec![2, 0, 1],
            vec![2, 1, 0],
        ]
    }

    fn small_config() -> GaConfig {
        GaConfig::default()
            .with_population_size(20)
            .with_max_generations(30)
    }

    #[test]
    fn test_finds_best_permutation() {
        let p = due_problem();
        let optimum = permutations3()
            .iter()
            .map(|o| p.fitness(&p.materialize(o)))
            .fold(f64::NEG_INFINITY, f64::max);

        let mut rng = SmallRng::seed_from_u64(42);
        let outcome = GeneticAlgorithm::new(small_config()).run(&p, &mut rng, &CancelToken::new());
        assert!((outcome.best_fitness - optimum).abs() < 1e-9);
        assert_eq!(outcome.generations, 30);
        assert!(!outcome.cancelled);
    }

    #[test]
    fn test_beats_or_matches_fifo() {
        let p = due_problem();
        let fifo = p.fitness(&p.materialize(&[0, 1, 2]));
        let mut rng = SmallRng::seed_from_u64(7);
        let outcome = GeneticAlgorithm::new(small_config()).run(&p, &mut rng, &CancelToken::new());
        assert!(outcome.best_fitness >= fifo);
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let p = problem(uniform_jobs(8, 5), vec![Equipment::new("M1"), Equipment::new("M2")]);
        let ga = GeneticAlgorithm::new(small_config());

        let a = ga.run(&p, &mut SmallRng::seed_from_u64(9), &CancelToken::new());
        let b = ga.run(&p, &mut SmallRng::seed_from_u64(9), &CancelToken::new());
        assert_eq!(a.best_order, b.best_order);
        assert_eq!(a.best_fitness, b.best_fitness);
    }

    #[test]
    fn test_cancelled_returns_initial_best() {
        let p = due_problem();
        let cancel = CancelToken::new();
        cancel.cancel();

        let mut rng = SmallRng::seed_from_u64(42);
        let outcome = GeneticAlgorithm::default().run(&p, &mut rng, &cancel);
        assert!(outcome.cancelled);
        assert_eq!(outcome.generations, 0);

        let mut sorted = outcome.best_order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2]);
    }

    #[test]
    fn test_convergence_threshold_stops_early() {
        let p = due_problem();
        let config = small_config().with_convergence_threshold(f64::MIN);
        let mut rng = SmallRng::seed_from_u64(42);
        let outcome = GeneticAlgorithm::new(config).run(&p, &mut rng, &CancelToken::new());
        assert_eq!(outcome.generations, 0);
    }

    #[test]
    fn test_plan_places_every_job() {
        let p = problem(uniform_jobs(6, 10), vec![Equipment::new("M1"), Equipment::new("M2")]);
        let mut rng = SmallRng::seed_from_u64(1);
        let plan = GeneticAlgorithm::new(small_config())
            .plan(&p, &mut rng, &CancelToken::new())
            .unwrap();
        assert_eq!(plan.slots.len(), 6);
        assert!(plan.unscheduled.is_empty());
        for (i, a) in plan.slots.iter().enumerate() {
            for b in &plan.slots[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }
    }

    #[test]
    fn test_odd_population_size() {
        let p = due_problem();
        let config = GaConfig::default().with_population_size(5).with_max_generations(3);
        let mut rng = SmallRng::seed_from_u64(3);
        let outcome = GeneticAlgorithm::new(config).run(&p, &mut rng, &CancelToken::new());
        assert_eq!(outcome.generations, 3);
        assert_eq!(outcome.best_order.len(), 3);
    }
}
