//! Scheduler configuration.
//!
//! Every section deserializes with `#[serde(default)]`, so a partial
//! profile such as `{"ga": {"population_size": 80}}` keeps the defaults
//! for everything it does not name.
//!
//! # Defaults
//!
//! | Section | Parameter | Default |
//! |---------|-----------|---------|
//! | root | `buffer_time_mins` | 0 |
//! | fitness | makespan / tardiness / utilization | 0.3 / 0.4 / 0.3 |
//! | ga | population / generations | 50 / 100 |
//! | ga | crossover / mutation rate | 0.7 / 0.1 |
//! | ga | tournament size | 3 |
//! | sa | T0 / cooling / floor | 1000 / 0.95 / 0.1 |
//! | sa | iterations per temperature | 100 |
//! | csp | slot step | 30 min |

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};
use crate::validation::MAX_JOB_WORK_MINS;

/// Top-level scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Idle buffer appended to every greedy placement (minutes).
    pub buffer_time_mins: f64,
    /// Seed for the internal RNG. `None` = seeded from OS entropy.
    pub seed: Option<u64>,
    /// Weights of the shared GA/SA fitness function.
    pub fitness: FitnessWeights,
    /// Genetic algorithm parameters.
    pub ga: GaConfig,
    /// Simulated annealing parameters.
    pub sa: SaConfig,
    /// Backtracking solver parameters.
    pub csp: CspConfig,
    /// Optimization score parameters.
    pub score: ScoreConfig,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            buffer_time_mins: 0.0,
            seed: None,
            fitness: FitnessWeights::default(),
            ga: GaConfig::default(),
            sa: SaConfig::default(),
            csp: CspConfig::default(),
            score: ScoreConfig::default(),
        }
    }
}

impl SchedulerConfig {
    /// Sets the per-placement buffer.
    pub fn with_buffer_time(mut self, minutes: f64) -> Self {
        self.buffer_time_mins = minutes;
        self
    }

    /// Fixes the RNG seed for reproducible metaheuristic runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replaces the GA section.
    pub fn with_ga(mut self, ga: GaConfig) -> Self {
        self.ga = ga;
        self
    }

    /// Replaces the SA section.
    pub fn with_sa(mut self, sa: SaConfig) -> Self {
        self.sa = sa;
        self
    }

    /// Replaces the CSP section.
    pub fn with_csp(mut self, csp: CspConfig) -> Self {
        self.csp = csp;
        self
    }

    /// Replaces the score section.
    pub fn with_score(mut self, score: ScoreConfig) -> Self {
        self.score = score;
        self
    }

    /// Replaces the fitness weights.
    pub fn with_fitness(mut self, fitness: FitnessWeights) -> Self {
        self.fitness = fitness;
        self
    }

    /// Rejects values the algorithms cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !self.buffer_time_mins.is_finite() || self.buffer_time_mins < 0.0 {
            return invalid(format!(
                "buffer_time_mins must be a non-negative number, got {}",
                self.buffer_time_mins
            ));
        }
        if self.buffer_time_mins > MAX_JOB_WORK_MINS {
            return invalid(format!(
                "buffer_time_mins must be at most {MAX_JOB_WORK_MINS}, got {}",
                self.buffer_time_mins
            ));
        }
        self.ga.validate()?;
        self.sa.validate()?;
        self.csp.validate()
    }
}

/// Weights of `fitness = -a*makespan - b*tardiness + c*utilization`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    /// Penalty per minute of makespan.
    pub makespan: f64,
    /// Penalty per minute of total tardiness.
    pub tardiness: f64,
    /// Reward per percentage point of average utilization.
    pub utilization: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            makespan: 0.3,
            tardiness: 0.4,
            utilization: 0.3,
        }
    }
}

/// Genetic algorithm parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Generation limit.
    pub max_generations: usize,
    /// Probability that a selected pair is recombined.
    pub crossover_rate: f64,
    /// Probability that a child receives a swap mutation.
    pub mutation_rate: f64,
    /// Contestants per tournament.
    pub tournament_size: usize,
    /// Stop early once the best fitness exceeds this value.
    pub convergence_threshold: Option<f64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 100,
            crossover_rate: 0.7,
            mutation_rate: 0.1,
            tournament_size: 3,
            convergence_threshold: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the generation limit.
    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the crossover probability.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the mutation probability.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the convergence threshold.
    pub fn with_convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = Some(threshold);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return invalid(format!(
                "ga.population_size must be at least 2, got {}",
                self.population_size
            ));
        }
        if self.tournament_size == 0 {
            return invalid("ga.tournament_size must be at least 1".into());
        }
        check_probability("ga.crossover_rate", self.crossover_rate)?;
        check_probability("ga.mutation_rate", self.mutation_rate)
    }
}

/// Simulated annealing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaConfig {
    /// Starting temperature.
    pub initial_temperature: f64,
    /// Geometric cooling factor applied after each block.
    pub cooling_rate: f64,
    /// The search stops once the temperature drops below this floor.
    pub min_temperature: f64,
    /// Neighbor evaluations per temperature step.
    pub iterations_per_temperature: usize,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1000.0,
            cooling_rate: 0.95,
            min_temperature: 0.1,
            iterations_per_temperature: 100,
        }
    }
}

impl SaConfig {
    /// Sets the starting temperature.
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    /// Sets the cooling factor.
    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    /// Sets the temperature floor.
    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    /// Sets the inner iteration count.
    pub fn with_iterations_per_temperature(mut self, n: usize) -> Self {
        self.iterations_per_temperature = n;
        self
    }

    /// Number of temperature steps this schedule will run.
    pub fn temperature_steps(&self) -> usize {
        let mut t = self.initial_temperature;
        let mut steps = 0;
        while t >= self.min_temperature {
            t *= self.cooling_rate;
            steps += 1;
        }
        steps
    }

    fn validate(&self) -> Result<()> {
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return invalid(format!(
                "sa.cooling_rate must be in (0, 1), got {}",
                self.cooling_rate
            ));
        }
        if !(self.min_temperature > 0.0) || !self.initial_temperature.is_finite() {
            return invalid(format!(
                "sa temperatures must be finite with a positive floor, got {} -> {}",
                self.initial_temperature, self.min_temperature
            ));
        }
        Ok(())
    }
}

/// Backtracking solver parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CspConfig {
    /// Spacing between candidate slot starts (minutes).
    pub slot_step_mins: u32,
}

impl Default for CspConfig {
    fn default() -> Self {
        Self { slot_step_mins: 30 }
    }
}

impl CspConfig {
    /// Sets the slot step.
    pub fn with_slot_step(mut self, minutes: u32) -> Self {
        self.slot_step_mins = minutes;
        self
    }

    /// Slot step in ms.
    pub fn slot_step_ms(&self) -> i64 {
        self.slot_step_mins as i64 * 60_000
    }

    fn validate(&self) -> Result<()> {
        if self.slot_step_mins == 0 {
            return invalid("csp.slot_step_mins must be positive".into());
        }
        Ok(())
    }
}

/// Denominator used by the makespan-efficiency term of the score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MakespanBaseline {
    /// Sum of all processing times, as if run on one machine.
    #[default]
    Serial,
    /// Serial sum divided by the number of equipment that received work.
    PerEquipment,
}

/// Optimization score parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    /// Ideal-makespan baseline.
    pub makespan_baseline: MakespanBaseline,
}

fn check_probability(name: &str, p: f64) -> Result<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        invalid(format!("{name} must be in [0, 1], got {p}"))
    }
}

fn invalid(message: String) -> Result<()> {
    Err(SchedulingError::InvalidConfig(message))
}
