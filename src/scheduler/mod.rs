//! Schedule generation, scoring and analysis.
//!
//! [`ProductionScheduler`] is the entry point: it validates a
//! [`ScheduleRequest`], builds a [`Problem`], runs the selected
//! [`Algorithm`], writes the plan into a [`ProductionSchedule`] and scores
//! it. [`ScheduleAnalysis`] runs separately on any finished schedule.
//!
//! # Pipeline
//!
//! 1. Config check, then registry build (validation, status filtering).
//! 2. Anchor the shift to the request date.
//! 3. Strategy: dispatch rule, GA, SA or backtracking search.
//! 4. Realize the plan in wall-clock time and attach constraints.
//! 5. Score once with [`Scorer`].
//!
//! # Allocation
//!
//! Every strategy except the backtracking solver decodes a job order with
//! the same sequential [`Allocator`]: earliest-available compatible
//! equipment, ties to the first in input order.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

mod allocator;
mod analysis;
pub(crate) mod problem;
pub mod score;
mod strategy;

pub use allocator::{is_compatible, Allocator, Plan, Slot};
pub use analysis::{ScheduleAnalysis, BOTTLENECK_FACTOR};
pub use problem::Problem;
pub use score::{plan_fitness, ScoreBreakdown, Scorer};
pub use strategy::{DispatchStrategy, Strategy};

use chrono::{NaiveDate, NaiveDateTime};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{info, instrument};

use crate::cancel::CancelToken;
use crate::config::SchedulerConfig;
use crate::cp::BacktrackingSolver;
use crate::error::{Result, SchedulingError};
use crate::ga::GeneticAlgorithm;
use crate::models::{Algorithm, Equipment, Job, ProductionSchedule, SchedulingConstraint, Shift};
use crate::sa::SimulatedAnnealing;
use crate::validation::Registry;

/// Input snapshot for one generation call.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    /// Plant the schedule is for.
    pub plant_id: String,
    /// Shift to fill.
    pub shift: Shift,
    /// Date the shift starts on.
    pub date: NaiveDate,
    /// Candidate jobs (any status; ineligible ones are filtered).
    pub jobs: Vec<Job>,
    /// Plant equipment (any status).
    pub equipment: Vec<Equipment>,
    /// Constraints attached to the produced schedule.
    pub constraints: Vec<SchedulingConstraint>,
}

impl ScheduleRequest {
    /// Creates a request with no jobs, equipment or constraints.
    pub fn new(plant_id: impl Into<String>, shift: Shift, date: NaiveDate) -> Self {
        Self {
            plant_id: plant_id.into(),
            shift,
            date,
            jobs: Vec::new(),
            equipment: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Sets the jobs.
    pub fn with_jobs(mut self, jobs: Vec<Job>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Sets the equipment.
    pub fn with_equipment(mut self, equipment: Vec<Equipment>) -> Self {
        self.equipment = equipment;
        self
    }

    /// Adds a constraint.
    pub fn with_constraint(mut self, constraint: SchedulingConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Reference instant for critical ratio. Defaults to the shift start.
    pub now: Option<NaiveDateTime>,
    /// Dispatch algorithm to run when the backtracking solver finds no
    /// solution. `None` returns a schedule with every job unscheduled.
    pub fallback: Option<Algorithm>,
    /// Cancellation for GA, SA and CSP.
    pub cancel: CancelToken,
}

impl GenerateOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reference instant.
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// Sets the CSP fallback rule.
    pub fn with_fallback(mut self, algorithm: Algorithm) -> Self {
        self.fallback = Some(algorithm);
        self
    }

    /// Sets the cancellation token.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Production schedule generator.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use prod_schedule::models::{Algorithm, Equipment, Job, Shift};
/// use prod_schedule::{ProductionScheduler, ScheduleRequest};
///
/// let shift = Shift::new(
///     "day",
///     NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
///     NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
/// );
/// let request = ScheduleRequest::new("P1", shift, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap())
///     .with_jobs(vec![Job::new("J1", "WO-1").with_work(10, 60.0)])
///     .with_equipment(vec![Equipment::new("M1")]);
///
/// let schedule = ProductionScheduler::default()
///     .generate(Algorithm::Fifo, &request)
///     .unwrap();
/// assert_eq!(schedule.placed_count(), 1);
/// assert!((schedule.makespan_mins() - 10.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProductionScheduler {
    config: SchedulerConfig,
}

impl ProductionScheduler {
    /// Creates a scheduler with the given configuration.
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Generates a schedule with default options.
    pub fn generate(
        &self,
        algorithm: Algorithm,
        request: &ScheduleRequest,
    ) -> Result<ProductionSchedule> {
        self.generate_with(algorithm, request, &GenerateOptions::default())
    }

    /// Generates a schedule.
    ///
    /// GA and SA draw from a `SmallRng` seeded with `config.seed`, or from
    /// OS entropy when no seed is set.
    ///
    /// # Errors
    /// - [`SchedulingError::InvalidConfig`] for out-of-range parameters or a
    ///   non-dispatch fallback
    /// - [`SchedulingError::InvalidInput`], [`SchedulingError::NoEligibleJobs`],
    ///   [`SchedulingError::NoEligibleEquipment`] from the registry
    /// - [`SchedulingError::InvalidInput`] when a placement ends beyond the
    ///   calendar range
    /// - [`SchedulingError::Cancelled`] when a CSP search is cancelled
    #[instrument(
        skip_all,
        fields(
            algorithm = algorithm.name(),
            plant_id = %request.plant_id,
            date = %request.date
        )
    )]
    pub fn generate_with(
        &self,
        algorithm: Algorithm,
        request: &ScheduleRequest,
        options: &GenerateOptions,
    ) -> Result<ProductionSchedule> {
        let mut rng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        self.generate_with_rng(algorithm, request, options, &mut rng)
    }

    /// Generates a schedule drawing randomness from `rng`.
    pub fn generate_with_rng<R: Rng>(
        &self,
        algorithm: Algorithm,
        request: &ScheduleRequest,
        options: &GenerateOptions,
        rng: &mut R,
    ) -> Result<ProductionSchedule> {
        self.config.validate()?;
        if let Some(fallback) = options.fallback {
            if DispatchStrategy::for_algorithm(fallback).is_none() {
                return Err(SchedulingError::InvalidConfig(format!(
                    "fallback must be a dispatch rule, got {}",
                    fallback.name()
                )));
            }
        }

        let registry = Registry::build(&request.jobs, &request.equipment)?;
        let window = request.shift.window(request.date);
        let now = options.now.unwrap_or(window.start);
        let problem = Problem::new(registry, window, now, &self.config);

        let (produced_by, plan) = self.plan(algorithm, &problem, options, rng)?;

        let mut shell = ProductionSchedule::new(
            request.plant_id.clone(),
            request.shift.clone(),
            request.date,
            produced_by,
        );
        shell.constraints = request.constraints.clone();
        let mut schedule = problem.realize(&plan, shell)?;
        schedule.optimization_score = Scorer::new(&self.config.score).score(&schedule);

        info!(
            algorithm = produced_by.name(),
            placed = schedule.placed_count(),
            unscheduled = schedule.unscheduled_job_ids.len(),
            makespan_mins = schedule.makespan_mins(),
            score = schedule.optimization_score,
            "schedule generated"
        );
        Ok(schedule)
    }

    /// Runs the strategy for `algorithm`. Returns the algorithm that
    /// actually produced the plan, which differs on CSP fallback.
    fn plan<R: Rng>(
        &self,
        algorithm: Algorithm,
        problem: &Problem,
        options: &GenerateOptions,
        rng: &mut R,
    ) -> Result<(Algorithm, Plan)> {
        let cancel = &options.cancel;
        let plan = match algorithm {
            Algorithm::Fifo
            | Algorithm::ShortestProcessingTime
            | Algorithm::EarliestDueDate
            | Algorithm::CriticalRatio => match DispatchStrategy::for_algorithm(algorithm) {
                Some(strategy) => strategy.plan(problem, rng, cancel)?,
                None => Plan::unplaced(problem.job_count()),
            },
            Algorithm::Genetic => {
                GeneticAlgorithm::new(self.config.ga.clone()).plan(problem, rng, cancel)?
            }
            Algorithm::SimulatedAnnealing => {
                SimulatedAnnealing::new(self.config.sa.clone()).plan(problem, rng, cancel)?
            }
            Algorithm::ConstraintSatisfaction => {
                let solver = BacktrackingSolver::new(self.config.csp.clone());
                match solver.solve(problem, cancel)? {
                    Some(plan) => plan,
                    None => match options.fallback.and_then(DispatchStrategy::for_algorithm) {
                        Some(strategy) => {
                            info!(
                                fallback = strategy.algorithm().name(),
                                "csp found no solution, using fallback rule"
                            );
                            let plan = strategy.plan(problem, rng, cancel)?;
                            return Ok((strategy.algorithm(), plan));
                        }
                        None => Plan::unplaced(problem.job_count()),
                    },
                }
            }
        };
        Ok((algorithm, plan))
    }
}
