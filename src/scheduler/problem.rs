//! Planning problem: the owned snapshot every strategy works on.
//!
//! Built once per generation call from the registry. Times are
//! precomputed in ms from the shift start so strategies never touch
//! wall-clock arithmetic until the final plan is realized.

use chrono::NaiveDateTime;
use tracing::warn;

use super::allocator::{Allocator, Plan};
use super::score;
use crate::config::{FitnessWeights, SchedulerConfig};
use crate::error::Result;
use crate::models::{minutes_to_ms_ceil, Equipment, Job, ProductionSchedule, ShiftWindow};
use crate::validation::Registry;

/// An eligible snapshot anchored to a shift window.
#[derive(Debug, Clone)]
pub struct Problem {
    jobs: Vec<Job>,
    equipment: Vec<Equipment>,
    window: ShiftWindow,
    now: NaiveDateTime,
    buffer_ms: i64,
    weights: FitnessWeights,
    work_ms: Vec<i64>,
    due_ms: Vec<Option<i64>>,
}

impl Problem {
    /// Anchors a registry to a shift window.
    ///
    /// `now` is the reference instant for critical-ratio dispatch.
    pub fn new(
        registry: Registry,
        window: ShiftWindow,
        now: NaiveDateTime,
        config: &SchedulerConfig,
    ) -> Self {
        let Registry { jobs, equipment } = registry;
        let work_ms = jobs.iter().map(Job::work_ms).collect();
        let due_ms = jobs
            .iter()
            .map(|j| j.due_time.map(|d| window.offset_ms(d)))
            .collect();

        Self {
            jobs,
            equipment,
            window,
            now,
            buffer_ms: minutes_to_ms_ceil(config.buffer_time_mins),
            weights: config.fitness,
            work_ms,
            due_ms,
        }
    }

    /// Eligible jobs, in input order.
    #[inline]
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Number of eligible jobs.
    #[inline]
    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Eligible equipment, in input order.
    #[inline]
    pub fn equipment(&self) -> &[Equipment] {
        &self.equipment
    }

    /// The shift window.
    #[inline]
    pub fn window(&self) -> &ShiftWindow {
        &self.window
    }

    /// Reference instant for time-remaining calculations.
    #[inline]
    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Buffer appended to every placement (ms).
    #[inline]
    pub fn buffer_ms(&self) -> i64 {
        self.buffer_ms
    }

    /// Setup + processing of job `j` (ms, rounded up).
    #[inline]
    pub fn work_ms(&self, j: usize) -> i64 {
        self.work_ms[j]
    }

    /// Due time of job `j` as an offset from the shift start (ms).
    #[inline]
    pub fn due_ms(&self, j: usize) -> Option<i64> {
        self.due_ms[j]
    }

    /// A fresh allocator over the eligible equipment.
    pub fn allocator(&self) -> Allocator<'_> {
        Allocator::new(&self.equipment, self.buffer_ms)
    }

    /// Runs the allocation engine over a job order.
    pub fn materialize(&self, order: &[usize]) -> Plan {
        self.allocator().sequence(order, &self.work_ms)
    }

    /// Fitness of a plan (higher is better).
    pub fn fitness(&self, plan: &Plan) -> f64 {
        score::plan_fitness(self, plan, &self.weights)
    }

    /// Writes a plan into a schedule shell: placed job copies,
    /// allocations and unscheduled IDs.
    ///
    /// # Errors
    /// See [`Slot::realize`](super::allocator::Slot::realize).
    pub fn realize(
        &self,
        plan: &Plan,
        mut schedule: ProductionSchedule,
    ) -> Result<ProductionSchedule> {
        for slot in &plan.slots {
            let job = &self.jobs[slot.job];
            let equipment = &self.equipment[slot.equipment];
            let (placed, allocation) = slot.realize(job, equipment, &self.window)?;
            schedule.jobs.push(placed);
            schedule.allocations.push(allocation);
        }

        for &j in &plan.unscheduled {
            warn!(job_id = %self.jobs[j].id, "job left unscheduled");
            schedule.unscheduled_job_ids.push(self.jobs[j].id.clone());
        }

        Ok(schedule)
    }
}
