//! Constraint-satisfaction formulation and backtracking search.
//!
//! # Model
//!
//! - **Variables**: one per job with compatible equipment, in job order.
//! - **Domain**: slot starts on a fixed grid (default 30 min) from the
//!   shift start; each slot is `[s, s + setup + processing)` and must end
//!   within the shift window. All slots of a variable sit on one
//!   equipment: the job's own `equipment_id` when it names allocatable
//!   equipment, else the first allocatable equipment.
//! - **Relations**: variables on the same equipment must not overlap.
//!
//! # Search
//!
//! Chronological depth-first backtracking with variables and values in
//! list order. The first complete consistent assignment is returned. The
//! search runs on an explicit stack of frames, so depth is bounded by the
//! job count and not by the call stack.
//!
//! # Reference
//! - Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach", Ch. 6
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"

use rand::Rng;
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::config::CspConfig;
use crate::error::{Result, SchedulingError};
use crate::models::Algorithm;
use crate::scheduler::{is_compatible, Plan, Problem, Slot, Strategy};

/// A candidate slot (ms from shift start).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotValue {
    /// Start offset.
    pub start_ms: i64,
    /// End offset (exclusive).
    pub end_ms: i64,
}

impl SlotValue {
    #[inline]
    fn overlaps(&self, other: &Self) -> bool {
        self.start_ms < other.end_ms && other.start_ms < self.end_ms
    }
}

/// One job's decision variable.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Job index in the problem.
    pub job: usize,
    /// Equipment index every slot is tagged with.
    pub equipment: usize,
    /// Work carried by the job (ms).
    pub work_ms: i64,
    /// Candidate slots in start order.
    pub domain: Vec<SlotValue>,
}

/// A finite-domain scheduling model.
#[derive(Debug, Clone, Default)]
pub struct CspModel {
    /// Variables in search order.
    pub variables: Vec<Variable>,
    /// Jobs that got no variable (no compatible equipment).
    pub excluded: Vec<usize>,
    /// For each variable, the earlier variables it must not overlap.
    earlier_related: Vec<Vec<usize>>,
}

impl CspModel {
    /// Number of variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether the model has no variables.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Whether two variables share equipment.
    pub fn related(&self, a: usize, b: usize) -> bool {
        a != b && self.variables[a].equipment == self.variables[b].equipment
    }

    /// Whether a complete assignment (domain index per variable) satisfies
    /// every relation.
    pub fn is_consistent(&self, assignment: &[usize]) -> bool {
        (0..assignment.len()).all(|v| {
            self.earlier_related[v].iter().all(|&u| {
                let a = self.variables[v].domain[assignment[v]];
                let b = self.variables[u].domain[assignment[u]];
                !a.overlaps(&b)
            })
        })
    }
}

/// Builds a [`CspModel`] from a planning problem.
///
/// # Example
///
/// ```
/// use prod_schedule::cp::CspBuilder;
/// use prod_schedule::config::CspConfig;
///
/// let builder = CspBuilder::new(CspConfig::default().with_slot_step(15));
/// assert_eq!(builder.slot_step_ms(), 15 * 60_000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CspBuilder {
    config: CspConfig,
}

impl CspBuilder {
    /// Creates a builder.
    pub fn new(config: CspConfig) -> Self {
        Self { config }
    }

    /// Grid spacing (ms).
    pub fn slot_step_ms(&self) -> i64 {
        self.config.slot_step_ms()
    }

    /// Builds variables, domains and relations.
    pub fn build(&self, problem: &Problem) -> CspModel {
        let step = self.slot_step_ms().max(1);
        let horizon = problem.window().duration_ms();
        let equipment = problem.equipment();
        let first_compatible = equipment.iter().position(is_compatible);

        let mut model = CspModel::default();
        for (j, job) in problem.jobs().iter().enumerate() {
            let own = job
                .equipment_id
                .as_deref()
                .and_then(|id| equipment.iter().position(|e| e.id == id && is_compatible(e)));
            let Some(eq) = own.or(first_compatible) else {
                model.excluded.push(j);
                continue;
            };

            let work_ms = problem.work_ms(j);
            let domain: Vec<SlotValue> = (0..)
                .map(|k| k * step)
                .take_while(|&s| s + work_ms <= horizon)
                .map(|s| SlotValue {
                    start_ms: s,
                    end_ms: s + work_ms,
                })
                .collect();

            model.variables.push(Variable {
                job: j,
                equipment: eq,
                work_ms,
                domain,
            });
        }

        model.earlier_related = (0..model.variables.len())
            .map(|v| (0..v).filter(|&u| model.related(u, v)).collect())
            .collect();

        debug!(
            variables = model.variables.len(),
            excluded = model.excluded.len(),
            domain_total = model.variables.iter().map(|v| v.domain.len()).sum::<usize>(),
            "csp model built"
        );
        model
    }
}

/// A search frame: the variable at this depth and the next value to try.
#[derive(Debug, Clone, Copy)]
struct Frame {
    next: usize,
    value: usize,
}

/// Chronological backtracking solver.
#[derive(Debug, Clone, Default)]
pub struct BacktrackingSolver {
    builder: CspBuilder,
}

impl BacktrackingSolver {
    /// Creates a solver.
    pub fn new(config: CspConfig) -> Self {
        Self {
            builder: CspBuilder::new(config),
        }
    }

    /// Searches for the first consistent assignment.
    ///
    /// Returns a domain index per variable, or `None` when the model has no
    /// solution.
    ///
    /// # Errors
    /// [`SchedulingError::Cancelled`] when `cancel` fires during search.
    pub fn search(&self, model: &CspModel, cancel: &CancelToken) -> Result<Option<Vec<usize>>> {
        let n = model.len();
        if n == 0 {
            return Ok(Some(Vec::new()));
        }

        let mut stack: Vec<Frame> = Vec::with_capacity(n);
        stack.push(Frame { next: 0, value: 0 });
        let mut nodes: u64 = 0;

        while let Some(depth) = stack.len().checked_sub(1) {
            if cancel.is_cancelled() {
                info!(nodes, depth, "csp search cancelled");
                return Err(SchedulingError::Cancelled);
            }
            nodes += 1;

            let domain = &model.variables[depth].domain;
            let mut chosen = None;
            while stack[depth].next < domain.len() {
                let d = stack[depth].next;
                stack[depth].next += 1;

                let slot = domain[d];
                let fits = model.earlier_related[depth].iter().all(|&u| {
                    let other = model.variables[u].domain[stack[u].value];
                    !slot.overlaps(&other)
                });
                if fits {
                    chosen = Some(d);
                    break;
                }
            }

            match chosen {
                Some(d) => {
                    stack[depth].value = d;
                    if depth + 1 == n {
                        debug!(nodes, "csp solution found");
                        return Ok(Some(stack.iter().map(|f| f.value).collect()));
                    }
                    stack.push(Frame { next: 0, value: 0 });
                }
                None => {
                    stack.pop();
                }
            }
        }

        debug!(nodes, "csp search exhausted");
        Ok(None)
    }

    /// Builds and solves the model for `problem`.
    ///
    /// Returns `None` when no consistent assignment exists.
    pub fn solve(&self, problem: &Problem, cancel: &CancelToken) -> Result<Option<Plan>> {
        let model = self.builder.build(problem);
        let Some(assignment) = self.search(&model, cancel)? else {
            warn!(variables = model.len(), "no consistent slot assignment exists");
            return Ok(None);
        };

        let slots = model
            .variables
            .iter()
            .zip(&assignment)
            .map(|(var, &d)| {
                let value = var.domain[d];
                Slot {
                    job: var.job,
                    equipment: var.equipment,
                    start_ms: value.start_ms,
                    end_ms: value.end_ms,
                    work_ms: var.work_ms,
                }
            })
            .collect();

        Ok(Some(Plan {
            slots,
            unscheduled: model.excluded,
        }))
    }
}

impl Strategy for BacktrackingSolver {
    fn algorithm(&self) -> Algorithm {
        Algorithm::ConstraintSatisfaction
    }

    /// Unsolvable problems give a plan with every job unscheduled.
    fn plan<R: Rng>(&self, problem: &Problem, _rng: &mut R, cancel: &CancelToken) -> Result<Plan> {
        Ok(self
            .solve(problem, cancel)?
            .unwrap_or_else(|| Plan::unplaced(problem.job_count())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::models::{Equipment, EquipmentStatus, Job, Shift};
    use crate::scheduler::problem::tests::{day, problem, uniform_jobs};
    use crate::validation::Registry;
    use chrono::NaiveTime;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn solver() -> BacktrackingSolver {
        BacktrackingSolver::default()
    }

    fn assert_sound(plan: &Plan, horizon_ms: i64) {
        for (i, a) in plan.slots.iter().enumerate() {
            assert!(a.end_ms <= horizon_ms);
            assert_eq!(a.start_ms % (30 * 60_000), 0);
            for b in &plan.slots[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_domains_on_grid() {
        // 8 h shift, 90 min job -> starts 0, 30, ..., 390 min = 14 slots
        let jobs = vec![Job::new("J1", "WO-1").with_work(90, 60.0)];
        let p = problem(jobs, vec![Equipment::new("M1")]);
        let model = CspBuilder::default().build(&p);
        assert_eq!(model.len(), 1);
        let domain = &model.variables[0].domain;
        assert_eq!(domain.len(), 14);
        assert_eq!(domain[1].start_ms, 30 * 60_000);
        assert_eq!(domain.last().unwrap().end_ms, 8 * 3_600_000);
    }

    #[test]
    fn test_own_equipment_preferred() {
        let jobs = vec![
            Job::new("J1", "WO-1").with_work(10, 60.0).with_equipment("M2"),
            Job::new("J2", "WO-2").with_work(10, 60.0).with_equipment("M9"),
            Job::new("J3", "WO-3").with_work(10, 60.0),
        ];
        let equipment = vec![
            Equipment::new("M0").with_status(EquipmentStatus::Maintenance),
            Equipment::new("M1"),
            Equipment::new("M2"),
        ];
        let p = problem(jobs, equipment);
        let model = CspBuilder::default().build(&p);
        let eqs: Vec<usize> = model.variables.iter().map(|v| v.equipment).collect();
        assert_eq!(eqs, vec![2, 1, 1]);
        assert!(model.related(1, 2));
        assert!(!model.related(0, 1));
    }

    #[test]
    fn test_solution_is_sound() {
        let p = problem(uniform_jobs(5, 45), vec![Equipment::new("M1")]);
        let plan = solver().solve(&p, &CancelToken::new()).unwrap().unwrap();
        assert_eq!(plan.slots.len(), 5);
        assert_sound(&plan, p.window().duration_ms());

        // First-fit in list order: 0, 60, 120, ... minutes
        let starts: Vec<i64> = plan.slots.iter().map(|s| s.start_ms / 60_000).collect();
        assert_eq!(starts, vec![0, 60, 120, 180, 240]);
    }

    #[test]
    fn test_backtracks_when_needed() {
        // 465-min shift. A first leaves B (415 min) only starts 0 and 30,
        // both blocked; A has to move behind B.
        let jobs = vec![
            Job::new("A", "WO-1").with_work(40, 60.0),
            Job::new("B", "WO-2").with_work(415, 60.0),
        ];
        let equipment = vec![Equipment::new("M1")];
        let shift = Shift::new(
            "short",
            NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(13, 45, 0).unwrap(),
        );
        let window = shift.window(day());
        let registry = Registry::build(&jobs, &equipment).unwrap();
        let p = Problem::new(registry, window, window.start, &SchedulerConfig::default());

        let plan = solver().solve(&p, &CancelToken::new()).unwrap().unwrap();
        let starts: Vec<i64> = plan.slots.iter().map(|s| s.start_ms / 60_000).collect();
        assert_eq!(starts, vec![420, 0]);
        assert_sound(&plan, p.window().duration_ms());
    }

    #[test]
    fn test_unsolvable_returns_none() {
        let p = problem(uniform_jobs(3, 180), vec![Equipment::new("M1")]);
        assert!(solver().solve(&p, &CancelToken::new()).unwrap().is_none());

        let mut rng = SmallRng::seed_from_u64(42);
        let plan = solver().plan(&p, &mut rng, &CancelToken::new()).unwrap();
        assert!(plan.slots.is_empty());
        assert_eq!(plan.unscheduled, vec![0, 1, 2]);
    }

    #[test]
    fn test_job_longer_than_shift() {
        let p = problem(uniform_jobs(1, 600), vec![Equipment::new("M1")]);
        let model = CspBuilder::default().build(&p);
        assert!(model.variables[0].domain.is_empty());
        assert!(solver().solve(&p, &CancelToken::new()).unwrap().is_none());
    }

    #[test]
    fn test_excluded_without_compatible_equipment() {
        let equipment = vec![Equipment::new("M1").with_status(EquipmentStatus::Breakdown)];
        let p = problem(uniform_jobs(2, 10), equipment);
        let plan = solver().solve(&p, &CancelToken::new()).unwrap().unwrap();
        assert!(plan.slots.is_empty());
        assert_eq!(plan.unscheduled, vec![0, 1]);
    }

    #[test]
    fn test_parallel_equipment_via_tags() {
        let jobs = vec![
            Job::new("A", "WO-1").with_work(240, 60.0).with_equipment("M1"),
            Job::new("B", "WO-2").with_work(240, 60.0).with_equipment("M2"),
        ];
        let p = problem(jobs, vec![Equipment::new("M1"), Equipment::new("M2")]);
        let plan = solver().solve(&p, &CancelToken::new()).unwrap().unwrap();
        assert_eq!(plan.slots[0].start_ms, 0);
        assert_eq!(plan.slots[1].start_ms, 0);
    }

    #[test]
    fn test_cancelled_search() {
        let p = problem(uniform_jobs(3, 10), vec![Equipment::new("M1")]);
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = solver().solve(&p, &cancel).unwrap_err();
        assert!(matches!(err, SchedulingError::Cancelled));
    }

    #[test]
    fn test_model_consistency_check() {
        let p = problem(uniform_jobs(2, 60), vec![Equipment::new("M1")]);
        let model = CspBuilder::default().build(&p);
        assert!(model.is_consistent(&[0, 2]));
        assert!(!model.is_consistent(&[0, 1]));
    }
}
