//! Strategy seam shared by all scheduling algorithms.
//!
//! A strategy turns a [`Problem`] into a [`Plan`]. The facade converts the
//! plan to wall-clock time and scores it, so every strategy yields the same
//! output shape.

use rand::Rng;

use super::allocator::Plan;
use super::problem::Problem;
use crate::cancel::CancelToken;
use crate::dispatching::{rules, DispatchContext, RuleEngine};
use crate::error::Result;
use crate::models::Algorithm;

/// A scheduling algorithm.
pub trait Strategy {
    /// The algorithm tag written into produced schedules.
    fn algorithm(&self) -> Algorithm;

    /// Plans the problem.
    ///
    /// Deterministic strategies ignore `rng`. Strategies that support
    /// cancellation poll `cancel` between units of work.
    fn plan<R: Rng>(&self, problem: &Problem, rng: &mut R, cancel: &CancelToken) -> Result<Plan>;
}

/// Greedy dispatch: sort once, then allocate in that order.
///
/// # Example
///
/// ```
/// use prod_schedule::scheduler::DispatchStrategy;
/// use prod_schedule::models::Algorithm;
///
/// let edd = DispatchStrategy::for_algorithm(Algorithm::EarliestDueDate).unwrap();
/// assert_eq!(edd.engine().rule_names(), vec!["EDD"]);
/// assert!(DispatchStrategy::for_algorithm(Algorithm::Genetic).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct DispatchStrategy {
    algorithm: Algorithm,
    engine: RuleEngine,
}

impl DispatchStrategy {
    /// The built-in rule for a dispatch algorithm.
    ///
    /// Returns `None` for the search-based algorithms.
    pub fn for_algorithm(algorithm: Algorithm) -> Option<Self> {
        let engine = match algorithm {
            Algorithm::Fifo => RuleEngine::new().with_rule(rules::Fifo),
            Algorithm::ShortestProcessingTime => RuleEngine::new().with_rule(rules::Spt),
            Algorithm::EarliestDueDate => RuleEngine::new().with_rule(rules::Edd),
            Algorithm::CriticalRatio => RuleEngine::new().with_rule(rules::Cr),
            Algorithm::Genetic
            | Algorithm::SimulatedAnnealing
            | Algorithm::ConstraintSatisfaction => return None,
        };
        Some(Self { algorithm, engine })
    }

    /// A dispatch strategy with a custom rule engine, tagged as `algorithm`.
    pub fn with_engine(algorithm: Algorithm, engine: RuleEngine) -> Self {
        Self { algorithm, engine }
    }

    /// The rule engine.
    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// Job indices in dispatch order.
    pub fn order(&self, problem: &Problem) -> Vec<usize> {
        let context = DispatchContext::at(problem.now());
        self.engine.sort_indices(problem.jobs(), &context)
    }
}

impl Strategy for DispatchStrategy {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn plan<R: Rng>(&self, problem: &Problem, _rng: &mut R, _cancel: &CancelToken) -> Result<Plan> {
        Ok(problem.materialize(&self.order(problem)))
    }
}
