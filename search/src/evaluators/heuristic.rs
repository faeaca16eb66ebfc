//! The heuristic wrapper and the external estimator seam.
//!
//! Concrete heuristics implement [`Estimator`] and are wrapped in a
//! [`HeuristicEvaluator`], which adds per-state estimate caching, the
//! `evaluations` accounting flag, and the path-dependency plumbing the
//! search loop drives (`notify_initial_state` / `notify_transition`).

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use foray_task::task::OperatorId;

use crate::evaluation_context::EvaluationContext;
use crate::evaluation_result::{EvaluationResult, INFTY};
use crate::state_registry::{State, StateId};

/// A heuristic estimate for one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Estimate {
    /// Nonnegative finite estimate.
    Value(i32),
    /// No goal is reachable from this state, as far as the estimator can
    /// tell. Trustworthiness is declared by
    /// [`Estimator::dead_ends_are_reliable`].
    DeadEnd,
}

/// Estimate plus optional preferred operators.
#[derive(Debug, Clone)]
pub struct EstimateResult {
    pub estimate: Estimate,
    /// Recommended operators in preference order; may name operators that
    /// are inapplicable or pruned; consumers intersect with the
    /// applicable set themselves.
    pub preferred_operators: Vec<OperatorId>,
}

impl EstimateResult {
    #[must_use]
    pub fn value(value: i32) -> Self {
        Self {
            estimate: Estimate::Value(value),
            preferred_operators: Vec::new(),
        }
    }

    #[must_use]
    pub fn dead_end() -> Self {
        Self {
            estimate: Estimate::DeadEnd,
            preferred_operators: Vec::new(),
        }
    }
}

/// The seam for concrete heuristics.
///
/// Implementations take `&self`; stateful heuristics (path-dependent
/// bookkeeping, internal tables) use interior mutability, since the whole
/// search is single-threaded by contract.
pub trait Estimator {
    fn name(&self) -> &str;

    /// Estimate the goal distance of `state`. Values must be nonnegative.
    fn compute(&self, state: &State) -> EstimateResult;

    /// True if a `DeadEnd` report proves no goal is reachable.
    fn dead_ends_are_reliable(&self) -> bool {
        false
    }

    /// True if the estimator accumulates information along traversed paths
    /// and must see every transition.
    fn is_path_dependent(&self) -> bool {
        false
    }

    fn notify_initial_state(&self, _state: &State) {}

    fn notify_transition(&self, _parent: &State, _op: OperatorId, _succ: &State) {}
}

/// Wraps an [`Estimator`] as an evaluator-tree leaf.
pub struct HeuristicEvaluator {
    estimator: Box<dyn Estimator>,
    cache_estimates: bool,
    /// Per-state estimates, dead ends stored as [`INFTY`]. Keyed by
    /// `StateId`, which is stable for the lifetime of the registry.
    cache: RefCell<FxHashMap<StateId, i32>>,
}

impl std::fmt::Debug for HeuristicEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeuristicEvaluator")
            .field("name", &self.estimator.name())
            .field("cache_estimates", &self.cache_estimates)
            .field("cached_states", &self.cache.borrow().len())
            .finish()
    }
}

impl HeuristicEvaluator {
    #[must_use]
    pub fn new(estimator: Box<dyn Estimator>, cache_estimates: bool) -> Self {
        Self {
            estimator,
            cache_estimates,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.estimator.name()
    }

    pub(crate) fn compute_result(&self, ctx: &mut EvaluationContext) -> EvaluationResult {
        let state = ctx.state().clone();

        // Serve from the per-state cache unless the context needs preferred
        // operators (only a fresh computation produces them) or the
        // estimator is path-dependent, whose values change as path
        // information accumulates, so reads must not short-circuit. The
        // cache still records the latest value either way, which is what
        // lazy re-evaluation compares against.
        if self.cache_estimates
            && !ctx.calculate_preferred()
            && !self.estimator.is_path_dependent()
        {
            if let Some(&value) = self.cache.borrow().get(&state.id()) {
                return EvaluationResult::new(value);
            }
        }

        let computed = self.estimator.compute(&state);
        let value = match computed.estimate {
            Estimate::DeadEnd => INFTY,
            Estimate::Value(value) => {
                assert!(
                    value >= 0,
                    "heuristic {} produced negative estimate {value}",
                    self.estimator.name()
                );
                value
            }
        };
        if self.cache_estimates {
            self.cache.borrow_mut().insert(state.id(), value);
        }
        EvaluationResult {
            value,
            preferred_operators: computed.preferred_operators,
            count_evaluation: true,
        }
    }

    #[must_use]
    pub fn does_cache_estimates(&self) -> bool {
        self.cache_estimates
    }

    /// The cached estimate for `state`, if caching is on and one exists.
    #[must_use]
    pub fn cached_estimate(&self, state: &State) -> Option<i32> {
        if self.cache_estimates {
            self.cache.borrow().get(&state.id()).copied()
        } else {
            None
        }
    }

    #[must_use]
    pub fn dead_ends_are_reliable(&self) -> bool {
        self.estimator.dead_ends_are_reliable()
    }

    #[must_use]
    pub fn is_path_dependent(&self) -> bool {
        self.estimator.is_path_dependent()
    }

    pub fn notify_initial_state(&self, state: &State) {
        self.estimator.notify_initial_state(state);
    }

    pub fn notify_transition(&self, parent: &State, op: OperatorId, succ: &State) {
        self.estimator.notify_transition(parent, op, succ);
    }
}
