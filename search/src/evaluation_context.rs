//! Per-state, per-expansion evaluation cache.
//!
//! A context is bound to `(state, g, is_preferred)` and memoizes one
//! [`EvaluationResult`] per evaluator node for its own lifetime. Contexts
//! are short-lived: the search loop builds a fresh one per evaluation site,
//! and two contexts for the same state are independent by design.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use foray_task::task::OperatorId;

use crate::evaluation_result::{EvaluationResult, INFTY};
use crate::evaluator::{Evaluator, EvaluatorId};
use crate::state_registry::State;
use crate::statistics::SearchStatistics;

/// Memoizing view of one state for the evaluator DAG.
pub struct EvaluationContext {
    state: State,
    g: i32,
    preferred: bool,
    calculate_preferred: bool,
    cache: FxHashMap<EvaluatorId, EvaluationResult>,
    statistics: Option<Rc<SearchStatistics>>,
}

impl EvaluationContext {
    #[must_use]
    pub fn new(
        state: State,
        g: i32,
        preferred: bool,
        statistics: Option<Rc<SearchStatistics>>,
    ) -> Self {
        Self {
            state,
            g,
            preferred,
            calculate_preferred: false,
            cache: FxHashMap::default(),
            statistics,
        }
    }

    /// A context that asks heuristics for preferred operators, bypassing
    /// their per-state estimate caches.
    #[must_use]
    pub fn for_preferred_operators(
        state: State,
        g: i32,
        preferred: bool,
        statistics: Option<Rc<SearchStatistics>>,
    ) -> Self {
        Self {
            calculate_preferred: true,
            ..Self::new(state, g, preferred, statistics)
        }
    }

    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    #[must_use]
    pub fn g(&self) -> i32 {
        self.g
    }

    /// True if the state was reached via a preferred operator.
    #[must_use]
    pub fn is_preferred(&self) -> bool {
        self.preferred
    }

    #[must_use]
    pub fn calculate_preferred(&self) -> bool {
        self.calculate_preferred
    }

    fn ensure(&mut self, eval: &Rc<Evaluator>) {
        let key = Evaluator::id(eval);
        if self.cache.contains_key(&key) {
            return;
        }
        let result = eval.compute_result(self);
        if result.count_evaluation {
            if let Some(statistics) = &self.statistics {
                statistics.inc_evaluations();
            }
        }
        self.cache.insert(key, result);
    }

    /// The memoized result for `eval`, computing it on first request.
    pub fn result(&mut self, eval: &Rc<Evaluator>) -> &EvaluationResult {
        self.ensure(eval);
        &self.cache[&Evaluator::id(eval)]
    }

    /// Finite evaluator value.
    ///
    /// # Panics
    ///
    /// Panics if the value is infinite; callers must rule dead ends out
    /// first (`is_infinite`), so hitting this is a programming error.
    pub fn value(&mut self, eval: &Rc<Evaluator>) -> i32 {
        let value = self.result(eval).value;
        assert!(
            value != INFTY,
            "value() called on an infinite result of {}",
            eval.description()
        );
        value
    }

    /// Evaluator value with dead ends mapped to [`INFTY`].
    pub fn value_or_infinity(&mut self, eval: &Rc<Evaluator>) -> i32 {
        self.result(eval).value
    }

    pub fn is_infinite(&mut self, eval: &Rc<Evaluator>) -> bool {
        self.result(eval).is_infinite()
    }

    /// Preferred operators reported by `eval` for this state.
    pub fn preferred_operators(&mut self, eval: &Rc<Evaluator>) -> &[OperatorId] {
        self.ensure(eval);
        &self.cache[&Evaluator::id(eval)].preferred_operators
    }

    /// All results cached so far, for progress tracking.
    pub(crate) fn cached_results(
        &self,
    ) -> impl Iterator<Item = (EvaluatorId, &EvaluationResult)> {
        self.cache.iter().map(|(&id, result)| (id, result))
    }
}
