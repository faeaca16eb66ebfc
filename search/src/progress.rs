//! Best-heuristic-value tracking.
//!
//! Remembers the lowest finite value seen per evaluator node and reports
//! when any of them improves. The eager search rewards an improvement by
//! boosting the preferred-operator sublists of its open list.

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

use crate::evaluation_context::EvaluationContext;
use crate::evaluator::EvaluatorId;

#[derive(Debug, Default)]
pub struct SearchProgress {
    best_values: FxHashMap<EvaluatorId, i32>,
}

impl SearchProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the context's cached finite results in; true if any evaluator
    /// reached a new minimum.
    pub fn check_progress(&mut self, ctx: &EvaluationContext) -> bool {
        let mut improved = false;
        for (id, result) in ctx.cached_results() {
            if result.is_infinite() {
                continue;
            }
            match self.best_values.entry(id) {
                Entry::Occupied(mut best) => {
                    if result.value < *best.get() {
                        best.insert(result.value);
                        improved = true;
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(result.value);
                    improved = true;
                }
            }
        }
        improved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::Evaluator;
    use crate::evaluators::GEvaluator;
    use crate::state_registry::{State, StateRegistry};
    use foray_task::fact::FactPair;
    use foray_task::task::{PlanningTask, Variable};
    use std::rc::Rc;

    fn tiny_state() -> State {
        let task = Rc::new(PlanningTask {
            variables: vec![Variable {
                name: "v".into(),
                domain_size: 2,
                axiom_layer: -1,
            }],
            mutex_groups: Vec::new(),
            initial_values: vec![0],
            goal: vec![FactPair::new(0, 1)],
            operators: Vec::new(),
            axioms: Vec::new(),
            use_metric: false,
        });
        StateRegistry::new(task).initial_state().expect("initial")
    }

    #[test]
    fn first_sighting_and_improvements_count_as_progress() {
        let g: Rc<Evaluator> = Rc::new(Evaluator::G(GEvaluator));
        let mut progress = SearchProgress::new();

        let mut ctx = EvaluationContext::new(tiny_state(), 5, false, None);
        let _ = ctx.value(&g);
        assert!(progress.check_progress(&ctx), "first value is progress");

        let mut ctx = EvaluationContext::new(tiny_state(), 5, false, None);
        let _ = ctx.value(&g);
        assert!(!progress.check_progress(&ctx), "same value is not");

        let mut ctx = EvaluationContext::new(tiny_state(), 3, false, None);
        let _ = ctx.value(&g);
        assert!(progress.check_progress(&ctx), "lower value is");
    }
}
