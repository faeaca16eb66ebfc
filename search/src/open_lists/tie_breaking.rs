//! Tie-breaking open list: lexicographic tuple of evaluator values.
//!
//! Same bucket discipline as the best-first list, with the ordered tuple of
//! sub-evaluator values (in declared order) as the key. With
//! `unsafe_pruning`, an infinite FIRST evaluator alone is enough to treat a
//! state as dead, even when its dead ends are not declared reliable.

use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use crate::evaluation_context::EvaluationContext;
use crate::evaluation_result::INFTY;
use crate::evaluator::{collect_path_dependent, Evaluator, PathDependentSet};

#[derive(Debug)]
pub struct TieBreakingOpenList<E> {
    evaluators: Vec<Rc<Evaluator>>,
    pref_only: bool,
    unsafe_pruning: bool,
    buckets: BTreeMap<Vec<i32>, VecDeque<E>>,
    size: usize,
}

impl<E> TieBreakingOpenList<E> {
    /// # Panics
    ///
    /// Panics if `evaluators` is empty.
    #[must_use]
    pub fn new(evaluators: Vec<Rc<Evaluator>>, pref_only: bool, unsafe_pruning: bool) -> Self {
        assert!(
            !evaluators.is_empty(),
            "tie-breaking requires at least one evaluator"
        );
        Self {
            evaluators,
            pref_only,
            unsafe_pruning,
            buckets: BTreeMap::new(),
            size: 0,
        }
    }

    pub fn insert(&mut self, ctx: &mut EvaluationContext, entry: E) {
        if self.pref_only && !ctx.is_preferred() {
            return;
        }
        if self.is_dead_end(ctx) {
            return;
        }
        let key: Vec<i32> = self
            .evaluators
            .iter()
            .map(|evaluator| ctx.value_or_infinity(evaluator))
            .collect();
        self.buckets.entry(key).or_default().push_back(entry);
        self.size += 1;
    }

    pub fn pop(&mut self) -> Option<E> {
        let mut first = self.buckets.first_entry()?;
        let bucket = first.get_mut();
        let entry = bucket.pop_front();
        debug_assert!(entry.is_some(), "buckets are erased when they empty");
        if bucket.is_empty() {
            first.remove();
        }
        self.size -= 1;
        entry
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.size = 0;
    }

    #[must_use]
    pub fn only_contains_preferred_entries(&self) -> bool {
        self.pref_only
    }

    pub fn is_dead_end(&self, ctx: &mut EvaluationContext) -> bool {
        if self.is_reliable_dead_end(ctx) {
            return true;
        }
        if self.unsafe_pruning && ctx.is_infinite(&self.evaluators[0]) {
            return true;
        }
        self.evaluators
            .iter()
            .all(|evaluator| ctx.value_or_infinity(evaluator) == INFTY)
    }

    pub fn is_reliable_dead_end(&self, ctx: &mut EvaluationContext) -> bool {
        self.evaluators
            .iter()
            .any(|evaluator| ctx.is_infinite(evaluator) && evaluator.dead_ends_are_reliable())
    }

    pub fn collect_path_dependent(&self, set: &mut PathDependentSet) {
        for evaluator in &self.evaluators {
            collect_path_dependent(evaluator, set);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluators::{ConstEvaluator, GEvaluator, PrefEvaluator};
    use crate::state_registry::{State, StateId, StateRegistry};
    use foray_task::fact::FactPair;
    use foray_task::task::{PlanningTask, Variable};

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

    fn ctx(g: i32, preferred: bool) -> EvaluationContext {
        EvaluationContext::new(tiny_state(), g, preferred, None)
    }

    fn sid(index: usize) -> StateId {
        crate::state_registry::test_support::state_id(index)
    }

    #[test]
    fn orders_lexicographically() {
        let g: Rc<Evaluator> = Rc::new(Evaluator::G(GEvaluator));
        let pref: Rc<Evaluator> = Rc::new(Evaluator::Pref(PrefEvaluator));
        // Key is (g, pref): preferred entries win ties on g.
        let mut list = TieBreakingOpenList::new(vec![g, pref], false, true);

        list.insert(&mut ctx(1, false), sid(0)); // (1, 1)
        list.insert(&mut ctx(1, true), sid(1)); // (1, 0)
        list.insert(&mut ctx(0, false), sid(2)); // (0, 1)

        assert_eq!(list.pop(), Some(sid(2)));
        assert_eq!(list.pop(), Some(sid(1)));
        assert_eq!(list.pop(), Some(sid(0)));
    }

    #[test]
    fn identical_tuples_pop_in_insertion_order() {
        let g: Rc<Evaluator> = Rc::new(Evaluator::G(GEvaluator));
        let konst: Rc<Evaluator> = Rc::new(Evaluator::Const(ConstEvaluator::new(5)));
        let mut list = TieBreakingOpenList::new(vec![g, konst], false, true);
        for index in 0..4 {
            list.insert(&mut ctx(2, false), sid(index));
        }
        for index in 0..4 {
            assert_eq!(list.pop(), Some(sid(index)), "FIFO within the tuple bucket");
        }
    }
}
