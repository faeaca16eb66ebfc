//! Alternation open list: round-robin over child open lists.
//!
//! Every insertion goes to all children; removal picks the non-empty child
//! with the lowest priority counter (ties: declaration order) and bumps its
//! counter, yielding a round-robin. `boost_preferred` subtracts the
//! configured boost from the counters of children that only contain
//! preferred entries, so those children are drawn from more often after
//! heuristic progress.

use crate::evaluation_context::EvaluationContext;
use crate::evaluator::PathDependentSet;
use crate::open_list::OpenList;

#[derive(Debug)]
pub struct AlternationOpenList<E> {
    sublists: Vec<OpenList<E>>,
    priorities: Vec<i64>,
    boost: i64,
}

impl<E: Clone> AlternationOpenList<E> {
    /// # Panics
    ///
    /// Panics if `sublists` is empty.
    #[must_use]
    pub fn new(sublists: Vec<OpenList<E>>, boost: i64) -> Self {
        assert!(!sublists.is_empty(), "alternation requires at least one sublist");
        let priorities = vec![0; sublists.len()];
        Self {
            sublists,
            priorities,
            boost,
        }
    }

    pub fn insert(&mut self, ctx: &mut EvaluationContext, entry: E) {
        for sublist in &mut self.sublists {
            sublist.insert(ctx, entry.clone());
        }
    }

    pub fn pop(&mut self) -> Option<E> {
        let best = self
            .sublists
            .iter()
            .enumerate()
            .filter(|(_, sublist)| !sublist.is_empty())
            .min_by_key(|&(index, _)| (self.priorities[index], index))
            .map(|(index, _)| index)?;
        self.priorities[best] += 1;
        let entry = self.sublists[best].pop();
        debug_assert!(entry.is_some(), "chosen sublist was non-empty");
        entry
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sublists.iter().map(OpenList::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sublists.iter().all(OpenList::is_empty)
    }

    pub fn clear(&mut self) {
        for sublist in &mut self.sublists {
            sublist.clear();
        }
    }

    pub fn boost_preferred(&mut self) {
        for (index, sublist) in self.sublists.iter().enumerate() {
            if sublist.only_contains_preferred_entries() {
                self.priorities[index] -= self.boost;
            }
        }
    }

    #[must_use]
    pub fn only_contains_preferred_entries(&self) -> bool {
        self.sublists
            .iter()
            .all(OpenList::only_contains_preferred_entries)
    }

    /// Dead iff a child is reliably sure, or every child agrees.
    pub fn is_dead_end(&self, ctx: &mut EvaluationContext) -> bool {
        if self.is_reliable_dead_end(ctx) {
            return true;
        }
        self.sublists.iter().all(|sublist| sublist.is_dead_end(ctx))
    }

    pub fn is_reliable_dead_end(&self, ctx: &mut EvaluationContext) -> bool {
        self.sublists
            .iter()
            .any(|sublist| sublist.is_reliable_dead_end(ctx))
    }

    pub fn collect_path_dependent(&self, set: &mut PathDependentSet) {
        for sublist in &self.sublists {
            sublist.collect_path_dependent(set);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluators::{ConstEvaluator, GEvaluator};
    use crate::open_lists::BestFirstOpenList;
    use crate::state_registry::{State, StateId, StateRegistry};
    use std::rc::Rc;

    use crate::evaluator::Evaluator;
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

    fn two_child_list(boost: i64) -> AlternationOpenList<StateId> {
        let g: Rc<Evaluator> = Rc::new(Evaluator::G(GEvaluator));
        let konst: Rc<Evaluator> = Rc::new(Evaluator::Const(ConstEvaluator::new(0)));
        AlternationOpenList::new(
            vec![
                OpenList::BestFirst(BestFirstOpenList::new(g, false)),
                OpenList::BestFirst(BestFirstOpenList::new(konst, true)),
            ],
            boost,
        )
    }

    #[test]
    fn pops_round_robin_over_children() {
        let mut list = two_child_list(0);
        // Entry 0 is non-preferred (only child 0 keeps it); entries 1 and 2
        // are preferred (both children keep them).
        list.insert(&mut ctx(0, false), sid(0));
        list.insert(&mut ctx(1, true), sid(1));
        list.insert(&mut ctx(2, true), sid(2));

        assert_eq!(list.pop(), Some(sid(0)), "child 0 drawn first");
        assert_eq!(list.pop(), Some(sid(1)), "then child 1");
        assert_eq!(list.pop(), Some(sid(1)), "back to child 0");
    }

    #[test]
    fn empty_children_are_skipped() {
        let mut list = two_child_list(0);
        list.insert(&mut ctx(0, false), sid(0));
        // Child 1 (pref-only) is empty; both pops must come from child 0.
        assert_eq!(list.pop(), Some(sid(0)));
        assert_eq!(list.pop(), None);
    }

    #[test]
    fn boost_biases_toward_preferred_children() {
        let mut list = two_child_list(10);
        for index in 0..4 {
            list.insert(&mut ctx(index, true), sid(index as usize));
        }
        assert_eq!(list.len(), 8, "preferred entries land in both children");

        list.boost_preferred();
        // The pref-only child now sits at priority -10 and supplies every
        // pop until it runs dry; its const-0 keys make this pure FIFO.
        for index in 0..4 {
            assert_eq!(list.pop(), Some(sid(index)));
        }
        assert_eq!(list.len(), 4, "the unboosted child still holds its copies");
    }
}
