//! The composable evaluator tree.
//!
//! Evaluators form a closed set of tagged variants rather than an open
//! trait hierarchy: the search loop and the open lists are written against
//! this enum's operation set. Nodes are shared via `Rc`, so the same
//! heuristic instance can appear under several parents (a DAG); identity
//! for caching and deduplication is the `Rc` allocation address.
//!
//! The only trait seam is [`crate::evaluators::Estimator`], the boundary
//! to concrete heuristics.

use std::rc::Rc;

use rustc_hash::FxHashSet;

use foray_task::task::OperatorId;

use crate::evaluation_context::EvaluationContext;
use crate::evaluation_result::EvaluationResult;
use crate::evaluators::{
    ConstEvaluator, GEvaluator, HeuristicEvaluator, MaxEvaluator, PrefEvaluator, SumEvaluator,
    WeightedEvaluator,
};
use crate::state_registry::State;

/// Identity of a shared evaluator node (its allocation address).
pub type EvaluatorId = usize;

/// A node in the evaluator DAG.
#[derive(Debug)]
pub enum Evaluator {
    G(GEvaluator),
    Const(ConstEvaluator),
    Pref(PrefEvaluator),
    Weighted(WeightedEvaluator),
    Sum(SumEvaluator),
    Max(MaxEvaluator),
    Heuristic(HeuristicEvaluator),
}

impl Evaluator {
    /// Identity of a shared node. Two `Rc` handles to the same allocation
    /// have the same id.
    #[must_use]
    pub fn id(this: &Rc<Evaluator>) -> EvaluatorId {
        Rc::as_ptr(this) as EvaluatorId
    }

    /// Compute this evaluator's result in `ctx`, querying children through
    /// the context so shared subtrees are evaluated once per context.
    pub fn compute_result(&self, ctx: &mut EvaluationContext) -> EvaluationResult {
        match self {
            Evaluator::G(e) => e.compute_result(ctx),
            Evaluator::Const(e) => e.compute_result(ctx),
            Evaluator::Pref(e) => e.compute_result(ctx),
            Evaluator::Weighted(e) => e.compute_result(ctx),
            Evaluator::Sum(e) => e.compute_result(ctx),
            Evaluator::Max(e) => e.compute_result(ctx),
            Evaluator::Heuristic(e) => e.compute_result(ctx),
        }
    }

    /// True if an infinite value from this evaluator proves the state is a
    /// dead end.
    #[must_use]
    pub fn dead_ends_are_reliable(&self) -> bool {
        match self {
            Evaluator::G(_) => false,
            Evaluator::Const(_) | Evaluator::Pref(_) => true,
            Evaluator::Weighted(e) => e.dead_ends_are_reliable(),
            Evaluator::Sum(e) => e.dead_ends_are_reliable(),
            Evaluator::Max(e) => e.dead_ends_are_reliable(),
            Evaluator::Heuristic(e) => e.dead_ends_are_reliable(),
        }
    }

    /// True if this evaluator memoizes per-state estimates across contexts.
    #[must_use]
    pub fn does_cache_estimates(&self) -> bool {
        match self {
            Evaluator::Heuristic(e) => e.does_cache_estimates(),
            _ => false,
        }
    }

    /// The memoized estimate for `state`, if any.
    #[must_use]
    pub fn cached_estimate(&self, state: &State) -> Option<i32> {
        match self {
            Evaluator::Heuristic(e) => e.cached_estimate(state),
            _ => None,
        }
    }

    pub fn notify_initial_state(&self, state: &State) {
        if let Evaluator::Heuristic(e) = self {
            e.notify_initial_state(state);
        }
    }

    pub fn notify_transition(&self, parent: &State, op: OperatorId, succ: &State) {
        if let Evaluator::Heuristic(e) = self {
            e.notify_transition(parent, op, succ);
        }
    }

    /// Human-readable description, mirroring the configuration grammar.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Evaluator::G(_) => "g".into(),
            Evaluator::Const(e) => format!("const({})", e.value()),
            Evaluator::Pref(_) => "pref".into(),
            Evaluator::Weighted(e) => {
                format!("weight({}, {})", e.evaluator().description(), e.weight())
            }
            Evaluator::Sum(e) => combined_description("sum", e.evaluators()),
            Evaluator::Max(e) => combined_description("max", e.evaluators()),
            Evaluator::Heuristic(e) => e.name().into(),
        }
    }
}

fn combined_description(name: &str, children: &[Rc<Evaluator>]) -> String {
    let inner: Vec<String> = children.iter().map(|c| c.description()).collect();
    format!("{name}([{}])", inner.join(", "))
}

/// Pointer-deduplicated, insertion-ordered set of path-dependent
/// evaluators.
#[derive(Default)]
pub struct PathDependentSet {
    seen: FxHashSet<EvaluatorId>,
    items: Vec<Rc<Evaluator>>,
}

impl PathDependentSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, eval: &Rc<Evaluator>) {
        if self.seen.insert(Evaluator::id(eval)) {
            self.items.push(Rc::clone(eval));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Evaluator>> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Walk the DAG under `eval` and collect every path-dependent heuristic.
///
/// A heuristic shared between several parents is collected once: the set
/// deduplicates by node identity, which is what guarantees it sees each
/// transition notification exactly once per search step.
pub fn collect_path_dependent(eval: &Rc<Evaluator>, set: &mut PathDependentSet) {
    match &**eval {
        Evaluator::Weighted(e) => collect_path_dependent(e.evaluator(), set),
        Evaluator::Sum(e) => {
            for child in e.evaluators() {
                collect_path_dependent(child, set);
            }
        }
        Evaluator::Max(e) => {
            for child in e.evaluators() {
                collect_path_dependent(child, set);
            }
        }
        Evaluator::Heuristic(e) => {
            if e.is_path_dependent() {
                set.insert(eval);
            }
        }
        Evaluator::G(_) | Evaluator::Const(_) | Evaluator::Pref(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_follows_the_allocation_not_the_handle() {
        let shared = Rc::new(Evaluator::G(GEvaluator));
        let other = Rc::new(Evaluator::G(GEvaluator));
        let alias = Rc::clone(&shared);
        assert_eq!(Evaluator::id(&shared), Evaluator::id(&alias));
        assert_ne!(Evaluator::id(&shared), Evaluator::id(&other));
    }

    #[test]
    fn reliability_composes_per_the_aggregate_rules() {
        let g = Rc::new(Evaluator::G(GEvaluator));
        let konst = Rc::new(Evaluator::Const(ConstEvaluator::new(0)));

        let sum = Evaluator::Sum(SumEvaluator::new(vec![Rc::clone(&g), Rc::clone(&konst)]));
        assert!(sum.dead_ends_are_reliable(), "sum: any reliable child");

        let max = Evaluator::Max(MaxEvaluator::new(vec![Rc::clone(&g), Rc::clone(&konst)]));
        assert!(!max.dead_ends_are_reliable(), "max: all children required");
    }

    #[test]
    fn descriptions_read_like_the_grammar() {
        let g = Rc::new(Evaluator::G(GEvaluator));
        let weighted = Evaluator::Weighted(WeightedEvaluator::new(Rc::clone(&g), 2));
        assert_eq!(weighted.description(), "weight(g, 2)");

        let sum = Evaluator::Sum(SumEvaluator::new(vec![
            Rc::clone(&g),
            Rc::new(Evaluator::Const(ConstEvaluator::new(3))),
        ]));
        assert_eq!(sum.description(), "sum([g, const(3)])");
    }

    #[test]
    fn path_dependent_set_deduplicates_shared_nodes() {
        let g = Rc::new(Evaluator::G(GEvaluator));
        let mut set = PathDependentSet::new();
        set.insert(&g);
        set.insert(&g);
        assert_eq!(set.len(), 1);
    }
}
