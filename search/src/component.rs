//! Task binding with structural sharing.
//!
//! A configuration is a DAG of task-independent factories. Binding it to a
//! task materializes task-specific components; because factories can be
//! shared (the same heuristic referenced from several places), binding
//! goes through a [`ComponentMap`] keyed by factory identity, so each
//! shared factory produces exactly one task-specific instance per task.
//! Open lists and engines are built fresh every time; only their
//! evaluators (the stateful, cache-carrying components) are shared.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use rustc_hash::FxHashMap;
use tracing::debug;

use foray_task::task::PlanningTask;

use crate::cost::CostType;
use crate::eager::{EagerSearch, EagerSearchParams};
use crate::engine::SearchEngine;
use crate::error::BuildError;
use crate::evaluation_result::INFTY;
use crate::evaluator::Evaluator;
use crate::evaluators::{
    ConstEvaluator, Estimator, GEvaluator, HeuristicEvaluator, MaxEvaluator, PrefEvaluator,
    SumEvaluator, WeightedEvaluator,
};
use crate::iterated::{IteratedSearch, IteratedSearchOptions};
use crate::open_list::{OpenList, StateOpenList};
use crate::open_lists::{AlternationOpenList, BestFirstOpenList, TieBreakingOpenList};

/// Identity-keyed cache of task-specific components, bound to one task.
pub struct ComponentMap {
    task: Rc<PlanningTask>,
    evaluators: FxHashMap<usize, Rc<Evaluator>>,
}

impl ComponentMap {
    #[must_use]
    pub fn new(task: Rc<PlanningTask>) -> Self {
        Self {
            task,
            evaluators: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn task(&self) -> &Rc<PlanningTask> {
        &self.task
    }

    /// Number of distinct evaluator factories materialized so far.
    #[must_use]
    pub fn evaluator_count(&self) -> usize {
        self.evaluators.len()
    }
}

/// The seam for task-independent heuristic configurations.
pub trait HeuristicFactory {
    fn name(&self) -> &str;

    /// Reject task features this heuristic cannot handle.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnsupportedTaskFeature`] on rejection.
    fn validate(&self, _task: &Rc<PlanningTask>) -> Result<(), BuildError> {
        Ok(())
    }

    fn build(&self, task: &Rc<PlanningTask>) -> Box<dyn Estimator>;
}

impl fmt::Debug for dyn HeuristicFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Task-independent description of an evaluator-tree node.
///
/// Shared `Rc` nodes in this tree become shared `Rc<Evaluator>` nodes in
/// the task-specific tree.
#[derive(Debug)]
pub enum EvaluatorFactory {
    G,
    Const(i32),
    Pref,
    Weighted {
        evaluator: Rc<EvaluatorFactory>,
        weight: i32,
    },
    Sum(Vec<Rc<EvaluatorFactory>>),
    Max(Vec<Rc<EvaluatorFactory>>),
    Heuristic {
        factory: Box<dyn HeuristicFactory>,
        cache_estimates: bool,
    },
}

impl EvaluatorFactory {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            EvaluatorFactory::G => "g",
            EvaluatorFactory::Const(_) => "const",
            EvaluatorFactory::Pref => "pref",
            EvaluatorFactory::Weighted { .. } => "weight",
            EvaluatorFactory::Sum(_) => "sum",
            EvaluatorFactory::Max(_) => "max",
            EvaluatorFactory::Heuristic { factory, .. } => factory.name(),
        }
    }

    /// True if the materialized evaluator will memoize per-state estimates.
    #[must_use]
    pub fn does_cache_estimates(&self) -> bool {
        matches!(
            self,
            EvaluatorFactory::Heuristic {
                cache_estimates: true,
                ..
            }
        )
    }

    /// Walk the DAG and let every heuristic veto the task.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildError`] raised by a heuristic factory.
    pub fn validate(&self, task: &Rc<PlanningTask>) -> Result<(), BuildError> {
        match self {
            EvaluatorFactory::G | EvaluatorFactory::Const(_) | EvaluatorFactory::Pref => Ok(()),
            EvaluatorFactory::Weighted { evaluator, .. } => evaluator.validate(task),
            EvaluatorFactory::Sum(children) | EvaluatorFactory::Max(children) => {
                children.iter().try_for_each(|child| child.validate(task))
            }
            EvaluatorFactory::Heuristic { factory, .. } => factory.validate(task),
        }
    }
}

/// Materialize `factory` against the map's task, reusing an existing
/// instance when this factory was bound before.
pub fn task_specific_evaluator(
    factory: &Rc<EvaluatorFactory>,
    map: &mut ComponentMap,
    depth: usize,
) -> Rc<Evaluator> {
    let key = Rc::as_ptr(factory) as usize;
    if let Some(existing) = map.evaluators.get(&key) {
        debug!(
            "{:indent$}reusing task-specific evaluator {}...",
            "",
            factory.name(),
            indent = depth
        );
        return Rc::clone(existing);
    }
    debug!(
        "{:indent$}creating task-specific evaluator {}...",
        "",
        factory.name(),
        indent = depth
    );
    let evaluator = match &**factory {
        EvaluatorFactory::G => Rc::new(Evaluator::G(GEvaluator)),
        EvaluatorFactory::Const(value) => Rc::new(Evaluator::Const(ConstEvaluator::new(*value))),
        EvaluatorFactory::Pref => Rc::new(Evaluator::Pref(PrefEvaluator)),
        EvaluatorFactory::Weighted { evaluator, weight } => {
            let child = task_specific_evaluator(evaluator, map, depth + 1);
            Rc::new(Evaluator::Weighted(WeightedEvaluator::new(child, *weight)))
        }
        EvaluatorFactory::Sum(children) => {
            let children = children
                .iter()
                .map(|child| task_specific_evaluator(child, map, depth + 1))
                .collect();
            Rc::new(Evaluator::Sum(SumEvaluator::new(children)))
        }
        EvaluatorFactory::Max(children) => {
            let children = children
                .iter()
                .map(|child| task_specific_evaluator(child, map, depth + 1))
                .collect();
            Rc::new(Evaluator::Max(MaxEvaluator::new(children)))
        }
        EvaluatorFactory::Heuristic {
            factory: heuristic,
            cache_estimates,
        } => {
            let estimator = heuristic.build(map.task());
            Rc::new(Evaluator::Heuristic(HeuristicEvaluator::new(
                estimator,
                *cache_estimates,
            )))
        }
    };
    map.evaluators.insert(key, Rc::clone(&evaluator));
    evaluator
}

/// Task-independent description of an open list.
#[derive(Debug)]
pub enum OpenListFactory {
    BestFirst {
        evaluator: Rc<EvaluatorFactory>,
        pref_only: bool,
    },
    TieBreaking {
        evaluators: Vec<Rc<EvaluatorFactory>>,
        pref_only: bool,
        unsafe_pruning: bool,
    },
    Alternation {
        sublists: Vec<Rc<OpenListFactory>>,
        boost: i64,
    },
}

impl OpenListFactory {
    /// # Errors
    ///
    /// Returns the first [`BuildError`] raised by a referenced heuristic.
    pub fn validate(&self, task: &Rc<PlanningTask>) -> Result<(), BuildError> {
        match self {
            OpenListFactory::BestFirst { evaluator, .. } => evaluator.validate(task),
            OpenListFactory::TieBreaking { evaluators, .. } => evaluators
                .iter()
                .try_for_each(|evaluator| evaluator.validate(task)),
            OpenListFactory::Alternation { sublists, .. } => sublists
                .iter()
                .try_for_each(|sublist| sublist.validate(task)),
        }
    }
}

/// Build a fresh open list; evaluators inside it are shared via the map.
pub fn task_specific_open_list(
    factory: &Rc<OpenListFactory>,
    map: &mut ComponentMap,
    depth: usize,
) -> StateOpenList {
    match &**factory {
        OpenListFactory::BestFirst {
            evaluator,
            pref_only,
        } => {
            let evaluator = task_specific_evaluator(evaluator, map, depth + 1);
            OpenList::BestFirst(BestFirstOpenList::new(evaluator, *pref_only))
        }
        OpenListFactory::TieBreaking {
            evaluators,
            pref_only,
            unsafe_pruning,
        } => {
            let evaluators = evaluators
                .iter()
                .map(|evaluator| task_specific_evaluator(evaluator, map, depth + 1))
                .collect();
            OpenList::TieBreaking(TieBreakingOpenList::new(
                evaluators,
                *pref_only,
                *unsafe_pruning,
            ))
        }
        OpenListFactory::Alternation { sublists, boost } => {
            let sublists = sublists
                .iter()
                .map(|sublist| task_specific_open_list(sublist, map, depth + 1))
                .collect();
            OpenList::Alternation(AlternationOpenList::new(sublists, *boost))
        }
    }
}

/// Task-independent description of an eager search.
#[derive(Debug)]
pub struct EagerFactory {
    pub open_list: Rc<OpenListFactory>,
    pub reopen_closed: bool,
    pub bound: i32,
    pub cost_type: CostType,
    pub max_time: Option<Duration>,
    pub f_evaluator: Option<Rc<EvaluatorFactory>>,
    pub preferred: Vec<Rc<EvaluatorFactory>>,
    pub lazy_evaluator: Option<Rc<EvaluatorFactory>>,
}

impl EagerFactory {
    /// Defaults: no reopening, unbounded, normal costs, no extras.
    #[must_use]
    pub fn new(open_list: Rc<OpenListFactory>) -> Self {
        Self {
            open_list,
            reopen_closed: false,
            bound: INFTY,
            cost_type: CostType::Normal,
            max_time: None,
            f_evaluator: None,
            preferred: Vec::new(),
            lazy_evaluator: None,
        }
    }
}

/// Task-independent description of an iterated search.
#[derive(Debug)]
pub struct IteratedFactory {
    pub engine_factories: Vec<Rc<SearchEngineFactory>>,
    pub options: IteratedSearchOptions,
}

/// Task-independent description of a search engine.
#[derive(Debug)]
pub enum SearchEngineFactory {
    Eager(EagerFactory),
    Iterated(IteratedFactory),
}

impl SearchEngineFactory {
    /// Validate the whole configuration DAG against the task. All
    /// configuration and task-support errors surface here, before any
    /// component is built; building afterwards is infallible.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::LazyEvaluatorDoesNotCache`] for an eager
    /// search whose lazy evaluator does not cache, or the first
    /// [`BuildError::UnsupportedTaskFeature`] raised by a heuristic.
    pub fn validate(&self, task: &Rc<PlanningTask>) -> Result<(), BuildError> {
        match self {
            SearchEngineFactory::Eager(eager) => {
                eager.open_list.validate(task)?;
                for evaluator in &eager.preferred {
                    evaluator.validate(task)?;
                }
                if let Some(evaluator) = &eager.f_evaluator {
                    evaluator.validate(task)?;
                }
                if let Some(lazy) = &eager.lazy_evaluator {
                    lazy.validate(task)?;
                    if !lazy.does_cache_estimates() {
                        return Err(BuildError::LazyEvaluatorDoesNotCache {
                            description: lazy.name().to_string(),
                        });
                    }
                }
                Ok(())
            }
            SearchEngineFactory::Iterated(iterated) => iterated
                .engine_factories
                .iter()
                .try_for_each(|factory| factory.validate(task)),
        }
    }
}

/// Materialize a search engine. Call
/// [`SearchEngineFactory::validate`] first; construction assumes a valid
/// configuration.
pub fn build_search_engine(
    factory: &Rc<SearchEngineFactory>,
    map: &mut ComponentMap,
    depth: usize,
) -> Box<dyn SearchEngine> {
    match &**factory {
        SearchEngineFactory::Eager(eager) => {
            debug!(
                "{:indent$}creating task-specific eager search...",
                "",
                indent = depth
            );
            let open_list = task_specific_open_list(&eager.open_list, map, depth + 1);
            let mut params = EagerSearchParams::new(open_list);
            params.reopen_closed = eager.reopen_closed;
            params.bound = eager.bound;
            params.cost_type = eager.cost_type;
            params.max_time = eager.max_time;
            params.f_evaluator = eager
                .f_evaluator
                .as_ref()
                .map(|f| task_specific_evaluator(f, map, depth + 1));
            params.preferred_operator_evaluators = eager
                .preferred
                .iter()
                .map(|evaluator| task_specific_evaluator(evaluator, map, depth + 1))
                .collect();
            params.lazy_evaluator = eager
                .lazy_evaluator
                .as_ref()
                .map(|lazy| task_specific_evaluator(lazy, map, depth + 1));
            Box::new(EagerSearch::new(Rc::clone(map.task()), params))
        }
        SearchEngineFactory::Iterated(iterated) => {
            debug!(
                "{:indent$}creating task-specific iterated search...",
                "",
                indent = depth
            );
            Box::new(IteratedSearch::new(
                Rc::clone(map.task()),
                iterated.engine_factories.clone(),
                iterated.options.clone(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foray_task::fact::FactPair;
    use foray_task::task::Variable;

    fn tiny_task() -> Rc<PlanningTask> {
        Rc::new(PlanningTask {
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
        })
    }

    #[test]
    fn shared_factories_materialize_once() {
        let g = Rc::new(EvaluatorFactory::G);
        // sum([g, g]) and a separate reference to g: three references, one
        // instance.
        let sum = Rc::new(EvaluatorFactory::Sum(vec![Rc::clone(&g), Rc::clone(&g)]));

        let mut map = ComponentMap::new(tiny_task());
        let sum_eval = task_specific_evaluator(&sum, &mut map, 0);
        let g_eval = task_specific_evaluator(&g, &mut map, 0);

        assert_eq!(map.evaluator_count(), 2, "one sum node, one g node");
        match &*sum_eval {
            Evaluator::Sum(children) => {
                assert!(
                    Rc::ptr_eq(&children.evaluators()[0], &g_eval),
                    "the sum child must be the shared g instance"
                );
                assert!(Rc::ptr_eq(
                    &children.evaluators()[0],
                    &children.evaluators()[1]
                ));
            }
            other => panic!("expected a sum evaluator, got {other:?}"),
        }
    }

    #[test]
    fn distinct_factories_stay_distinct() {
        let first = Rc::new(EvaluatorFactory::G);
        let second = Rc::new(EvaluatorFactory::G);
        let mut map = ComponentMap::new(tiny_task());
        let first_eval = task_specific_evaluator(&first, &mut map, 0);
        let second_eval = task_specific_evaluator(&second, &mut map, 0);
        assert!(!Rc::ptr_eq(&first_eval, &second_eval));
        assert_eq!(map.evaluator_count(), 2);
    }

    #[test]
    fn lazy_evaluator_must_cache() {
        let g = Rc::new(EvaluatorFactory::G);
        let open_list = Rc::new(OpenListFactory::BestFirst {
            evaluator: Rc::clone(&g),
            pref_only: false,
        });
        let mut eager = EagerFactory::new(open_list);
        eager.lazy_evaluator = Some(Rc::clone(&g));
        let factory = SearchEngineFactory::Eager(eager);

        let err = factory.validate(&tiny_task()).unwrap_err();
        assert!(
            matches!(err, BuildError::LazyEvaluatorDoesNotCache { .. }),
            "got {err:?}"
        );
    }
}
