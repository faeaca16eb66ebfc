//! Eager best-first graph search.
//!
//! One `step` expands one state: pop entries until a live one surfaces
//! (stale and dead entries are filtered by node status), optionally
//! re-evaluate under the lazy evaluator, close and goal-check the node,
//! then generate successors, route them through duplicate detection, and
//! insert the survivors with freshly evaluated keys. Reopening returns
//! closed nodes to the open list when a strictly cheaper path appears;
//! with reopening disabled only the parent edge is rewritten.

use std::rc::Rc;
use std::time::Duration;

use rustc_hash::FxHashSet;
use tracing::info;

use foray_task::successor::SuccessorGenerator;
use foray_task::task::{OperatorId, PlanningTask};

use crate::cost::{adjusted_cost, CostType};
use crate::engine::{Plan, SearchEngine, SearchStatus};
use crate::evaluation_context::EvaluationContext;
use crate::evaluation_result::INFTY;
use crate::evaluator::{collect_path_dependent, Evaluator, PathDependentSet};
use crate::open_list::StateOpenList;
use crate::progress::SearchProgress;
use crate::pruning::{NullPruning, PruningMethod};
use crate::search_space::{NodeStatus, SearchSpace};
use crate::state_registry::{RegistryError, StateRegistry};
use crate::statistics::SearchStatistics;

/// Construction parameters for [`EagerSearch`].
pub struct EagerSearchParams {
    pub open_list: StateOpenList,
    pub reopen_closed: bool,
    /// Cost ceiling: plans must cost strictly less (original costs).
    pub bound: i32,
    pub cost_type: CostType,
    pub max_time: Option<Duration>,
    pub f_evaluator: Option<Rc<Evaluator>>,
    pub preferred_operator_evaluators: Vec<Rc<Evaluator>>,
    pub lazy_evaluator: Option<Rc<Evaluator>>,
    pub pruning: Box<dyn PruningMethod>,
}

impl EagerSearchParams {
    /// Defaults: no reopening, unbounded, normal costs, no time limit, no
    /// extra evaluators, null pruning.
    #[must_use]
    pub fn new(open_list: StateOpenList) -> Self {
        Self {
            open_list,
            reopen_closed: false,
            bound: INFTY,
            cost_type: CostType::Normal,
            max_time: None,
            f_evaluator: None,
            preferred_operator_evaluators: Vec::new(),
            lazy_evaluator: None,
            pruning: Box::new(NullPruning),
        }
    }
}

/// The eager best-first search engine.
pub struct EagerSearch {
    task: Rc<PlanningTask>,
    registry: StateRegistry,
    space: SearchSpace,
    successor_generator: SuccessorGenerator,
    statistics: Rc<SearchStatistics>,
    progress: SearchProgress,

    open_list: StateOpenList,
    f_evaluator: Option<Rc<Evaluator>>,
    preferred_operator_evaluators: Vec<Rc<Evaluator>>,
    lazy_evaluator: Option<Rc<Evaluator>>,
    path_dependent: PathDependentSet,
    pruning: Box<dyn PruningMethod>,

    reopen_closed: bool,
    bound: i32,
    cost_type: CostType,
    max_time: Option<Duration>,

    plans: Vec<(Plan, i32)>,
    initialized: bool,
}

impl EagerSearch {
    /// # Panics
    ///
    /// Panics if a lazy evaluator that does not cache estimates is
    /// supplied. Factory validation rejects that configuration with a
    /// proper error before construction; reaching the assert means the
    /// caller skipped validation.
    #[must_use]
    pub fn new(task: Rc<PlanningTask>, params: EagerSearchParams) -> Self {
        let EagerSearchParams {
            open_list,
            reopen_closed,
            bound,
            cost_type,
            max_time,
            f_evaluator,
            preferred_operator_evaluators,
            lazy_evaluator,
            pruning,
        } = params;

        if let Some(lazy) = &lazy_evaluator {
            assert!(
                lazy.does_cache_estimates(),
                "lazy evaluator {} must cache its estimates",
                lazy.description()
            );
        }

        let mut path_dependent = PathDependentSet::new();
        open_list.collect_path_dependent(&mut path_dependent);
        for evaluator in &preferred_operator_evaluators {
            collect_path_dependent(evaluator, &mut path_dependent);
        }
        if let Some(evaluator) = &f_evaluator {
            collect_path_dependent(evaluator, &mut path_dependent);
        }
        if let Some(evaluator) = &lazy_evaluator {
            collect_path_dependent(evaluator, &mut path_dependent);
        }

        let registry = StateRegistry::new(Rc::clone(&task));
        let successor_generator = SuccessorGenerator::new(&task);

        Self {
            task,
            registry,
            space: SearchSpace::new(),
            successor_generator,
            statistics: Rc::new(SearchStatistics::new()),
            progress: SearchProgress::new(),
            open_list,
            f_evaluator,
            preferred_operator_evaluators,
            lazy_evaluator,
            path_dependent,
            pruning,
            reopen_closed,
            bound,
            cost_type,
            max_time,
            plans: Vec::new(),
            initialized: false,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &StateRegistry {
        &self.registry
    }

    #[must_use]
    pub fn search_space(&self) -> &SearchSpace {
        &self.space
    }

    /// Register the initial state, notify path-dependent evaluators, and
    /// seed the open list (unless the initial state is already a dead end).
    fn initialize(&mut self) -> Result<(), RegistryError> {
        info!(
            "Conducting best first search {} reopening closed nodes, (real) bound = {}",
            if self.reopen_closed { "with" } else { "without" },
            self.bound
        );

        let initial = self.registry.initial_state()?;
        for evaluator in self.path_dependent.iter() {
            evaluator.notify_initial_state(&initial);
        }

        // The initial state counts as reached by a preferred operator.
        let mut ctx = EvaluationContext::new(
            initial.clone(),
            0,
            true,
            Some(Rc::clone(&self.statistics)),
        );
        self.statistics.inc_evaluated_states();

        if self.open_list.is_dead_end(&mut ctx) {
            info!("Initial state is a dead end.");
        } else {
            if self.progress.check_progress(&ctx) {
                self.statistics.print_checkpoint_line(0);
            }
            if let Some(f_evaluator) = &self.f_evaluator {
                let f = ctx.value_or_infinity(f_evaluator);
                if f != INFTY {
                    self.statistics.report_f_value_progress(f);
                }
            }
            self.space.node(initial.id()).open_initial();
            self.open_list.insert(&mut ctx, initial.id());
        }

        self.pruning.initialize(&self.task);
        Ok(())
    }
}

impl SearchEngine for EagerSearch {
    #[allow(clippy::too_many_lines)]
    fn step(&mut self) -> SearchStatus {
        if !self.initialized {
            self.initialized = true;
            if let Err(RegistryError::OutOfMemory { states }) = self.initialize() {
                info!("Ran out of memory registering the initial state ({states} states).");
                return SearchStatus::OutOfMemory;
            }
        }

        // Dequeue until an expandable node surfaces.
        let (id, state) = loop {
            let Some(id) = self.open_list.pop() else {
                info!("Completely explored state space -- no solution!");
                return SearchStatus::Failed;
            };
            let state = self.registry.lookup(id);
            let node = self.space.info(id);
            if matches!(node.status, NodeStatus::Closed | NodeStatus::DeadEnd) {
                // Stale entry: the state was expanded or marked dead after
                // this entry was inserted.
                continue;
            }

            let mut ctx = EvaluationContext::new(
                state.clone(),
                node.g,
                false,
                Some(Rc::clone(&self.statistics)),
            );

            if let Some(lazy) = &self.lazy_evaluator {
                // Only lazy evaluators can leave dead nodes in the open
                // list: a state inserted twice keeps its first (finite)
                // cached estimate until re-evaluation discovers the truth.
                if let Some(old_h) = lazy.cached_estimate(&state) {
                    let new_h = ctx.value_or_infinity(lazy);
                    if self.open_list.is_dead_end(&mut ctx) {
                        self.space.node(id).mark_dead_end();
                        self.statistics.inc_dead_ends();
                        continue;
                    }
                    if new_h != old_h {
                        // The popped entry is superseded; reinsert under
                        // the new value instead of expanding.
                        self.open_list.insert(&mut ctx, id);
                        continue;
                    }
                }
            }

            self.space.node(id).close();
            if let Some(f_evaluator) = &self.f_evaluator {
                let f = ctx.value_or_infinity(f_evaluator);
                if f != INFTY {
                    self.statistics.report_f_value_progress(f);
                }
            }
            break (id, state);
        };

        if self.task.is_goal_state(state.values()) {
            let plan = self.space.trace_path(id);
            // Recomputed from the trace: with reopening disabled the node's
            // g-value is not trusted for output.
            let cost = self.task.plan_cost(&plan);
            info!("Solution found!");
            info!("Plan length: {} step(s). Plan cost: {cost}.", plan.len());
            self.plans.push((plan, cost));
            return SearchStatus::Solved;
        }

        // Only nodes that get their successors generated count as expanded;
        // a popped goal node does not.
        self.statistics.inc_expanded();
        let node = self.space.info(id);

        let mut applicable = Vec::new();
        self.successor_generator
            .applicable_ops(&self.task, state.values(), &mut applicable);
        self.pruning.prune_operators(&state, &mut applicable);

        // Query the expanded state again, this time asking for preferred
        // operators. Duplicates are ignored; only membership matters below.
        let mut preferred: FxHashSet<OperatorId> = FxHashSet::default();
        if !self.preferred_operator_evaluators.is_empty() {
            let mut pref_ctx = EvaluationContext::for_preferred_operators(
                state.clone(),
                node.g,
                false,
                Some(Rc::clone(&self.statistics)),
            );
            for evaluator in &self.preferred_operator_evaluators {
                if pref_ctx.is_infinite(evaluator) {
                    continue;
                }
                preferred.extend(pref_ctx.preferred_operators(evaluator).iter().copied());
            }
        }

        for op_id in applicable {
            let op = self.task.operator(op_id);
            if node.real_g + op.cost >= self.bound {
                continue;
            }

            let succ = match self.registry.successor_state(&state, op_id) {
                Ok(succ) => succ,
                Err(RegistryError::OutOfMemory { states }) => {
                    info!("Ran out of memory after {states} registered states.");
                    return SearchStatus::OutOfMemory;
                }
            };
            self.statistics.inc_generated();
            let is_preferred = preferred.contains(&op_id);

            for evaluator in self.path_dependent.iter() {
                evaluator.notify_transition(&state, op_id, &succ);
            }

            let succ_node = self.space.info(succ.id());
            match succ_node.status {
                // Previously discovered dead end; never re-evaluate.
                NodeStatus::DeadEnd => continue,

                NodeStatus::New => {
                    let succ_g = node.g + adjusted_cost(op, self.cost_type);
                    let succ_real_g = node.real_g + op.cost;
                    let mut ctx = EvaluationContext::new(
                        succ.clone(),
                        succ_g,
                        is_preferred,
                        Some(Rc::clone(&self.statistics)),
                    );
                    self.statistics.inc_evaluated_states();

                    if self.open_list.is_dead_end(&mut ctx) {
                        self.space.node(succ.id()).mark_dead_end();
                        self.statistics.inc_dead_ends();
                        continue;
                    }
                    self.space
                        .node(succ.id())
                        .open((id, op_id), succ_g, succ_real_g);
                    self.open_list.insert(&mut ctx, succ.id());

                    if self.progress.check_progress(&ctx) {
                        self.statistics.print_checkpoint_line(succ_g);
                        self.open_list.boost_preferred();
                    }
                }

                NodeStatus::Open | NodeStatus::Closed => {
                    let new_g = node.g + adjusted_cost(op, self.cost_type);
                    if succ_node.g <= new_g {
                        continue;
                    }
                    // A strictly cheaper path to an open or closed state.
                    let new_real_g = node.real_g + op.cost;
                    if self.reopen_closed {
                        if succ_node.status == NodeStatus::Closed {
                            self.statistics.inc_reopened();
                        }
                        self.space
                            .node(succ.id())
                            .reopen((id, op_id), new_g, new_real_g);
                        let mut ctx = EvaluationContext::new(
                            succ.clone(),
                            new_g,
                            is_preferred,
                            Some(Rc::clone(&self.statistics)),
                        );
                        self.open_list.insert(&mut ctx, succ.id());
                    } else {
                        // Keep the cheaper edge but do not reinsert. The
                        // g-value and the traced path may diverge from
                        // here on; plan costs are recomputed from traces.
                        self.space
                            .node(succ.id())
                            .update_parent((id, op_id), new_g, new_real_g);
                    }
                }
            }
        }

        SearchStatus::InProgress
    }

    fn max_time(&self) -> Option<Duration> {
        self.max_time
    }

    fn set_bound(&mut self, bound: i32) {
        self.bound = bound;
    }

    fn plan(&self) -> Option<&Plan> {
        self.plans.last().map(|(plan, _)| plan)
    }

    fn found_plans(&self) -> &[(Plan, i32)] {
        &self.plans
    }

    fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    fn print_statistics(&self) {
        self.statistics.print_detailed();
        info!("Number of registered states: {}", self.registry.size());
        self.pruning.print_statistics();
    }
}
