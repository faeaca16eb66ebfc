//! Iterated search: an outer loop over engine factories.
//!
//! Each step builds one task-specific sub-engine (lazily, one per
//! iteration) through a component map owned by the controller, so shared
//! heuristic subtrees (and the path information they accumulate) persist
//! across iterations. Every solved iteration's plan cost feeds the next
//! iteration's bound when `pass_bound` is on.

use std::rc::Rc;
use std::time::Duration;

use tracing::info;

use foray_task::task::PlanningTask;

use crate::component::{build_search_engine, ComponentMap, SearchEngineFactory};
use crate::engine::{Plan, SearchEngine, SearchStatus};
use crate::evaluation_result::INFTY;
use crate::statistics::SearchStatistics;

/// Controller options.
#[derive(Debug, Clone)]
pub struct IteratedSearchOptions {
    /// Hand each iteration the best plan cost so far as its bound.
    pub pass_bound: bool,
    /// After the last configuration, keep re-running it while it solves.
    pub repeat_last: bool,
    /// Keep iterating after a failed iteration.
    pub continue_on_fail: bool,
    /// Keep iterating after a solved iteration.
    pub continue_on_solve: bool,
    /// Initial cost ceiling.
    pub bound: i32,
    pub max_time: Option<Duration>,
}

impl Default for IteratedSearchOptions {
    fn default() -> Self {
        Self {
            pass_bound: true,
            repeat_last: false,
            continue_on_fail: false,
            continue_on_solve: true,
            bound: INFTY,
            max_time: None,
        }
    }
}

/// The iterated search controller.
pub struct IteratedSearch {
    task: Rc<PlanningTask>,
    component_map: ComponentMap,
    engine_factories: Vec<Rc<SearchEngineFactory>>,
    options: IteratedSearchOptions,

    phase: usize,
    last_phase_found_solution: bool,
    best_bound: i32,
    statistics: SearchStatistics,
    /// Improving plans in discovery order; cost strictly decreasing.
    plans: Vec<(Plan, i32)>,
}

impl IteratedSearch {
    /// # Panics
    ///
    /// Panics if `engine_factories` is empty.
    #[must_use]
    pub fn new(
        task: Rc<PlanningTask>,
        engine_factories: Vec<Rc<SearchEngineFactory>>,
        options: IteratedSearchOptions,
    ) -> Self {
        assert!(
            !engine_factories.is_empty(),
            "iterated search requires at least one engine configuration"
        );
        let best_bound = options.bound;
        Self {
            component_map: ComponentMap::new(Rc::clone(&task)),
            task,
            engine_factories,
            options,
            phase: 0,
            last_phase_found_solution: false,
            best_bound,
            statistics: SearchStatistics::new(),
            plans: Vec::new(),
        }
    }

    /// The factory for the next iteration, or `None` when done.
    fn current_factory(&self) -> Option<Rc<SearchEngineFactory>> {
        if self.phase < self.engine_factories.len() {
            return Some(Rc::clone(&self.engine_factories[self.phase]));
        }
        // Past the configured list: repeat the last configuration, but only
        // while it keeps solving: re-running a failed deterministic search
        // would fail identically, whatever `continue_on_fail` says.
        if self.options.repeat_last && self.last_phase_found_solution {
            return self.engine_factories.last().map(Rc::clone);
        }
        None
    }

    fn final_status(&self) -> SearchStatus {
        if self.plans.is_empty() {
            SearchStatus::Failed
        } else {
            SearchStatus::Solved
        }
    }

    fn step_return_value(&self) -> SearchStatus {
        if !self.plans.is_empty() {
            info!("Best solution cost so far: {}", self.best_bound);
        }
        if self.last_phase_found_solution {
            if self.options.continue_on_solve {
                info!("Solution found - keep searching");
                SearchStatus::InProgress
            } else {
                info!("Solution found - stop searching");
                SearchStatus::Solved
            }
        } else if self.options.continue_on_fail {
            info!("No solution found - keep searching");
            SearchStatus::InProgress
        } else {
            info!("No solution found - stop searching");
            self.final_status()
        }
    }
}

impl SearchEngine for IteratedSearch {
    fn step(&mut self) -> SearchStatus {
        let Some(factory) = self.current_factory() else {
            return self.final_status();
        };
        info!("Starting search iteration {}", self.phase + 1);
        let mut engine = build_search_engine(&factory, &mut self.component_map, 1);
        if self.options.pass_bound {
            engine.set_bound(self.best_bound);
        }
        self.phase += 1;

        let status = engine.search();

        self.last_phase_found_solution = status == SearchStatus::Solved;
        if self.last_phase_found_solution {
            if let Some(plan) = engine.plan() {
                let cost = self.task.plan_cost(plan);
                if cost < self.best_bound {
                    self.plans.push((plan.clone(), cost));
                    self.best_bound = cost;
                }
            }
        }

        engine.print_statistics();
        self.statistics.accumulate(engine.statistics());

        match status {
            SearchStatus::Timeout | SearchStatus::OutOfMemory => status,
            SearchStatus::Solved | SearchStatus::Failed => self.step_return_value(),
            SearchStatus::InProgress => {
                unreachable!("sub-engine search() never returns InProgress")
            }
        }
    }

    fn max_time(&self) -> Option<Duration> {
        self.options.max_time
    }

    fn set_bound(&mut self, bound: i32) {
        self.best_bound = bound;
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
        info!("Cumulative statistics:");
        self.statistics.print_detailed();
    }
}
