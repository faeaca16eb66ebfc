//! Blind heuristic: 0 on goal states, cheapest operator cost elsewhere.

use std::rc::Rc;

use foray_task::task::PlanningTask;

use crate::component::HeuristicFactory;
use crate::evaluators::{Estimate, EstimateResult, Estimator};
use crate::state_registry::State;

/// Admissible baseline estimate. On a task with no operators every
/// non-goal state is a provable dead end, so dead-end reports are
/// reliable.
pub struct BlindHeuristic {
    task: Rc<PlanningTask>,
    min_operator_cost: Option<i32>,
}

impl BlindHeuristic {
    #[must_use]
    pub fn new(task: Rc<PlanningTask>) -> Self {
        let min_operator_cost = task.operators.iter().map(|op| op.cost).min();
        Self {
            task,
            min_operator_cost,
        }
    }
}

/// Task-independent configuration of [`BlindHeuristic`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BlindFactory;

impl HeuristicFactory for BlindFactory {
    fn name(&self) -> &str {
        "blind"
    }

    fn build(&self, task: &Rc<PlanningTask>) -> Box<dyn Estimator> {
        Box::new(BlindHeuristic::new(Rc::clone(task)))
    }
}

impl Estimator for BlindHeuristic {
    fn name(&self) -> &str {
        "blind"
    }

    fn compute(&self, state: &State) -> EstimateResult {
        if self.task.is_goal_state(state.values()) {
            return EstimateResult::value(0);
        }
        match self.min_operator_cost {
            Some(cost) => EstimateResult::value(cost),
            None => EstimateResult::dead_end(),
        }
    }

    fn dead_ends_are_reliable(&self) -> bool {
        true
    }
}
