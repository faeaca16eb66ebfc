//! Goal-count heuristic with achiever-based preferred operators.

use std::rc::Rc;

use rustc_hash::FxHashSet;

use foray_task::task::{OperatorId, PlanningTask};

use crate::component::HeuristicFactory;
use crate::evaluators::{EstimateResult, Estimator};
use crate::state_registry::State;

/// Number of unsatisfied goal facts. Not admissible; never reports dead
/// ends. Operators with an effect that achieves a currently unsatisfied
/// goal fact are reported as preferred, in goal order then operator order.
pub struct GoalCountHeuristic {
    task: Rc<PlanningTask>,
    /// For each goal fact (by position), the operators achieving it.
    achievers: Vec<Vec<OperatorId>>,
}

impl GoalCountHeuristic {
    #[must_use]
    pub fn new(task: Rc<PlanningTask>) -> Self {
        let achievers = task
            .goal
            .iter()
            .map(|&goal_fact| {
                task.operators
                    .iter()
                    .enumerate()
                    .filter(|(_, op)| op.effects.iter().any(|e| e.fact == goal_fact))
                    .map(|(index, _)| OperatorId::new(index))
                    .collect()
            })
            .collect();
        Self { task, achievers }
    }
}

/// Task-independent configuration of [`GoalCountHeuristic`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GoalCountFactory;

impl HeuristicFactory for GoalCountFactory {
    fn name(&self) -> &str {
        "goalcount"
    }

    fn build(&self, task: &Rc<PlanningTask>) -> Box<dyn Estimator> {
        Box::new(GoalCountHeuristic::new(Rc::clone(task)))
    }
}

impl Estimator for GoalCountHeuristic {
    fn name(&self) -> &str {
        "goalcount"
    }

    fn compute(&self, state: &State) -> EstimateResult {
        let mut unsatisfied = 0;
        let mut preferred = Vec::new();
        let mut seen = FxHashSet::default();
        for (index, goal_fact) in self.task.goal.iter().enumerate() {
            if goal_fact.holds_in(state.values()) {
                continue;
            }
            unsatisfied += 1;
            for &op in &self.achievers[index] {
                if seen.insert(op) {
                    preferred.push(op);
                }
            }
        }
        let mut result = EstimateResult::value(unsatisfied);
        result.preferred_operators = preferred;
        result
    }
}
