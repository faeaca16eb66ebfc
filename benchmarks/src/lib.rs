//! Shared helpers for the foray benchmark suites.

#![forbid(unsafe_code)]

use std::rc::Rc;

use foray_task::fact::FactPair;
use foray_task::task::{Effect, Operator, PlanningTask, Variable};

/// A grid task: `width × width` positions encoded in two variables, four
/// move operators per axis step, goal in the far corner. Unit costs.
///
/// Small enough to build per-iteration, big enough to exercise interning
/// and open-list churn with thousands of states.
#[must_use]
pub fn grid_task(width: i32) -> Rc<PlanningTask> {
    assert!(width >= 2);
    let axis_var = |axis: usize| Variable {
        name: format!("axis{axis}"),
        domain_size: width,
        axiom_layer: -1,
    };
    let mut operators = Vec::new();
    for axis in 0..2 {
        for position in 0..width - 1 {
            for (name, from, to) in [("inc", position, position + 1), ("dec", position + 1, position)] {
                operators.push(Operator {
                    name: format!("{name}-{axis}-{from}"),
                    preconditions: vec![FactPair::new(axis, from)],
                    effects: vec![Effect {
                        conditions: Vec::new(),
                        fact: FactPair::new(axis, to),
                    }],
                    cost: 1,
                });
            }
        }
    }
    Rc::new(PlanningTask {
        variables: vec![axis_var(0), axis_var(1)],
        mutex_groups: Vec::new(),
        initial_values: vec![0, 0],
        goal: vec![FactPair::new(0, width - 1), FactPair::new(1, width - 1)],
        operators,
        axioms: Vec::new(),
        use_metric: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_task_shape() {
        let task = grid_task(4);
        assert_eq!(task.variables.len(), 2);
        // 2 axes × 3 steps × 2 directions.
        assert_eq!(task.operators.len(), 12);
        assert!(task.is_unit_cost());
    }
}
