//! Shared helpers for search integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use foray_search::component::HeuristicFactory;
use foray_search::evaluators::{Estimate, EstimateResult, Estimator};
use foray_search::state_registry::State;
use foray_task::axioms::AxiomEvaluator;
use foray_task::fact::FactPair;
use foray_task::task::{Effect, Operator, OperatorId, PlanningTask, Variable};

/// Builds small tasks programmatically.
pub struct TaskBuilder {
    variables: Vec<Variable>,
    initial: Vec<i32>,
    goal: Vec<FactPair>,
    operators: Vec<Operator>,
}

impl TaskBuilder {
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            initial: Vec::new(),
            goal: Vec::new(),
            operators: Vec::new(),
        }
    }

    /// Add a variable with the given domain size, initially 0.
    pub fn var(mut self, domain_size: i32) -> Self {
        self.variables.push(Variable {
            name: format!("v{}", self.variables.len()),
            domain_size,
            axiom_layer: -1,
        });
        self.initial.push(0);
        self
    }

    pub fn init(mut self, values: &[i32]) -> Self {
        self.initial = values.to_vec();
        self
    }

    pub fn goal(mut self, var: usize, value: i32) -> Self {
        self.goal.push(FactPair::new(var, value));
        self
    }

    /// Add an operator with unconditional effects.
    pub fn op(mut self, name: &str, pre: &[(usize, i32)], post: &[(usize, i32)], cost: i32) -> Self {
        self.operators.push(Operator {
            name: name.to_string(),
            preconditions: pre.iter().map(|&(var, value)| FactPair::new(var, value)).collect(),
            effects: post
                .iter()
                .map(|&(var, value)| Effect {
                    conditions: Vec::new(),
                    fact: FactPair::new(var, value),
                })
                .collect(),
            cost,
        });
        self
    }

    pub fn build(self) -> Rc<PlanningTask> {
        Rc::new(PlanningTask {
            variables: self.variables,
            mutex_groups: Vec::new(),
            initial_values: self.initial,
            goal: self.goal,
            operators: self.operators,
            axioms: Vec::new(),
            use_metric: true,
        })
    }
}

/// Execute `plan` from the initial state, asserting applicability at every
/// step and goal satisfaction at the end; returns the real plan cost.
pub fn validate_plan(task: &Rc<PlanningTask>, plan: &[OperatorId]) -> i32 {
    let axioms = AxiomEvaluator::new(task);
    let mut values = task.initial_values.clone();
    axioms.evaluate(&mut values);
    let mut cost = 0;
    for &op_id in plan {
        let op = task.operator(op_id);
        assert!(
            op.is_applicable(&values),
            "plan step {} is not applicable",
            op.name
        );
        values = op.successor_values(&values);
        axioms.evaluate(&mut values);
        cost += op.cost;
    }
    assert!(task.is_goal_state(&values), "plan does not reach the goal");
    cost
}

/// Operator id of the operator with the given name.
pub fn op_id(task: &PlanningTask, name: &str) -> OperatorId {
    let index = task
        .operators
        .iter()
        .position(|op| op.name == name)
        .unwrap_or_else(|| panic!("no operator named {name}"));
    OperatorId::new(index)
}

/// A scripted estimator: h is computed by a closure over the state values;
/// preferred operators likewise. A shared mode cell lets tests flip
/// behavior mid-search, and counters expose how often the estimator was
/// consulted and notified.
pub struct ScriptedEstimator {
    pub name: String,
    pub h: Box<dyn Fn(&[i32], u8) -> Estimate>,
    pub preferred: Box<dyn Fn(&[i32]) -> Vec<OperatorId>>,
    pub mode: Rc<Cell<u8>>,
    pub path_dependent: bool,
    pub reliable: bool,
    pub computations: Rc<Cell<u64>>,
    pub transitions_seen: Rc<Cell<u64>>,
}

impl ScriptedEstimator {
    pub fn from_h(name: &str, h: impl Fn(&[i32]) -> i32 + 'static) -> Self {
        Self {
            name: name.to_string(),
            h: Box::new(move |values, _mode| Estimate::Value(h(values))),
            preferred: Box::new(|_| Vec::new()),
            mode: Rc::new(Cell::new(0)),
            path_dependent: false,
            reliable: false,
            computations: Rc::new(Cell::new(0)),
            transitions_seen: Rc::new(Cell::new(0)),
        }
    }
}

impl Estimator for ScriptedEstimator {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, state: &State) -> EstimateResult {
        self.computations.set(self.computations.get() + 1);
        let mut result = match (self.h)(state.values(), self.mode.get()) {
            Estimate::DeadEnd => EstimateResult::dead_end(),
            Estimate::Value(value) => EstimateResult::value(value),
        };
        result.preferred_operators = (self.preferred)(state.values());
        result
    }

    fn dead_ends_are_reliable(&self) -> bool {
        self.reliable
    }

    fn is_path_dependent(&self) -> bool {
        self.path_dependent
    }

    fn notify_transition(&self, _parent: &State, _op: OperatorId, _succ: &State) {
        self.transitions_seen.set(self.transitions_seen.get() + 1);
    }
}

/// A heuristic factory handing out pre-built scripted estimators, one per
/// `build` call. Lets sharing tests count how many instances the component
/// map actually materializes.
pub struct ScriptedFactory {
    pub name: String,
    pub estimators: std::cell::RefCell<Vec<ScriptedEstimator>>,
    pub builds: Rc<Cell<u64>>,
}

impl ScriptedFactory {
    pub fn single(estimator: ScriptedEstimator) -> Self {
        Self {
            name: estimator.name.clone(),
            estimators: std::cell::RefCell::new(vec![estimator]),
            builds: Rc::new(Cell::new(0)),
        }
    }
}

impl HeuristicFactory for ScriptedFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, _task: &Rc<PlanningTask>) -> Box<dyn Estimator> {
        self.builds.set(self.builds.get() + 1);
        let estimator = self
            .estimators
            .borrow_mut()
            .pop()
            .expect("factory built more instances than prepared");
        Box::new(estimator)
    }
}
