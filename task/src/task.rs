//! The immutable planning task: variables, operators, axioms, goal.

use std::fmt;

use crate::fact::{conditions_hold, FactPair};

/// Dense operator identifier, indexing [`PlanningTask::operators`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperatorId(usize);

impl OperatorId {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OperatorId({})", self.0)
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op{}", self.0)
    }
}

/// A state variable with a finite domain.
///
/// `axiom_layer` is `-1` for regular variables; derived variables carry the
/// stratification layer their axioms are evaluated in.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub domain_size: i32,
    pub axiom_layer: i32,
}

impl Variable {
    /// True if this variable is set by axioms rather than by operators.
    #[must_use]
    pub fn is_derived(&self) -> bool {
        self.axiom_layer >= 0
    }
}

/// A conditional effect: when `conditions` hold in the predecessor state,
/// applying the operator sets `fact`.
#[derive(Debug, Clone)]
pub struct Effect {
    pub conditions: Vec<FactPair>,
    pub fact: FactPair,
}

/// A ground operator.
#[derive(Debug, Clone)]
pub struct Operator {
    pub name: String,
    /// Preconditions: prevail conditions plus the pre-values of effects.
    pub preconditions: Vec<FactPair>,
    pub effects: Vec<Effect>,
    /// Original cost under the task metric (1 everywhere if the metric is off).
    pub cost: i32,
}

impl Operator {
    /// True if the operator is applicable in the given state vector.
    #[must_use]
    pub fn is_applicable(&self, values: &[i32]) -> bool {
        conditions_hold(&self.preconditions, values)
    }

    /// Apply this operator to `parent`, producing the raw successor vector.
    ///
    /// Effect conditions are evaluated against the predecessor state, so
    /// simultaneous effects do not observe each other. Axioms are NOT
    /// re-applied here; the caller runs the axiom evaluator afterwards.
    #[must_use]
    pub fn successor_values(&self, parent: &[i32]) -> Vec<i32> {
        let mut values = parent.to_vec();
        for effect in &self.effects {
            if conditions_hold(&effect.conditions, parent) {
                values[effect.fact.var] = effect.fact.value;
            }
        }
        values
    }
}

/// An axiom rule: when `conditions` hold, the derived `head` fact is set.
///
/// The condition list includes the head variable's required pre-value where
/// the input declared one.
#[derive(Debug, Clone)]
pub struct AxiomRule {
    pub conditions: Vec<FactPair>,
    pub head: FactPair,
}

/// The immutable planning task.
///
/// `initial_values` is the raw initial assignment as read from the input;
/// for derived variables it doubles as the axiom default value. Axioms have
/// not been applied to it; the state registry does that when it interns
/// the initial state.
#[derive(Debug, Clone)]
pub struct PlanningTask {
    pub variables: Vec<Variable>,
    pub mutex_groups: Vec<Vec<FactPair>>,
    pub initial_values: Vec<i32>,
    pub goal: Vec<FactPair>,
    pub operators: Vec<Operator>,
    pub axioms: Vec<AxiomRule>,
    /// True if the input declared a cost metric; false means unit costs.
    pub use_metric: bool,
}

impl PlanningTask {
    /// True if every operator has cost 1.
    #[must_use]
    pub fn is_unit_cost(&self) -> bool {
        self.operators.iter().all(|op| op.cost == 1)
    }

    /// True if the goal conjunction holds in the given state vector.
    #[must_use]
    pub fn is_goal_state(&self, values: &[i32]) -> bool {
        conditions_hold(&self.goal, values)
    }

    #[must_use]
    pub fn operator(&self, id: OperatorId) -> &Operator {
        &self.operators[id.index()]
    }

    /// Sum of original operator costs along a plan.
    #[must_use]
    pub fn plan_cost(&self, plan: &[OperatorId]) -> i32 {
        plan.iter().map(|&id| self.operator(id).cost).sum()
    }

    /// Highest axiom layer, or `-1` if the task has no derived variables.
    #[must_use]
    pub fn max_axiom_layer(&self) -> i32 {
        self.variables
            .iter()
            .map(|v| v.axiom_layer)
            .max()
            .unwrap_or(-1)
    }
}
