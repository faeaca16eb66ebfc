//! Layered fixpoint evaluation of derived variables.
//!
//! Derived variables are reset to their default value (their value in the
//! initial-state section of the input), then the rules of each axiom layer
//! are applied to fixpoint in layer order. Rules of a layer may depend on
//! derived variables of strictly lower layers and, recursively, on variables
//! of the same layer.

use crate::fact::conditions_hold;
use crate::task::{AxiomRule, PlanningTask};

/// Evaluates axioms on a state vector.
///
/// Built once per task; owns copies of the rules grouped by layer and the
/// derived-variable defaults, so evaluation touches no other task state.
#[derive(Debug, Clone)]
pub struct AxiomEvaluator {
    /// Rule indices grouped by axiom layer, in input order within a layer.
    layers: Vec<Vec<usize>>,
    rules: Vec<AxiomRule>,
    /// `(var, default_value)` for every derived variable.
    defaults: Vec<(usize, i32)>,
}

impl AxiomEvaluator {
    #[must_use]
    pub fn new(task: &PlanningTask) -> Self {
        let max_layer = task.max_axiom_layer();
        let layer_count = usize::try_from(max_layer + 1).unwrap_or(0);
        let mut layers = vec![Vec::new(); layer_count];
        for (index, rule) in task.axioms.iter().enumerate() {
            let layer = task.variables[rule.head.var].axiom_layer;
            assert!(layer >= 0, "axiom head must be a derived variable");
            layers[layer as usize].push(index);
        }
        let defaults = task
            .variables
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_derived())
            .map(|(var, _)| (var, task.initial_values[var]))
            .collect();
        Self {
            layers,
            rules: task.axioms.clone(),
            defaults,
        }
    }

    /// True if the task has no axioms; evaluation is then a no-op.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply all axioms to `values` in place.
    pub fn evaluate(&self, values: &mut [i32]) {
        if self.is_trivial() {
            return;
        }
        for &(var, default) in &self.defaults {
            values[var] = default;
        }
        for layer in &self.layers {
            loop {
                let mut changed = false;
                for &index in layer {
                    let rule = &self.rules[index];
                    if values[rule.head.var] != rule.head.value
                        && conditions_hold(&rule.conditions, values)
                    {
                        values[rule.head.var] = rule.head.value;
                        changed = true;
                    }
                }
                if !changed {
                    break;
                }
            }
        }
    }
}
