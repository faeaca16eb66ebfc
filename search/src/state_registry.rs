//! State interning with dense, stable ids.
//!
//! The registry owns all state storage. States are packed value vectors
//! interned by contents; the id ↔ contents mapping is a bijection over the
//! reached states and never changes (no eviction). Successor computation
//! applies the operator's effects and then runs the axiom evaluator before
//! interning, so every registered state has all axioms applied.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use thiserror::Error;

use foray_task::axioms::AxiomEvaluator;
use foray_task::task::{OperatorId, PlanningTask};

/// Dense state identifier assigned by the registry, starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(usize);

impl StateId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered state: an id plus shared ownership of the packed values.
///
/// Cloning is cheap (`Rc` bump); the values are immutable once registered.
#[derive(Debug, Clone)]
pub struct State {
    id: StateId,
    values: Rc<[i32]>,
}

impl State {
    #[must_use]
    pub fn id(&self) -> StateId {
        self.id
    }

    #[must_use]
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    #[must_use]
    pub fn value(&self, var: usize) -> i32 {
        self.values[var]
    }
}

/// Typed failure for registry growth.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The state pool could not reserve room for another state.
    #[error("state pool exhausted after {states} registered states")]
    OutOfMemory { states: usize },
}

/// Interns packed state vectors and computes successors.
pub struct StateRegistry {
    task: Rc<PlanningTask>,
    axiom_evaluator: AxiomEvaluator,
    index: FxHashMap<Rc<[i32]>, StateId>,
    pool: Vec<Rc<[i32]>>,
}

impl StateRegistry {
    #[must_use]
    pub fn new(task: Rc<PlanningTask>) -> Self {
        let axiom_evaluator = AxiomEvaluator::new(&task);
        Self {
            task,
            axiom_evaluator,
            index: FxHashMap::default(),
            pool: Vec::new(),
        }
    }

    #[must_use]
    pub fn task(&self) -> &Rc<PlanningTask> {
        &self.task
    }

    /// Number of registered states.
    #[must_use]
    pub fn size(&self) -> usize {
        self.pool.len()
    }

    /// Register (or look up) the initial state, axioms applied.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::OutOfMemory`] if the pool cannot grow.
    pub fn initial_state(&mut self) -> Result<State, RegistryError> {
        let mut values = self.task.initial_values.clone();
        self.axiom_evaluator.evaluate(&mut values);
        self.intern(values)
    }

    /// Register (or look up) the successor of `parent` under `op`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::OutOfMemory`] if the pool cannot grow.
    pub fn successor_state(
        &mut self,
        parent: &State,
        op: OperatorId,
    ) -> Result<State, RegistryError> {
        let operator = self.task.operator(op);
        debug_assert!(
            operator.is_applicable(parent.values()),
            "successor_state called with inapplicable operator {op}"
        );
        let mut values = operator.successor_values(parent.values());
        self.axiom_evaluator.evaluate(&mut values);
        self.intern(values)
    }

    /// Look up a previously registered state by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was never issued by this registry; ids are only
    /// produced by [`initial_state`](Self::initial_state) and
    /// [`successor_state`](Self::successor_state), so an unknown id is a
    /// programming error.
    #[must_use]
    pub fn lookup(&self, id: StateId) -> State {
        State {
            id,
            values: Rc::clone(&self.pool[id.index()]),
        }
    }

    fn intern(&mut self, values: Vec<i32>) -> Result<State, RegistryError> {
        if let Some(&id) = self.index.get(values.as_slice()) {
            return Ok(State {
                id,
                values: Rc::clone(&self.pool[id.index()]),
            });
        }
        let states = self.pool.len();
        self.pool
            .try_reserve(1)
            .and_then(|()| self.index.try_reserve(1))
            .map_err(|_| RegistryError::OutOfMemory { states })?;
        let id = StateId(states);
        let shared: Rc<[i32]> = values.into();
        self.pool.push(Rc::clone(&shared));
        self.index.insert(Rc::clone(&shared), id);
        Ok(State { id, values: shared })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use foray_task::fact::FactPair;
    use foray_task::task::{Effect, Operator, Variable};

    fn two_var_task() -> Rc<PlanningTask> {
        let set = |var: usize| Operator {
            name: format!("set{var}"),
            preconditions: vec![FactPair::new(var, 0)],
            effects: vec![Effect {
                conditions: Vec::new(),
                fact: FactPair::new(var, 1),
            }],
            cost: 1,
        };
        Rc::new(PlanningTask {
            variables: (0..2)
                .map(|i| Variable {
                    name: format!("v{i}"),
                    domain_size: 2,
                    axiom_layer: -1,
                })
                .collect(),
            mutex_groups: Vec::new(),
            initial_values: vec![0, 0],
            goal: vec![FactPair::new(0, 1), FactPair::new(1, 1)],
            operators: vec![set(0), set(1)],
            axioms: Vec::new(),
            use_metric: false,
        })
    }

    #[test]
    fn initial_state_gets_id_zero() {
        let mut registry = StateRegistry::new(two_var_task());
        let initial = registry.initial_state().expect("initial");
        assert_eq!(initial.id().index(), 0);
        assert_eq!(initial.values(), &[0, 0]);
        assert_eq!(registry.size(), 1);
    }

    #[test]
    fn interning_is_a_bijection() {
        let mut registry = StateRegistry::new(two_var_task());
        let initial = registry.initial_state().expect("initial");
        let a = registry
            .successor_state(&initial, OperatorId::new(0))
            .expect("succ");
        let b = registry
            .successor_state(&initial, OperatorId::new(1))
            .expect("succ");
        assert_ne!(a.id(), b.id(), "distinct contents get distinct ids");

        // Reaching the same contents again returns the same id.
        let a_again = registry
            .successor_state(&initial, OperatorId::new(0))
            .expect("succ");
        assert_eq!(a.id(), a_again.id());
        assert_eq!(registry.size(), 3);
    }

    #[test]
    fn lookup_round_trips_contents() {
        let mut registry = StateRegistry::new(two_var_task());
        let initial = registry.initial_state().expect("initial");
        let succ = registry
            .successor_state(&initial, OperatorId::new(1))
            .expect("succ");
        let looked_up = registry.lookup(succ.id());
        assert_eq!(looked_up.values(), succ.values());
        assert_eq!(looked_up.id(), succ.id());
    }

    #[test]
    fn diamond_merges_to_one_state() {
        let mut registry = StateRegistry::new(two_var_task());
        let initial = registry.initial_state().expect("initial");
        let a = registry
            .successor_state(&initial, OperatorId::new(0))
            .expect("succ");
        let b = registry
            .successor_state(&initial, OperatorId::new(1))
            .expect("succ");
        let ab = registry
            .successor_state(&a, OperatorId::new(1))
            .expect("succ");
        let ba = registry
            .successor_state(&b, OperatorId::new(0))
            .expect("succ");
        assert_eq!(ab.id(), ba.id(), "order of application must not matter");
    }
}
