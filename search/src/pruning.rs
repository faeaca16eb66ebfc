//! The pruning seam consumed by the search loop.
//!
//! Real pruning strategies live outside this repository; the loop only
//! needs the trait. Pruned operators may still be reported as preferred by
//! heuristics: the preferred set is not intersected with the surviving
//! applicable set, it simply never gets applied.

use std::rc::Rc;

use tracing::info;

use foray_task::task::{OperatorId, PlanningTask};

use crate::state_registry::State;

/// Filters the applicable operators of a state before expansion.
pub trait PruningMethod {
    fn initialize(&mut self, _task: &Rc<PlanningTask>) {}

    /// Remove pruned operators from `ops` in place, preserving order.
    fn prune_operators(&mut self, state: &State, ops: &mut Vec<OperatorId>);

    fn print_statistics(&self) {}
}

/// The identity method: prunes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPruning;

impl PruningMethod for NullPruning {
    fn prune_operators(&mut self, _state: &State, _ops: &mut Vec<OperatorId>) {}

    fn print_statistics(&self) {
        info!("pruning method: none");
    }
}
