//! Deterministic enumeration of applicable operators.

use crate::task::{OperatorId, PlanningTask};

/// Enumerates the operators applicable in a state.
///
/// Applicability is checked by a scan in operator-id order, which is also
/// the order results are emitted in; the search layer relies on this for
/// reproducible expansion traces. Decision-tree indexing over preconditions
/// is deliberately not part of this type.
#[derive(Debug, Clone)]
pub struct SuccessorGenerator {
    operator_count: usize,
}

impl SuccessorGenerator {
    #[must_use]
    pub fn new(task: &PlanningTask) -> Self {
        Self {
            operator_count: task.operators.len(),
        }
    }

    /// Append the ids of all operators applicable in `values` to `out`.
    ///
    /// `out` is cleared first; ids come out in ascending order.
    pub fn applicable_ops(&self, task: &PlanningTask, values: &[i32], out: &mut Vec<OperatorId>) {
        debug_assert_eq!(self.operator_count, task.operators.len());
        out.clear();
        for (index, op) in task.operators.iter().enumerate() {
            if op.is_applicable(values) {
                out.push(OperatorId::new(index));
            }
        }
    }
}
