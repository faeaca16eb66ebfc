//! The g-evaluator: path cost of the context.

use crate::evaluation_context::EvaluationContext;
use crate::evaluation_result::EvaluationResult;

/// Returns the context's g-value. Never reports a dead end, and its
/// (vacuous) dead-end reports are declared unreliable.
#[derive(Debug, Clone, Copy, Default)]
pub struct GEvaluator;

impl GEvaluator {
    pub(crate) fn compute_result(&self, ctx: &mut EvaluationContext) -> EvaluationResult {
        EvaluationResult::new(ctx.g())
    }
}
