//! Weighted evaluator: child value scaled by an integer weight.

use std::rc::Rc;

use crate::evaluation_context::EvaluationContext;
use crate::evaluation_result::{EvaluationResult, INFTY};
use crate::evaluator::Evaluator;

/// Multiplies the child evaluator's value by `weight`. Infinity propagates
/// unchanged; finite overflow is an internal error. Produces no preferred
/// operators.
#[derive(Debug)]
pub struct WeightedEvaluator {
    evaluator: Rc<Evaluator>,
    weight: i32,
}

impl WeightedEvaluator {
    #[must_use]
    pub fn new(evaluator: Rc<Evaluator>, weight: i32) -> Self {
        Self { evaluator, weight }
    }

    #[must_use]
    pub fn evaluator(&self) -> &Rc<Evaluator> {
        &self.evaluator
    }

    #[must_use]
    pub fn weight(&self) -> i32 {
        self.weight
    }

    pub(crate) fn compute_result(&self, ctx: &mut EvaluationContext) -> EvaluationResult {
        let value = ctx.value_or_infinity(&self.evaluator);
        if value == INFTY {
            return EvaluationResult::new(INFTY);
        }
        let weighted = value
            .checked_mul(self.weight)
            .filter(|&w| w != INFTY)
            .unwrap_or_else(|| {
                panic!(
                    "weighted evaluator overflow: {value} * {} exceeds the value range",
                    self.weight
                )
            });
        EvaluationResult::new(weighted)
    }

    pub(crate) fn dead_ends_are_reliable(&self) -> bool {
        self.evaluator.dead_ends_are_reliable()
    }
}
