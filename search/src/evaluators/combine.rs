//! Sum and max aggregation over child evaluators.
//!
//! Sum is infinite as soon as any child is; its dead-end reports are
//! reliable iff ANY child's are. Max takes the largest finite child value,
//! going infinite only when every child is; its dead-end reports are
//! reliable iff ALL children's are.

use std::rc::Rc;

use crate::evaluation_context::EvaluationContext;
use crate::evaluation_result::{EvaluationResult, INFTY};
use crate::evaluator::Evaluator;

/// Sum of the child values.
#[derive(Debug)]
pub struct SumEvaluator {
    evaluators: Vec<Rc<Evaluator>>,
}

impl SumEvaluator {
    /// # Panics
    ///
    /// Panics if `evaluators` is empty.
    #[must_use]
    pub fn new(evaluators: Vec<Rc<Evaluator>>) -> Self {
        assert!(!evaluators.is_empty(), "sum requires at least one child");
        Self { evaluators }
    }

    #[must_use]
    pub fn evaluators(&self) -> &[Rc<Evaluator>] {
        &self.evaluators
    }

    pub(crate) fn compute_result(&self, ctx: &mut EvaluationContext) -> EvaluationResult {
        let mut sum: i64 = 0;
        for child in &self.evaluators {
            let value = ctx.value_or_infinity(child);
            if value == INFTY {
                return EvaluationResult::new(INFTY);
            }
            sum += i64::from(value);
        }
        let value = i32::try_from(sum)
            .ok()
            .filter(|&v| v != INFTY)
            .unwrap_or_else(|| panic!("sum evaluator overflow: {sum} exceeds the value range"));
        EvaluationResult::new(value)
    }

    pub(crate) fn dead_ends_are_reliable(&self) -> bool {
        self.evaluators.iter().any(|e| e.dead_ends_are_reliable())
    }
}

/// Largest finite child value; infinite only when all children are.
#[derive(Debug)]
pub struct MaxEvaluator {
    evaluators: Vec<Rc<Evaluator>>,
}

impl MaxEvaluator {
    /// # Panics
    ///
    /// Panics if `evaluators` is empty.
    #[must_use]
    pub fn new(evaluators: Vec<Rc<Evaluator>>) -> Self {
        assert!(!evaluators.is_empty(), "max requires at least one child");
        Self { evaluators }
    }

    #[must_use]
    pub fn evaluators(&self) -> &[Rc<Evaluator>] {
        &self.evaluators
    }

    pub(crate) fn compute_result(&self, ctx: &mut EvaluationContext) -> EvaluationResult {
        let mut best: Option<i32> = None;
        for child in &self.evaluators {
            let value = ctx.value_or_infinity(child);
            if value != INFTY {
                best = Some(best.map_or(value, |b| b.max(value)));
            }
        }
        EvaluationResult::new(best.unwrap_or(INFTY))
    }

    pub(crate) fn dead_ends_are_reliable(&self) -> bool {
        self.evaluators.iter().all(|e| e.dead_ends_are_reliable())
    }
}
