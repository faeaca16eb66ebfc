//! Cost adjustment for the search.
//!
//! The engine orders and accumulates g-values under an adjusted cost
//! function; `real_g`, the value checked against the bound and reported
//! for plans, always uses the original operator costs.

use foray_task::task::Operator;

/// How operator costs enter the g-values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CostType {
    /// Original operator cost.
    #[default]
    Normal,
    /// Every operator costs 1.
    One,
    /// Original cost plus 1 (breaks ties toward shorter plans).
    PlusOne,
}

/// The operator's cost under `cost_type`.
#[must_use]
pub fn adjusted_cost(op: &Operator, cost_type: CostType) -> i32 {
    match cost_type {
        CostType::Normal => op.cost,
        CostType::One => 1,
        CostType::PlusOne => op.cost + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(cost: i32) -> Operator {
        Operator {
            name: "o".into(),
            preconditions: Vec::new(),
            effects: Vec::new(),
            cost,
        }
    }

    #[test]
    fn adjustments_match_the_cost_type() {
        assert_eq!(adjusted_cost(&op(5), CostType::Normal), 5);
        assert_eq!(adjusted_cost(&op(5), CostType::One), 1);
        assert_eq!(adjusted_cost(&op(5), CostType::PlusOne), 6);
        assert_eq!(adjusted_cost(&op(0), CostType::PlusOne), 1);
    }
}
