//! Concrete heuristics behind the [`crate::evaluators::Estimator`] seam.
//!
//! Only the lightweight members of the family live in this repository;
//! heavyweight heuristics plug in through the same trait.

pub mod blind;
pub mod goal_count;

pub use blind::{BlindFactory, BlindHeuristic};
pub use goal_count::{GoalCountFactory, GoalCountHeuristic};
