//! The evaluator variants composed by [`crate::evaluator::Evaluator`].

pub mod combine;
pub mod constant;
pub mod g;
pub mod heuristic;
pub mod pref;
pub mod weighted;

pub use combine::{MaxEvaluator, SumEvaluator};
pub use constant::ConstEvaluator;
pub use g::GEvaluator;
pub use heuristic::{Estimate, EstimateResult, Estimator, HeuristicEvaluator};
pub use pref::PrefEvaluator;
pub use weighted::WeightedEvaluator;
