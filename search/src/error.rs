//! Typed configuration-binding errors.

use thiserror::Error;

/// Failure while validating or binding a configuration to a task.
///
/// Both kinds are raised before any search step runs; the driver maps them
/// to the input-error and unsupported exit codes respectively.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The lazy evaluator of an eager search must cache its estimates;
    /// lazy re-evaluation compares the cached value against a fresh one.
    #[error("lazy evaluator `{description}` does not cache its estimates")]
    LazyEvaluatorDoesNotCache { description: String },

    /// A heuristic rejected a feature of the bound task.
    #[error("heuristic `{heuristic}` does not support this task: {detail}")]
    UnsupportedTaskFeature { heuristic: String, detail: String },
}
