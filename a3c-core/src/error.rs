//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum A3cError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// The action probabilities given by a model do not form a categorical distribution.
    #[error("Invalid action distribution {probs:?}: {reason}")]
    InvalidDistribution {
        /// The probabilities.
        probs: Vec<f64>,

        /// Why the probabilities were rejected.
        reason: String,
    },

    /// A configuration value is out of its domain.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
