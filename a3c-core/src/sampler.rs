//! Stochastic action selection.
use crate::{error::A3cError, ActionId};
use rand::{
    distributions::{Distribution, WeightedIndex},
    Rng,
};

/// Tolerance of the deviation of the sum of probabilities from one.
const SUM_TOLERANCE: f64 = 1e-6;

/// Draws an action index from a categorical distribution.
///
/// Every random number generator is a sampler, so a seeded
/// [`StdRng`](rand::rngs::StdRng) makes action selection reproducible.
pub trait CategoricalSampler {
    /// Draws index `i` with probability `probs[i]`.
    ///
    /// Fails if `probs` is empty, has a negative or non-finite element, or does
    /// not sum to one.
    fn draw(&mut self, probs: &[f64]) -> Result<ActionId, A3cError>;
}

impl<R: Rng + ?Sized> CategoricalSampler for R {
    fn draw(&mut self, probs: &[f64]) -> Result<ActionId, A3cError> {
        let invalid = |reason: String| A3cError::InvalidDistribution {
            probs: probs.to_vec(),
            reason,
        };

        let sum: f64 = probs.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(invalid(format!("probabilities sum to {}", sum)));
        }
        let dist = WeightedIndex::new(probs).map_err(|e| invalid(e.to_string()))?;

        Ok(dist.sample(self))
    }
}
