//! Policy/value models.
use super::Obs;
use crate::{record::Record, Batch};
use anyhow::Result;
use std::path::Path;

/// Output of an [`ActorCritic`] model for a single observation.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    /// Probabilities of the actions, indexed by [`ActionId`](crate::ActionId).
    pub probs: Vec<f64>,

    /// Estimate of the state value.
    pub value: f64,
}

impl Prediction {
    /// Constructs a [`Prediction`].
    pub fn new(probs: Vec<f64>, value: f64) -> Self {
        Self { probs, value }
    }
}

/// A policy/value model used for acting.
///
/// The model maps an observation to a distribution over discrete actions and
/// an estimate of the state value. Players only read the model; it is queried
/// with one observation at a time.
pub trait ActorCritic<O: Obs> {
    /// Predicts action probabilities and the state value of `obs`.
    fn predict(&self, obs: &O) -> Result<Prediction>;
}

/// Synchronizes model parameters between a trained model and an acting model.
pub trait SyncModel {
    /// Parameters exchanged between models.
    type Weights: Clone;

    /// Returns a copy of the current parameters.
    fn weights(&self) -> Self::Weights;

    /// Overwrites the parameters.
    fn set_weights(&mut self, weights: &Self::Weights);
}

/// A policy/value model updated from batches of training samples.
pub trait TrainableModel<O: Obs>: SyncModel {
    /// Performs an optimization step on the batch and returns metrics.
    ///
    /// The inputs of the step are [`Batch::inputs`] and the targets are
    /// [`Batch::targets`].
    fn train_on_batch(&mut self, batch: &Batch<O>) -> Result<Record>;

    /// Saves the parameters of the model at the given path.
    fn save(&self, path: &Path) -> Result<()>;
}
