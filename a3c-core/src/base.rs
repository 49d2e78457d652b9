//! Core traits shared by the players, the batch generator and the trainer.
mod env;
mod model;
mod step;
pub use env::Env;
pub use model::{ActorCritic, Prediction, SyncModel, TrainableModel};
use std::fmt::Debug;
pub use step::{Info, Step};

/// Index of a discrete action.
pub type ActionId = usize;

/// An observation of an environment.
///
/// Observations are cloned into transitions and training samples, so they are
/// expected to be cheap to clone or shared internally.
pub trait Obs: Clone + Debug {}
