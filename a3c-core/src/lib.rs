#![warn(missing_docs)]
//! Experience pipeline of advantage actor-critic (A3C-style) training.
//!
//! A number of [`Player`]s act in their own environments with a shared
//! policy/value model. Their trajectories are cut into segments of at most
//! `reward_steps + 1` transitions, which are turned into training samples by
//! the [`ReturnEstimator`]. The [`BatchGenerator`] advances the players in
//! round-robin order and assembles fixed-size [`Batch`]es, which the
//! [`Trainer`] pushes into a [`TrainableModel`].
pub mod dummy;
pub mod error;
pub mod record;

mod base;
pub use base::{
    ActionId, ActorCritic, Env, Info, Obs, Prediction, Step, SyncModel, TrainableModel,
};

mod estimator;
pub use estimator::{ReturnEstimator, Sample, Transition};

mod sampler;
pub use sampler::CategoricalSampler;

mod player;
pub use player::{Player, PlayerConfig};

mod generator;
pub use generator::{Batch, BatchGenerator, BatchGeneratorConfig, Batches};

mod trainer;
pub use trainer::{Trainer, TrainerConfig};
