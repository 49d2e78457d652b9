//! Environment.
use super::{ActionId, Info, Obs, Step};
use anyhow::Result;

/// Represents an environment with a discrete action space, typically an MDP.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Performes an environment step with the action of the given index.
    fn step(&mut self, act: ActionId) -> Result<Step<Self>>
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation of a new episode.
    fn reset(&mut self) -> Result<Self::Obs>;
}
