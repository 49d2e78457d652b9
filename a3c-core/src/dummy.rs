//! Deterministic environments, models and samplers used in tests.
use crate::{
    record::Record, ActionId, ActorCritic, Batch, CategoricalSampler, Env, Obs, Prediction, Step,
    SyncModel, TrainableModel,
};
use anyhow::Result;
use std::path::Path;

/// Observation of [`DummyEnv`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DummyObs {
    /// Number of resets before this observation, starting from 1.
    pub episode: usize,

    /// Number of steps taken in the episode before this observation.
    pub t: usize,
}

impl Obs for DummyObs {}

/// Configuration of [`DummyEnv`].
#[derive(Clone, Debug)]
pub struct DummyEnvConfig {
    /// The episode terminates after this number of steps. `None` for endless episodes.
    pub episode_len: Option<usize>,
}

/// An environment counting its steps.
///
/// Taking any action in the observation with step count `t` gives reward
/// `t + 1`. The episode terminates when `episode_len` steps have been taken.
pub struct DummyEnv {
    episode_len: Option<usize>,
    obs: DummyObs,
    n_resets: usize,
    actions: Vec<ActionId>,
}

impl DummyEnv {
    /// Returns the number of resets.
    pub fn n_resets(&self) -> usize {
        self.n_resets
    }

    /// Returns the actions taken so far.
    pub fn actions(&self) -> &[ActionId] {
        &self.actions
    }
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;
    type Obs = DummyObs;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            episode_len: config.episode_len,
            obs: DummyObs { episode: 0, t: 0 },
            n_resets: 0,
            actions: vec![],
        })
    }

    fn step(&mut self, act: ActionId) -> Result<Step<Self>> {
        let reward = (self.obs.t + 1) as f64;
        self.obs.t += 1;
        self.actions.push(act);
        let is_terminated = self.episode_len.map_or(false, |n| self.obs.t >= n);
        Ok(Step::new(self.obs.clone(), act, reward, is_terminated, false, ()))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.n_resets += 1;
        self.obs = DummyObs {
            episode: self.n_resets,
            t: 0,
        };
        Ok(self.obs.clone())
    }
}

/// A policy giving the same prediction for any observation.
#[derive(Clone, Debug)]
pub struct ConstantPolicy {
    prediction: Prediction,
}

impl ConstantPolicy {
    /// Constructs the policy.
    pub fn new(probs: Vec<f64>, value: f64) -> Self {
        Self {
            prediction: Prediction::new(probs, value),
        }
    }
}

impl<O: Obs> ActorCritic<O> for ConstantPolicy {
    fn predict(&self, _obs: &O) -> Result<Prediction> {
        Ok(self.prediction.clone())
    }
}

/// A sampler cycling through a fixed sequence of actions.
///
/// The given probabilities are ignored.
pub struct CyclicSampler {
    actions: Vec<ActionId>,
    pos: usize,
}

impl CyclicSampler {
    /// Constructs the sampler.
    pub fn new(actions: Vec<ActionId>) -> Self {
        assert!(!actions.is_empty());
        Self { actions, pos: 0 }
    }
}

impl CategoricalSampler for CyclicSampler {
    fn draw(&mut self, _probs: &[f64]) -> Result<ActionId, crate::error::A3cError> {
        let act = self.actions[self.pos];
        self.pos = (self.pos + 1) % self.actions.len();
        Ok(act)
    }
}

/// A model whose parameters are a version number.
///
/// Each optimization step increments the version and reports
/// `loss = 1 / version`. Saving writes the version into the given file.
#[derive(Clone, Debug)]
pub struct DummyModel {
    version: usize,
    batch_sizes: Vec<usize>,
    policy: ConstantPolicy,
}

impl DummyModel {
    /// Constructs the model with version 0.
    pub fn new(n_actions: usize, value: f64) -> Self {
        Self {
            version: 0,
            batch_sizes: vec![],
            policy: ConstantPolicy::new(vec![1.0 / n_actions as f64; n_actions], value),
        }
    }

    /// Returns the version.
    pub fn version(&self) -> usize {
        self.version
    }

    /// Returns the sizes of the batches the model has been trained on.
    pub fn batch_sizes(&self) -> &[usize] {
        &self.batch_sizes
    }
}

impl<O: Obs> ActorCritic<O> for DummyModel {
    fn predict(&self, obs: &O) -> Result<Prediction> {
        self.policy.predict(obs)
    }
}

impl SyncModel for DummyModel {
    type Weights = usize;

    fn weights(&self) -> Self::Weights {
        self.version
    }

    fn set_weights(&mut self, weights: &Self::Weights) {
        self.version = *weights;
    }
}

impl<O: Obs> TrainableModel<O> for DummyModel {
    fn train_on_batch(&mut self, batch: &Batch<O>) -> Result<Record> {
        self.version += 1;
        self.batch_sizes.push(batch.len());
        Ok(Record::from_scalar("loss", 1.0 / self.version as f32))
    }

    fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.version.to_string())?;
        Ok(())
    }
}
