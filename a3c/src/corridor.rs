//! A corridor environment.
use a3c_core::{ActionId, Env, Obs, Step};
use anyhow::{bail, Result};
use ndarray::Array1;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Moves towards the start of the corridor.
pub const LEFT: ActionId = 0;

/// Moves towards the goal.
pub const RIGHT: ActionId = 1;

/// Observation of [`Corridor`], a one-hot vector of the position.
#[derive(Clone, Debug, PartialEq)]
pub struct CorridorObs(pub Array1<f64>);

impl Obs for CorridorObs {}

impl CorridorObs {
    fn one_hot(length: usize, pos: usize) -> Self {
        let mut x = Array1::zeros(length);
        x[pos] = 1.0;
        Self(x)
    }

    /// Returns the position encoded in the observation.
    pub fn position(&self) -> usize {
        self.0.iter().position(|&v| v == 1.0).unwrap_or(0)
    }
}

/// Configuration of [`Corridor`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CorridorConfig {
    /// The number of cells. The agent starts at cell 0 and the goal is the last cell.
    pub length: usize,

    /// Probability that the opposite of the chosen move is taken.
    pub slip: f64,

    /// Reward of every move not reaching the goal.
    pub step_reward: f64,

    /// Reward of reaching the goal.
    pub goal_reward: f64,

    /// Episodes are truncated after this number of steps.
    pub max_episode_steps: Option<usize>,
}

impl Default for CorridorConfig {
    fn default() -> Self {
        Self {
            length: 8,
            slip: 0.1,
            step_reward: -0.01,
            goal_reward: 1.0,
            max_episode_steps: Some(200),
        }
    }
}

impl CorridorConfig {
    /// Configuration from an environment identifier.
    ///
    /// `Corridor-v0` is the default corridor, `Corridor-<n>` a corridor of `n` cells.
    pub fn from_id(id: &str) -> Result<Self> {
        let length = match id.strip_prefix("Corridor-") {
            Some("v0") => return Ok(Self::default()),
            Some(n) => n.parse::<usize>()?,
            None => bail!("Unknown environment: {}", id),
        };
        if length < 2 {
            bail!("Corridor needs at least 2 cells, got {}", length);
        }
        Ok(Self::default().length(length))
    }

    /// Sets the number of cells.
    pub fn length(mut self, v: usize) -> Self {
        self.length = v;
        self
    }

    /// Sets the slip probability.
    pub fn slip(mut self, v: f64) -> Self {
        self.slip = v;
        self
    }

    /// Sets the step limit of episodes.
    pub fn max_episode_steps(mut self, v: Option<usize>) -> Self {
        self.max_episode_steps = v;
        self
    }

    /// Dimension of observations.
    pub fn obs_dim(&self) -> usize {
        self.length
    }

    /// The number of actions.
    pub fn n_actions(&self) -> usize {
        2
    }
}

/// A one-dimensional corridor to walk through.
pub struct Corridor {
    config: CorridorConfig,
    rng: StdRng,
    pos: usize,
    steps: usize,
}

impl Env for Corridor {
    type Config = CorridorConfig;
    type Obs = CorridorObs;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            rng: StdRng::seed_from_u64(seed as _),
            pos: 0,
            steps: 0,
        })
    }

    fn step(&mut self, act: ActionId) -> Result<Step<Self>> {
        let right = match act {
            LEFT => false,
            RIGHT => true,
            _ => bail!("Invalid action {}", act),
        };
        let right = right ^ (self.rng.gen::<f64>() < self.config.slip);

        self.pos = if right {
            self.pos + 1
        } else {
            self.pos.saturating_sub(1)
        };
        self.steps += 1;

        let is_terminated = self.pos + 1 == self.config.length;
        let is_truncated = !is_terminated
            && self
                .config
                .max_episode_steps
                .map_or(false, |n| self.steps >= n);
        let reward = if is_terminated {
            self.config.goal_reward
        } else {
            self.config.step_reward
        };
        let obs = CorridorObs::one_hot(self.config.length, self.pos);

        Ok(Step::new(obs, act, reward, is_terminated, is_truncated, ()))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.pos = 0;
        self.steps = 0;
        Ok(CorridorObs::one_hot(self.config.length, self.pos))
    }
}
