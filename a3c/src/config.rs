//! Configuration of a training run.
use crate::linear::LinearConfig;
use a3c_core::{BatchGeneratorConfig, PlayerConfig, TrainerConfig};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of a training run, all components together.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RunConfig {
    /// Environment identifier, see [`CorridorConfig::from_id`](crate::corridor::CorridorConfig::from_id).
    pub env_id: String,

    /// Directory of the episode statistics of the environments.
    pub monitor: Option<PathBuf>,

    /// Configuration of the players.
    pub player: PlayerConfig,

    /// Configuration of the batch generator.
    pub generator: BatchGeneratorConfig,

    /// Configuration of the training loop.
    pub trainer: TrainerConfig,

    /// Configuration of the model.
    pub model: LinearConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            env_id: "Corridor-v0".to_string(),
            monitor: None,
            player: PlayerConfig::default(),
            generator: BatchGeneratorConfig::default(),
            trainer: TrainerConfig::default(),
            model: LinearConfig::default(),
        }
    }
}

impl RunConfig {
    /// Sets the environment identifier.
    pub fn env_id(mut self, v: impl Into<String>) -> Self {
        self.env_id = v.into();
        self
    }

    /// Sets the directory of episode statistics.
    pub fn monitor(mut self, v: Option<PathBuf>) -> Self {
        self.monitor = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.player = self.player.gamma(v);
        self
    }

    /// Sets the number of training iterations, one batch each.
    pub fn iters(mut self, v: usize) -> Self {
        self.trainer = self.trainer.max_opts(v);
        self
    }

    /// Sets the number of steps to compute n-step returns.
    pub fn reward_steps(mut self, v: usize) -> Self {
        self.player = self.player.reward_steps(v);
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.generator = self.generator.seed(v);
        self
    }

    /// Constructs [`RunConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`RunConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.env_id, "Corridor-v0");
        assert_eq!(config.player.gamma, 0.99);
        assert_eq!(config.player.reward_steps, 5);
        assert_eq!(config.player.max_steps, 40_000);
        assert_eq!(config.generator.n_players, 50);
        assert_eq!(config.generator.batch_size, 128);
        assert_eq!(config.trainer.max_opts, 10_000);
        assert_eq!(config.trainer.sync_interval, 1);
        assert_eq!(config.trainer.save_interval, 3_000);
    }

    #[test]
    fn test_serde_run_config() -> Result<()> {
        let config = RunConfig::default()
            .env_id("Corridor-5")
            .monitor(Some(PathBuf::from("monitor")))
            .gamma(0.9)
            .iters(20)
            .reward_steps(3)
            .seed(7);

        let dir = TempDir::new("run_config")?;
        let path = dir.path().join("config.yaml");

        config.save(&path)?;
        let config_ = RunConfig::load(&path)?;
        assert_eq!(config, config_);
        assert_eq!(config_.trainer.max_opts, 20);
        assert_eq!(config_.generator.seed, 7);
        Ok(())
    }
}
