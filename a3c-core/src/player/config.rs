//! Configuration of [`Player`](super::Player).
use crate::error::A3cError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Player`](super::Player).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PlayerConfig {
    /// The number of rewards summed up in a return before bootstrapping.
    pub reward_steps: usize,

    /// Discount factor.
    pub gamma: f64,

    /// The maximum number of steps in an episode. The episode is cut off when
    /// its step counter exceeds this value.
    pub max_steps: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            reward_steps: 5,
            gamma: 0.99,
            max_steps: 40_000,
        }
    }
}

impl PlayerConfig {
    /// Sets the number of reward steps.
    pub fn reward_steps(mut self, v: usize) -> Self {
        self.reward_steps = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the maximum number of steps in an episode.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Checks the values of the configuration.
    pub fn validate(&self) -> Result<(), A3cError> {
        if self.reward_steps == 0 {
            return Err(A3cError::InvalidConfig(
                "reward_steps must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(A3cError::InvalidConfig(format!(
                "gamma must be in [0, 1], got {}",
                self.gamma
            )));
        }
        Ok(())
    }

    /// Constructs [`PlayerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`PlayerConfig`].
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
    fn test_serde_player_config() -> Result<()> {
        let config = PlayerConfig::default()
            .reward_steps(3)
            .gamma(0.9)
            .max_steps(100);

        let dir = TempDir::new("player_config")?;
        let path = dir.path().join("player_config.yaml");
        config.save(&path)?;
        let config_ = PlayerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_validate() {
        assert!(PlayerConfig::default().validate().is_ok());
        assert!(PlayerConfig::default().reward_steps(0).validate().is_err());
        assert!(PlayerConfig::default().gamma(1.5).validate().is_err());
    }
}
