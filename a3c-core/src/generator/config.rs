//! Configuration of [`BatchGenerator`](super::BatchGenerator).
use crate::error::A3cError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`BatchGenerator`](super::BatchGenerator).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct BatchGeneratorConfig {
    /// The number of players.
    pub n_players: usize,

    /// The number of samples in a batch.
    pub batch_size: usize,

    /// Seed of the random number generator used for action selection.
    ///
    /// The environment of the `i`-th player is built with seed `seed + i`,
    /// wrapping around at `u64::MAX`.
    pub seed: u64,
}

impl Default for BatchGeneratorConfig {
    fn default() -> Self {
        Self {
            n_players: 50,
            batch_size: 128,
            seed: 42,
        }
    }
}

impl BatchGeneratorConfig {
    /// Sets the number of players.
    pub fn n_players(mut self, v: usize) -> Self {
        self.n_players = v;
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Checks the values of the configuration.
    pub fn validate(&self) -> Result<(), A3cError> {
        if self.n_players == 0 {
            return Err(A3cError::InvalidConfig(
                "n_players must be positive".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(A3cError::InvalidConfig(
                "batch_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Constructs [`BatchGeneratorConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`BatchGeneratorConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
