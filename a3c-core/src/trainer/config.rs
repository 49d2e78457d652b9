//! Configuration of [`Trainer`](super::Trainer).
use crate::error::A3cError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// The number of optimization steps, one per batch.
    pub max_opts: usize,

    /// Interval of copying the parameters of the trained model into the acting
    /// model, in optimization steps.
    pub sync_interval: usize,

    /// Interval of recording training metrics in optimization steps.
    pub record_interval: usize,

    /// Interval of flushing records in optimization steps.
    pub flush_record_interval: usize,

    /// Interval of saving the trained model in optimization steps. `0` disables saving.
    pub save_interval: usize,

    /// Where to save the trained model.
    pub model_dir: Option<String>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_opts: 10_000,
            sync_interval: 1,
            record_interval: 2,
            flush_record_interval: 2,
            save_interval: 3_000,
            model_dir: None,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of optimization steps.
    pub fn max_opts(mut self, v: usize) -> Self {
        self.max_opts = v;
        self
    }

    /// Sets the interval of model synchronization in optimization steps.
    pub fn sync_interval(mut self, v: usize) -> Self {
        self.sync_interval = v;
        self
    }

    /// Sets the interval of recording training metrics in optimization steps.
    pub fn record_interval(mut self, v: usize) -> Self {
        self.record_interval = v;
        self
    }

    /// Sets the interval of flushing records in optimization steps.
    pub fn flush_record_interval(mut self, v: usize) -> Self {
        self.flush_record_interval = v;
        self
    }

    /// Sets the interval of saving in optimization steps.
    pub fn save_interval(mut self, v: usize) -> Self {
        self.save_interval = v;
        self
    }

    /// Sets the directory where the trained model is saved.
    pub fn model_dir(mut self, v: impl Into<String>) -> Self {
        self.model_dir = Some(v.into());
        self
    }

    /// Checks the values of the configuration.
    pub fn validate(&self) -> Result<(), A3cError> {
        for (name, v) in [
            ("sync_interval", self.sync_interval),
            ("record_interval", self.record_interval),
            ("flush_record_interval", self.flush_record_interval),
        ]
        .iter()
        {
            if *v == 0 {
                return Err(A3cError::InvalidConfig(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
