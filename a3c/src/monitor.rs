//! Episode statistics of environments written to CSV files.
use a3c_core::{ActionId, Env, Step};
use anyhow::Result;
use log::info;
use serde::Serialize;
use std::{fs::File, path::PathBuf};

/// Configuration of [`Monitor`].
#[derive(Clone, Debug)]
pub struct MonitorConfig<C> {
    /// Configuration of the wrapped environment.
    pub env_config: C,

    /// Directory of the CSV files. `None` disables monitoring.
    pub dir: Option<PathBuf>,
}

impl<C> MonitorConfig<C> {
    /// Constructs a configuration with monitoring disabled.
    pub fn new(env_config: C) -> Self {
        Self {
            env_config,
            dir: None,
        }
    }

    /// Sets the directory of the CSV files.
    pub fn dir(mut self, v: Option<PathBuf>) -> Self {
        self.dir = v;
        self
    }
}

#[derive(Serialize)]
struct EpisodeRow {
    episode: usize,
    steps: usize,
    reward: f64,
    truncated: bool,
}

/// Wraps an environment and writes a row per episode.
///
/// The environment built with seed `s` writes `env-<s>.monitor.csv`. An episode
/// reset before the environment reported its end is written as truncated.
pub struct Monitor<E: Env> {
    env: E,
    writer: Option<csv::Writer<File>>,
    episode: usize,
    steps: usize,
    reward: f64,
}

impl<E: Env> Monitor<E> {
    fn write_row(&mut self, truncated: bool) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.serialize(EpisodeRow {
                episode: self.episode,
                steps: self.steps,
                reward: self.reward,
                truncated,
            })?;
            writer.flush()?;
        }
        self.episode += 1;
        self.steps = 0;
        self.reward = 0.0;
        Ok(())
    }
}

impl<E: Env> Env for Monitor<E> {
    type Config = MonitorConfig<E::Config>;
    type Obs = E::Obs;
    type Info = E::Info;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let writer = match config.dir.as_ref() {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                let path = dir.join(format!("env-{}.monitor.csv", seed));
                info!("Monitor episodes in {:?}", path);
                Some(csv::Writer::from_path(path)?)
            }
            None => None,
        };

        Ok(Self {
            env: E::build(&config.env_config, seed)?,
            writer,
            episode: 0,
            steps: 0,
            reward: 0.0,
        })
    }

    fn step(&mut self, act: ActionId) -> Result<Step<Self>> {
        let step = self.env.step(act)?;
        self.steps += 1;
        self.reward += step.reward;
        if step.is_done() {
            self.write_row(step.is_truncated && !step.is_terminated)?;
        }

        Ok(Step::new(
            step.obs,
            step.act,
            step.reward,
            step.is_terminated,
            step.is_truncated,
            step.info,
        ))
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        if self.steps > 0 {
            self.write_row(true)?;
        }
        self.env.reset()
    }
}
