//! Advantage actor-critic training on a corridor environment.
//!
//! This crate puts the experience pipeline of [`a3c_core`] to work:
//!
//! * [`corridor`] is a small environment with one-hot observations,
//! * [`monitor`] writes episode statistics of environments to CSV files,
//! * [`linear`] is a linear softmax policy with a linear value function,
//! * [`config`] collects the configurations of a run.
//!
//! [`train`] runs the training loop and writes TensorBoard summaries and
//! checkpoints into a log directory.
pub mod config;
pub mod corridor;
pub mod linear;
pub mod monitor;

use a3c_core::Trainer;
use a3c_tensorboard::TensorboardRecorder;
use anyhow::Result;
use config::RunConfig;
use corridor::{Corridor, CorridorConfig};
use linear::LinearActorCritic;
use log::info;
use monitor::{Monitor, MonitorConfig};
use std::path::Path;

/// Trains a model as configured and writes the results in `logdir`.
///
/// The configuration is saved as `config.yaml`, checkpoints as `model-<steps>`
/// and TensorBoard event files are put in `logdir` as well.
pub fn train(config: &RunConfig, logdir: impl AsRef<Path>) -> Result<()> {
    let logdir = logdir.as_ref();
    std::fs::create_dir_all(logdir)?;
    config.save(logdir.join("config.yaml"))?;

    let env_config = CorridorConfig::from_id(&config.env_id)?;
    info!("Created environment {}: {:?}", config.env_id, env_config);
    let (dim, n_actions) = (env_config.obs_dim(), env_config.n_actions());
    let monitor_config = MonitorConfig::new(env_config).dir(config.monitor.clone());

    let trainer_config = config
        .trainer
        .clone()
        .model_dir(logdir.to_string_lossy().into_owned());
    let mut trainer: Trainer<Monitor<Corridor>> = Trainer::build(
        trainer_config,
        config.generator.clone(),
        config.player.clone(),
        monitor_config,
    )?;

    let mut train_model = LinearActorCritic::new(config.model.clone(), dim, n_actions);
    let mut run_model = LinearActorCritic::new(config.model.clone(), dim, n_actions);
    let mut recorder = TensorboardRecorder::new(logdir);

    trainer.train(&mut train_model, &mut run_model, &mut recorder)
}
