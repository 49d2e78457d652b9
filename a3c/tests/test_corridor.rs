use a3c::{
    config::RunConfig,
    corridor::{CorridorObs, RIGHT},
    linear::LinearActorCritic,
};
use a3c_core::ActorCritic;
use anyhow::Result;
use ndarray::Array1;
use tempdir::TempDir;

fn short_run(monitor: std::path::PathBuf) -> RunConfig {
    let mut config = RunConfig::default()
        .env_id("Corridor-4")
        .monitor(Some(monitor))
        .iters(10)
        .reward_steps(2)
        .seed(3);
    config.generator = config.generator.n_players(4).batch_size(8);
    config.trainer = config.trainer.save_interval(4);
    config
}

#[test_log::test]
fn test_train_corridor() -> Result<()> {
    let dir = TempDir::new("test_train_corridor")?;
    let logdir = dir.path().join("logs").join("run");
    let monitor = dir.path().join("monitor");
    let config = short_run(monitor.clone());

    a3c::train(&config, &logdir)?;

    assert_eq!(RunConfig::load(logdir.join("config.yaml"))?, config);
    assert!(!logdir.join("model-000000").exists());
    assert!(logdir.join("model-000004").exists());
    assert!(logdir.join("model-000008").exists());
    for seed in 3..7 {
        assert!(monitor.join(format!("env-{}.monitor.csv", seed)).exists());
    }

    let mut model = LinearActorCritic::new(config.model.clone(), 4, 2);
    model.load(logdir.join("model-000008"))?;
    let mut x = Array1::zeros(4);
    x[0] = 1.0;
    let p = model.predict(&CorridorObs(x))?;
    assert!((p.probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    assert!(p.probs[RIGHT] > 0.0);
    Ok(())
}

#[test]
fn test_unknown_env() -> Result<()> {
    let dir = TempDir::new("test_unknown_env")?;
    let config = RunConfig::default().env_id("Pong-v4");
    assert!(a3c::train(&config, dir.path()).is_err());
    Ok(())
}
