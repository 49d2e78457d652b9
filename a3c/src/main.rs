use a3c::config::RunConfig;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Name of the run, summaries and checkpoints go to logs/<name>
    #[arg(short, long)]
    name: String,

    /// Environment to use, Corridor-v0 if not given
    #[arg(short, long)]
    env: Option<String>,

    /// Directory of episode statistics of the environments
    #[arg(short, long)]
    monitor: Option<PathBuf>,

    /// Discount factor
    #[arg(long)]
    gamma: Option<f64>,

    /// The number of training iterations
    #[arg(long)]
    iters: Option<usize>,

    /// The number of steps to compute n-step returns
    #[arg(long)]
    steps: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// YAML file of the run configuration, overridden by the other options
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn run_config(args: &Args) -> Result<RunConfig> {
    let mut config = match args.config.as_ref() {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if let Some(v) = args.env.as_ref() {
        config = config.env_id(v);
    }
    if args.monitor.is_some() {
        config = config.monitor(args.monitor.clone());
    }
    if let Some(v) = args.gamma {
        config = config.gamma(v);
    }
    if let Some(v) = args.iters {
        config = config.iters(v);
    }
    if let Some(v) = args.steps {
        config = config.reward_steps(v);
    }
    if let Some(v) = args.seed {
        config = config.seed(v);
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = run_config(&args)?;
    a3c::train(&config, PathBuf::from("logs").join(&args.name))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_options_override_defaults() -> Result<()> {
        let args = Args::parse_from(["a3c", "-n", "run", "--gamma", "0.9", "--steps", "3"]);
        let config = run_config(&args)?;
        assert_eq!(config.env_id, "Corridor-v0");
        assert_eq!(config.player.gamma, 0.9);
        assert_eq!(config.player.reward_steps, 3);
        assert_eq!(config.trainer.max_opts, 10_000);
        assert_eq!(config.monitor, None);
        Ok(())
    }
}
