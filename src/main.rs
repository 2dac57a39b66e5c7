use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cartpole_dqn::config::TrainerConfig;
use cartpole_dqn::env::{CartPole, Environment};
use cartpole_dqn::network::NeuralNetwork;
use cartpole_dqn::trainer::{EvaluationStep, Trainer, TrainingOutcome};

#[derive(Parser)]
#[command(name = "cartpole-dqn", version, about = "Deep Q-learning on CartPole")]
struct Cli {
    /// Log filter, e.g. `info` or `cartpole_dqn=debug` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train until convergence or the episode cap, then evaluate greedily
    Train {
        /// JSON file with TrainerConfig fields
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        seed: Option<u64>,

        /// Episode cap for training
        #[arg(long)]
        episodes: Option<usize>,

        /// Write the trained online network here
        #[arg(long)]
        save: Option<PathBuf>,

        /// Write per-episode metrics here as JSON
        #[arg(long)]
        metrics: Option<PathBuf>,

        /// Evaluation episodes after convergence; runs forever when omitted
        #[arg(long)]
        eval_episodes: Option<usize>,

        /// Print a text frame for every evaluation step
        #[arg(long)]
        render: bool,
    },
    /// Evaluate a saved network greedily
    Eval {
        #[arg(long)]
        load: PathBuf,

        /// Runs forever when omitted
        #[arg(long)]
        episodes: Option<usize>,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[arg(long)]
        render: bool,
    },
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn render_observer(render: bool) -> impl FnMut(&CartPole, &EvaluationStep) {
    move |env, _step| {
        if render {
            if let Some(frame) = env.render() {
                println!("{}", frame);
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match cli.command {
        Command::Train { config, seed, episodes, save, metrics, eval_episodes, render } => {
            let mut config = match config {
                Some(path) => TrainerConfig::from_json_file(&path)
                    .with_context(|| format!("loading config from {}", path.display()))?,
                None => TrainerConfig::default(),
            };
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if let Some(episodes) = episodes {
                config.max_episodes = episodes;
            }

            let env = CartPole::new(config.seed);
            let mut trainer = Trainer::new(config, env).context("building trainer")?;
            let outcome = trainer.train().context("training")?;

            if let Some(path) = &metrics {
                trainer.metrics().save(path)
                    .with_context(|| format!("writing metrics to {}", path.display()))?;
            }
            if let Some(path) = &save {
                trainer.online().save(path)
                    .with_context(|| format!("saving network to {}", path.display()))?;
                info!(path = %path.display(), "saved online network");
            }

            match outcome {
                TrainingOutcome::Converged { episode, average } => {
                    info!(episode, average, "solved");
                    trainer.evaluate(eval_episodes, render_observer(render)).context("evaluating")?;
                }
                TrainingOutcome::EpisodeCapReached { episodes, last_average } => {
                    warn!(episodes, last_average, "not solved");
                }
            }
        }
        Command::Eval { load, episodes, seed, render } => {
            let network = NeuralNetwork::load(&load)
                .with_context(|| format!("loading network from {}", load.display()))?;
            let config = TrainerConfig { seed, ..TrainerConfig::default() };
            let mut trainer = Trainer::with_network(config, CartPole::new(seed), network)
                .context("building trainer")?;
            let summary = trainer.evaluate(episodes, render_observer(render)).context("evaluating")?;
            if let Some(mean) = summary.mean_length() {
                info!(episodes = summary.episodes, mean, "evaluation done");
            }
        }
    }

    Ok(())
}
