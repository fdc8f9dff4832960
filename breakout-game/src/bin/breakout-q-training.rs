use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use breakout_game::environment::breakout::config::Variant;
use breakout_game::environment::breakout_environment::{BreakoutAction, BreakoutEnvironment};
use breakout_game::plot::plot_rewards;
use ql::learn::self_driving_q_learner::{Parameter, SelfDrivingQLearner};
use ql::log::init_logging;
use ql::persistence::{load_or_init, save_q_table, Loaded};
use ql::prelude::{Action, Environment};
use ql::util::format::grouped;

#[derive(Parser)]
#[command(name = "breakout-q-training")]
#[command(version, about = "Learns to play Breakout with tabular Q-learning")]
struct Cli {
    /// Number of training episodes
    #[arg(long, default_value = "1000")]
    episodes: usize,

    /// Step limit per episode
    #[arg(long, default_value = "1000")]
    max_steps: usize,

    /// Game ruleset
    #[arg(long, value_enum, default_value = "default")]
    variant: Variant,

    /// Seed for the environment and the agent; random when absent
    #[arg(long)]
    seed: Option<u64>,

    /// Value table file
    #[arg(long, default_value = "q_table.bin")]
    q_table: PathBuf,

    /// Write a reward chart (PNG) to this file
    #[arg(long)]
    plot: Option<PathBuf>,

    /// Continue with the table stored in the value table file
    #[arg(long)]
    resume: bool,
}

fn rngs(seed: Option<u64>) -> (StdRng, StdRng) {
    match seed {
        Some(seed) => (StdRng::seed_from_u64(seed), StdRng::seed_from_u64(seed.wrapping_add(1))),
        None => (StdRng::from_entropy(), StdRng::from_entropy()),
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let (env_rng, agent_rng) = rngs(cli.seed);
    let environment = BreakoutEnvironment::new(cli.variant.into(), env_rng)?;

    let mut param = Parameter::default();
    param.max_steps_per_episode = cli.max_steps;

    let mut learner = if cli.resume {
        let (table, loaded) = load_or_init(&cli.q_table, environment.state_shape(), BreakoutAction::ACTION_SPACE)?;
        let mut learner = SelfDrivingQLearner::with_table(environment, param, table, agent_rng)?;
        if loaded == Loaded::Fresh {
            learner.agent_mut().explore_fully();
        }
        learner
    } else {
        SelfDrivingQLearner::new(environment, param, agent_rng)?
    };

    log::info!("training {} episodes", cli.episodes);
    let mut rewards = Vec::with_capacity(cli.episodes);
    for _ in 0..cli.episodes {
        let stats = learner.learn_episode()?;
        log::debug!("{:?}", stats);
        rewards.push(stats.total_reward);
    }
    log::info!(
        "finished after {} steps; mean reward of the last episodes: {:.1}",
        grouped(learner.step_count()),
        learner.running_reward()
    );

    save_q_table(learner.agent().table(), &cli.q_table)?;
    if let Some(path) = cli.plot {
        plot_rewards(&rewards, &path)?;
    }
    Ok(())
}
