use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console_engine::{ConsoleEngine, KeyCode};
use log::LevelFilter;
use rand::rngs::StdRng;
use rand::SeedableRng;

use breakout_game::environment::breakout::config::Variant;
use breakout_game::environment::breakout::console_drawer::screen_size;
use breakout_game::environment::breakout_environment::{BreakoutAction, BreakoutEnvironment};
use ql::learn::q_learning_agent::AgentParameter;
use ql::learn::self_driving_q_learner::{Parameter, SelfDrivingQLearner};
use ql::log::init_logging_at;
use ql::persistence::{load_or_init, Loaded};
use ql::prelude::{Action, DebugVisualizer, Environment};

#[derive(Parser)]
#[command(name = "breakout-q-replay")]
#[command(version, about = "Plays Breakout greedily from a learned value table")]
struct Cli {
    /// Value table file
    #[arg(long, default_value = "q_table.bin")]
    q_table: PathBuf,

    /// Game ruleset the table was learned with
    #[arg(long, value_enum, default_value = "default")]
    variant: Variant,

    /// Frames (game steps) per second
    #[arg(long, default_value = "60")]
    fps: u32,

    #[arg(long)]
    seed: Option<u64>,

    /// Number of games to play
    #[arg(long, default_value = "1")]
    episodes: usize,
}

fn main() -> Result<()> {
    // info lines would scroll the rendered game away
    init_logging_at(LevelFilter::Warn);
    let cli = Cli::parse();

    let (env_rng, agent_rng) = match cli.seed {
        Some(seed) => (StdRng::seed_from_u64(seed), StdRng::seed_from_u64(seed.wrapping_add(1))),
        None => (StdRng::from_entropy(), StdRng::from_entropy()),
    };
    let environment = BreakoutEnvironment::new(cli.variant.into(), env_rng)?;
    let (table, loaded) = load_or_init(&cli.q_table, environment.state_shape(), BreakoutAction::ACTION_SPACE)?;

    let param = Parameter {
        agent: AgentParameter::greedy(),
        max_steps_per_episode: usize::MAX,
        ..Parameter::default()
    };
    let mut player = SelfDrivingQLearner::with_table(environment, param, table, agent_rng)?;
    if loaded == Loaded::Fresh {
        log::warn!("no learned table available - playing randomly");
        player.agent_mut().explore_fully();
    }

    let (width, height) = screen_size(player.environment().mechanics());
    let mut engine = ConsoleEngine::init(width, height, cli.fps)?;

    let mut results = Vec::with_capacity(cli.episodes);
    for _ in 0..cli.episodes {
        let mut quit = false;
        let stats = player.play_episode_observed(|env| {
            engine.wait_frame();
            engine.set_screen(&env.mechanics().render_to_console());
            engine.draw();
            quit = engine.is_key_pressed(KeyCode::Esc);
            Ok(!quit)
        })?;
        results.push(stats);
        if quit {
            break;
        }
    }
    // restores the terminal
    drop(engine);

    for stats in results {
        println!(
            "score: {}, lives left: {}, steps: {}, total reward: {:.1}{}",
            stats.score,
            stats.lives,
            stats.steps,
            stats.total_reward,
            if stats.terminated { "" } else { " (aborted)" }
        );
    }
    Ok(())
}
