//! Chopper Command headless runner
//!
//! Plays one seeded game with a simple autopilot and prints a JSON summary.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use chopper_command::consts::*;
use chopper_command::sim::{GamePhase, wrap_delta};
use chopper_command::{Action, ChopperCommand, Difficulty, GameState, Observation, Settings};

/// Headless Chopper Command - autopilot runs for replays and benchmarking
#[derive(Parser, Debug)]
#[command(name = "chopper-command")]
#[command(about = "Play a seeded Chopper Command game headlessly and report the result")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum frames to simulate
    #[arg(long, default_value_t = 10_000)]
    frames: u64,

    /// Settings file (JSON)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Difficulty level (1 or 2), overrides the settings file
    #[arg(long)]
    difficulty: Option<u8>,

    /// Disable player collisions (invulnerable autopilot)
    #[arg(long)]
    no_collision: bool,

    /// Also print the final observation
    #[arg(long)]
    observation: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    difficulty: u8,
    frames: u64,
    score: u32,
    lives: i32,
    waves_cleared: u32,
    total_reward: f32,
    game_over: bool,
}

fn main() {
    env_logger::init();

    if let Err(err) = run(Args::parse()) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> chopper_command::Result<()> {
    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(level) = args.difficulty {
        settings.difficulty = Difficulty::try_from(level)?;
    }
    if args.no_collision {
        settings.player_collision = false;
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    let env = ChopperCommand::new(settings);
    let (mut observation, mut state) = env.reset(seed);
    log::info!("Chopper Command starting with seed {seed}");

    let mut total_reward = 0.0;
    let mut done = false;
    for _ in 0..args.frames {
        let transition = env.step(&state, autopilot(&state));
        total_reward += transition.reward;
        observation = transition.observation;
        state = transition.state;
        if transition.done {
            done = true;
            break;
        }
    }

    let summary = RunSummary {
        seed,
        difficulty: state.difficulty.level(),
        frames: state.step_counter,
        score: state.score,
        lives: state.lives,
        waves_cleared: state.wave,
        total_reward,
        game_over: done,
    };
    log::info!(
        "Finished after {} frames: {} points, {} waves",
        summary.frames,
        summary.score,
        summary.waves_cleared
    );

    println!("{}", serde_json::to_string_pretty(&summary)?);
    if args.observation {
        print_observation(&observation)?;
    }
    Ok(())
}

fn print_observation(observation: &Observation) -> chopper_command::Result<()> {
    println!("{}", serde_json::to_string_pretty(observation)?);
    Ok(())
}

/// Chase the nearest live enemy, line up the missile with it and fire
fn autopilot(state: &GameState) -> Action {
    if state.phase() == GamePhase::NoMovePause {
        return Action::Right;
    }

    let player = &state.player;
    let target = state
        .jets
        .iter()
        .chain(&state.choppers)
        .filter(|e| e.is_alive())
        .min_by(|a, b| {
            let da = wrap_delta(player.x, a.x).abs();
            let db = wrap_delta(player.x, b.x).abs();
            da.total_cmp(&db)
        });

    let Some(target) = target else {
        return Action::Noop;
    };

    let dx = wrap_delta(player.x, target.x);
    let missile_y = (player.y + MISSILE_Y_OFFSET) as f32;
    let dy = target.y + JET_SIZE.1 / 2.0 - missile_y;

    let vertical = if dy < -1.0 {
        -1
    } else if dy > 1.0 {
        1
    } else {
        0
    };
    // Keep some distance, but always turn toward the target
    let toward = dx.signum() as i8;
    let horizontal = if dx.abs() > 48.0 || player.facing.sign() != toward {
        toward
    } else {
        0
    };

    Action::from_components(vertical, horizontal, dy.abs() <= 3.0)
}
