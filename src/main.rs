//! Ghost Flap headless driver
//!
//! Loads a level, starts a session and plays it with a seeded autopilot in
//! place of a keyboard. Each ended run is restarted so the next one races
//! the previous run's ghost.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use tokio::time;

use ghost_flap::frame;
use ghost_flap::sim::GameState;
use ghost_flap::{InputSender, Key, Session, Tuning};

#[derive(Parser)]
#[command(name = "ghost-flap")]
#[command(about = "Play a Ghost Flap level headlessly with an autopilot")]
struct Args {
    /// Level table (CSV: gapCenter,gapHeight,spawnTime)
    #[arg(short, long)]
    level: PathBuf,

    /// Tuning overrides (JSON)
    #[arg(short, long)]
    tuning: Option<PathBuf>,

    /// Number of runs to play
    #[arg(short, long, default_value_t = 2)]
    runs: u32,

    /// Wall-clock limit for the whole session
    #[arg(long, default_value_t = 60)]
    max_seconds: u64,

    /// Seed for the autopilot's reaction jitter
    #[arg(long, default_value_t = 7)]
    autopilot_seed: u64,

    /// Print the final snapshot as JSON
    #[arg(long)]
    dump: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let session = Session::bootstrap(&args.level, tuning.clone())
        .with_context(|| format!("cannot start session for {}", args.level.display()))?;

    let handle = session.start();
    let mut pilot = Autopilot::new(args.autopilot_seed, tuning.clone());
    let deadline = time::Instant::now() + Duration::from_secs(args.max_seconds);
    let mut runs_left = args.runs.max(1);
    let mut interval = time::interval(tuning.tick_duration());

    while time::Instant::now() < deadline {
        interval.tick().await;
        let state = handle.latest();
        if state.ended {
            runs_left -= 1;
            log::info!(
                "Run finished: score {}, lives {}, ghost frames {}",
                state.score,
                state.lives,
                state.current_path.len()
            );
            if runs_left == 0 {
                break;
            }
            handle.input().press(Key::Restart);
            // Wait for the restart to land before steering again
            let mut rx = handle.snapshots();
            rx.wait_for(|s| !s.ended)
                .await
                .context("session stopped during restart")?;
            continue;
        }
        pilot.steer(&state, &handle.input());
    }

    let state = handle.shutdown().await;
    let view = frame::project(&state, &tuning);
    log::info!(
        "Final: score {}, lives {}, {} pipes on screen, ghost {}",
        view.score,
        view.lives,
        view.pipes.len(),
        if view.ghost.is_some() { "visible" } else { "none" }
    );
    if args.dump {
        println!("{}", serde_json::to_string_pretty(&state)?);
    }
    Ok(())
}

/// Flaps whenever the player sinks below the next gap, with seeded jitter
struct Autopilot {
    rng: Pcg32,
    tuning: Tuning,
}

impl Autopilot {
    fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            tuning,
        }
    }

    fn steer(&mut self, state: &GameState, input: &InputSender) {
        if state.paused || state.player_velocity < 0.0 {
            return;
        }
        let height = self.tuning.viewport_height;
        let target = state
            .visible_obstacles
            .iter()
            .find(|o| !o.passed)
            .map(|o| o.gap_center * height)
            .unwrap_or(height / 2.0);
        let jitter = self.rng.random_range(-20.0..20.0);
        let center = state.player_y + self.tuning.player_height / 2.0;
        if center > target + jitter {
            input.press(Key::Flap);
        }
    }
}
