//! Game state reducer
//!
//! Folds one event into a state and returns the next state. Every transition
//! is total: any well-formed state and event produce a well-formed state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::collision;
use super::obstacles;
use super::state::GameState;
use crate::level::Level;
use crate::tuning::{SpawnPolicy, Tuning};

/// Everything the reducer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// One fixed timestep
    Tick,
    /// Upward impulse
    Flap,
    /// Flip between running and paused
    TogglePause,
    /// Start a new run after the current one ended
    Restart,
    /// Scheduled spawn of the obstacle with this id
    Spawn(u32),
    /// Input with no game meaning (resize, unmapped keys)
    Idle,
}

/// The transition function closed over the level table and tuning
#[derive(Debug, Clone)]
pub struct Reducer {
    level: Arc<Level>,
    tuning: Tuning,
}

impl Reducer {
    pub fn new(level: Arc<Level>, tuning: Tuning) -> Self {
        Self { level, tuning }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// State at session start
    pub fn initial_state(&self) -> GameState {
        GameState::new(&self.tuning)
    }

    /// Apply one event
    pub fn reduce(&self, state: GameState, event: GameEvent) -> GameState {
        match event {
            GameEvent::Tick => tick(state, &self.level, &self.tuning),
            GameEvent::Flap => flap(state, &self.tuning),
            GameEvent::TogglePause => toggle_pause(state),
            GameEvent::Restart => restart(state, &self.tuning),
            GameEvent::Spawn(id) => spawn(state, &self.level, id),
            GameEvent::Idle => state,
        }
    }

    /// Fold `events` from the initial state, returning the state after each one
    pub fn run(&self, events: impl IntoIterator<Item = GameEvent>) -> Vec<GameState> {
        fold_events(self, self.initial_state(), events)
    }
}

/// Fold `events` from `initial`, returning every intermediate state
pub fn fold_events(
    reducer: &Reducer,
    initial: GameState,
    events: impl IntoIterator<Item = GameEvent>,
) -> Vec<GameState> {
    let mut states = Vec::new();
    let mut state = initial;
    for event in events {
        state = reducer.reduce(state, event);
        states.push(state.clone());
    }
    states
}

/// Advance one fixed timestep. No-op while paused or ended.
pub fn tick(mut state: GameState, level: &Level, tuning: &Tuning) -> GameState {
    if state.ended || state.paused {
        return state;
    }

    // Derived from the count so it never drifts from the path index
    state.ticks += 1;
    state.elapsed_time = (state.ticks as f64 * f64::from(tuning.tick_seconds)) as f32;

    obstacles::advance(&mut state, tuning);
    if tuning.spawn_policy == SpawnPolicy::TimeWindow {
        obstacles::spawn_due(&mut state, level, tuning);
    }
    obstacles::credit_passes(&mut state, tuning);
    obstacles::retire(&mut state, tuning);

    if obstacles::level_complete(&state, level) {
        log::info!("level complete, score {}", state.score);
        state.ended = true;
        state.current_path.push(state.player_y);
        return state;
    }

    let (y, velocity) = collision::integrate(state.player_y, state.player_velocity, tuning.gravity);

    let hit = if state.is_invulnerable() {
        None
    } else {
        collision::detect(y, &state.visible_obstacles, tuning)
    };

    match hit {
        Some(kind) => {
            let (velocity, seed) = collision::bounce_velocity(kind.bounce(), state.rng_seed);
            // Collision ticks keep the unclamped position
            state.player_y = y;
            state.player_velocity = velocity;
            state.rng_seed = seed;
            state.lives = state.lives.saturating_sub(1);
            state.invulnerable_until = state.elapsed_time + tuning.invulnerable_seconds;
            log::debug!(
                "collision {kind:?} at t={:.3}, {} lives left",
                state.elapsed_time,
                state.lives
            );
            if state.lives == 0 {
                log::info!("out of lives, score {}", state.score);
                state.ended = true;
            }
        }
        None => {
            state.player_y = collision::clamp_to_viewport(y, tuning);
            state.player_velocity = velocity;
        }
    }

    state.current_path.push(state.player_y);
    state
}

/// Set the flap velocity. No-op once ended.
pub fn flap(mut state: GameState, tuning: &Tuning) -> GameState {
    if !state.ended {
        state.player_velocity = tuning.flap_velocity;
    }
    state
}

/// Flip the paused flag (also recorded while ended)
pub fn toggle_pause(mut state: GameState) -> GameState {
    state.paused = !state.paused;
    state
}

/// Start a fresh run carrying the ended run's path as the ghost.
/// No-op unless ended.
pub fn restart(state: GameState, tuning: &Tuning) -> GameState {
    if !state.ended {
        return state;
    }
    log::info!(
        "restarting, ghost has {} frames (previous score {})",
        state.current_path.len(),
        state.score
    );
    GameState::with_ghost(tuning, Arc::from(state.current_path))
}

/// Scheduled spawn. No-op once ended or if the obstacle already entered play.
pub fn spawn(mut state: GameState, level: &Level, id: u32) -> GameState {
    if !state.ended {
        obstacles::spawn(&mut state, level, id);
    }
    state
}
