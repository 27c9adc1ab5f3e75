//! Game state and core simulation types
//!
//! A `GameState` is a value: the reducer consumes one and returns the next,
//! and snapshots handed out to consumers are never written to again.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Coarse phase derived from the `ended` and `paused` flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Running,
    Paused,
    Ended,
}

/// A pipe with a passable gap band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Position in the level table (0-based)
    pub id: u32,
    /// Left edge, viewport pixels
    pub x: f32,
    /// Gap center as a fraction of viewport height
    pub gap_center: f32,
    /// Gap height as a fraction of viewport height
    pub gap_height: f32,
    /// Credited to the score
    pub passed: bool,
    /// Seconds after run start at which the obstacle appears
    pub spawn_time: f32,
}

impl Obstacle {
    /// Top edge of the gap in pixels
    #[inline]
    pub fn gap_top(&self, viewport_height: f32) -> f32 {
        (self.gap_center - self.gap_height / 2.0) * viewport_height
    }

    /// Bottom edge of the gap in pixels
    #[inline]
    pub fn gap_bottom(&self, viewport_height: f32) -> f32 {
        (self.gap_center + self.gap_height / 2.0) * viewport_height
    }

    /// Right edge in pixels
    #[inline]
    pub fn right(&self, width: f32) -> f32 {
        self.x + width
    }

    /// Whether the gap band lies inside the viewport (level authoring rule)
    pub fn gap_within_bounds(&self) -> bool {
        self.gap_center - self.gap_height / 2.0 >= 0.0
            && self.gap_center + self.gap_height / 2.0 <= 1.0
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Top of the player box, pixels from the top of the viewport
    pub player_y: f32,
    /// Pixels per tick, positive is down
    pub player_velocity: f32,
    /// Ticks processed in this run
    pub ticks: u64,
    /// Seconds of running time in this run, `ticks * tick_seconds`
    pub elapsed_time: f32,
    /// Obstacles on screen, in spawn order
    pub visible_obstacles: Vec<Obstacle>,
    pub score: u32,
    pub ended: bool,
    pub lives: u32,
    /// Seed for the next bounce draw
    pub rng_seed: u32,
    /// Collisions are ignored while `elapsed_time < invulnerable_until`
    pub invulnerable_until: f32,
    /// Player y after every processed tick of this run
    pub current_path: Vec<f32>,
    /// Frozen recording of the previous run
    pub ghost_path: Arc<[f32]>,
    pub paused: bool,
    /// Ids of every obstacle credited in this run, including retired ones
    pub passed_ids: BTreeSet<u32>,
}

impl GameState {
    /// Session defaults: player centered, full lives, fixed seed, empty paths
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            player_y: tuning.max_player_y() / 2.0,
            player_velocity: 0.0,
            ticks: 0,
            elapsed_time: 0.0,
            visible_obstacles: Vec::new(),
            score: 0,
            ended: false,
            lives: tuning.lives,
            rng_seed: tuning.initial_seed,
            invulnerable_until: 0.0,
            current_path: Vec::new(),
            ghost_path: Arc::from(Vec::new()),
            paused: false,
            passed_ids: BTreeSet::new(),
        }
    }

    /// Fresh run carrying the given recording as its ghost
    pub fn with_ghost(tuning: &Tuning, ghost_path: Arc<[f32]>) -> Self {
        Self {
            ghost_path,
            ..Self::new(tuning)
        }
    }

    pub fn phase(&self) -> Phase {
        if self.ended {
            Phase::Ended
        } else if self.paused {
            Phase::Paused
        } else {
            Phase::Running
        }
    }

    /// Inside the post-collision immunity window
    #[inline]
    pub fn is_invulnerable(&self) -> bool {
        self.elapsed_time < self.invulnerable_until
    }

    /// Whether the obstacle is on screen
    pub fn is_visible(&self, id: u32) -> bool {
        self.visible_obstacles.iter().any(|o| o.id == id)
    }

    /// Whether the obstacle has entered play this run (on screen or already passed)
    pub fn has_spawned(&self, id: u32) -> bool {
        self.is_visible(id) || self.passed_ids.contains(&id)
    }
}
