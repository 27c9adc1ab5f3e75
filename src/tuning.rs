//! Data-driven game balance
//!
//! Every physics and geometry constant the reducer reads. Loaded from JSON,
//! any missing field falls back to `crate::consts`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Why tuning could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed tuning: {0}")]
    Format(#[source] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// How obstacles enter the visible set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnPolicy {
    /// The tick transition spawns every obstacle whose spawn time falls
    /// inside the current tick window
    #[default]
    TimeWindow,
    /// The session arms a one-shot timer per obstacle that emits a spawn event
    Scheduled,
}

/// Game balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub tick_seconds: f32,

    pub viewport_width: f32,
    pub viewport_height: f32,

    pub player_x: f32,
    pub player_width: f32,
    pub player_height: f32,

    pub gravity: f32,
    pub flap_velocity: f32,

    pub obstacle_width: f32,
    pub obstacle_speed: f32,

    pub lives: u32,
    pub initial_seed: u32,
    pub invulnerable_seconds: f32,

    pub spawn_policy: SpawnPolicy,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tick_seconds: TICK_SECONDS,
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            player_x: PLAYER_X,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            gravity: GRAVITY,
            flap_velocity: FLAP_VELOCITY,
            obstacle_width: OBSTACLE_WIDTH,
            obstacle_speed: OBSTACLE_SPEED,
            lives: START_LIVES,
            initial_seed: INITIAL_SEED,
            invulnerable_seconds: INVULNERABLE_SECONDS,
            spawn_policy: SpawnPolicy::TimeWindow,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON text
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json).map_err(TuningError::Format)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the reducer cannot work with
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("tick_seconds", self.tick_seconds),
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("obstacle_width", self.obstacle_width),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if std::time::Duration::try_from_secs_f32(self.tick_seconds).is_err() {
            return Err(TuningError::Invalid(format!(
                "tick_seconds {} does not fit a timer",
                self.tick_seconds
            )));
        }
        if self.lives == 0 {
            return Err(TuningError::Invalid("lives must be at least 1".into()));
        }
        if self.player_height >= self.viewport_height {
            return Err(TuningError::Invalid(
                "player_height must be smaller than viewport_height".into(),
            ));
        }
        if self.player_x < 0.0 || self.player_x + self.player_width > self.viewport_width {
            return Err(TuningError::Invalid(
                "player box must fit horizontally inside the viewport".into(),
            ));
        }
        Ok(())
    }

    /// Lowest y the player may rest at without touching the floor
    #[inline]
    pub fn max_player_y(&self) -> f32 {
        self.viewport_height - self.player_height
    }

    /// Tick duration as a `Duration` for timers
    pub fn tick_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f32(self.tick_seconds)
    }
}
