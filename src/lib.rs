//! Ghost Flap - a flappy-bird arcade core with lives and ghost replay
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, game state reducer)
//! - `level`: Level table loading
//! - `tuning`: Data-driven game balance
//! - `session`: Event sources merged into one ordered fold
//! - `frame`: Renderer-facing projection of a snapshot

pub mod frame;
pub mod level;
pub mod session;
pub mod sim;
pub mod tuning;

pub use level::{Level, LevelError};
pub use session::{InputSender, Key, Session, SessionError, SessionHandle, load_level};
pub use tuning::{SpawnPolicy, Tuning, TuningError};

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Fixed simulation timestep in seconds (50 Hz)
    pub const TICK_SECONDS: f32 = 0.02;

    /// Viewport dimensions
    pub const VIEWPORT_WIDTH: f32 = 800.0;
    pub const VIEWPORT_HEIGHT: f32 = 600.0;

    /// Player box - fixed horizontal position, only y moves
    pub const PLAYER_X: f32 = 150.0;
    pub const PLAYER_WIDTH: f32 = 34.0;
    pub const PLAYER_HEIGHT: f32 = 24.0;

    /// Downward acceleration, pixels per tick²
    pub const GRAVITY: f32 = 0.5;
    /// Velocity set by a flap, pixels per tick (negative is up)
    pub const FLAP_VELOCITY: f32 = -8.0;

    /// Obstacle defaults
    pub const OBSTACLE_WIDTH: f32 = 60.0;
    /// Horizontal scroll, pixels per tick
    pub const OBSTACLE_SPEED: f32 = 4.0;

    /// Lives at the start of every run
    pub const START_LIVES: u32 = 3;
    /// Seed every run starts from (keeps ghost runs comparable)
    pub const INITIAL_SEED: u32 = 42;
    /// Collision immunity after losing a life, seconds
    pub const INVULNERABLE_SECONDS: f32 = 1.5;
}
