//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only, seed threaded through the state
//! - Stable iteration order (obstacles in spawn order)
//! - No timers, I/O or rendering

pub mod collision;
pub mod obstacles;
pub mod rng;
pub mod state;
pub mod tick;

pub use collision::{Bounce, CollisionKind, PipeSide};
pub use state::{GameState, Obstacle, Phase};
pub use tick::{GameEvent, Reducer, fold_events};
