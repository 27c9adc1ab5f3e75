//! Renderer-facing projection of a snapshot
//!
//! Turns a `GameState` into plain rectangles and HUD values. Nothing here
//! draws; a canvas, terminal or GPU backend consumes the `Frame`.

use glam::Vec2;

use crate::sim::{GameState, Obstacle};
use crate::tuning::Tuning;

/// Axis-aligned rectangle, top-left origin, never negative in size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    /// Negative extents collapse to zero instead of flipping the rectangle
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w.max(0.0), h.max(0.0)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size.x == 0.0 || self.size.y == 0.0
    }
}

/// Upper and lower column of a pipe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeRects {
    pub id: u32,
    pub upper: Rect,
    pub lower: Rect,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub player: Rect,
    /// Player box from the previous run at the same tick, if recorded
    pub ghost: Option<Rect>,
    pub pipes: Vec<PipeRects>,
    /// Blink the player while invulnerable
    pub flashing: bool,
    pub score: u32,
    pub lives: u32,
    pub paused: bool,
    pub ended: bool,
}

/// Build the draw list for a snapshot
pub fn project(state: &GameState, tuning: &Tuning) -> Frame {
    Frame {
        player: player_rect(state.player_y, tuning),
        ghost: ghost_y(state).map(|y| player_rect(y, tuning)),
        pipes: state
            .visible_obstacles
            .iter()
            .map(|o| pipe_rects(o, tuning))
            .collect(),
        flashing: state.is_invulnerable(),
        score: state.score,
        lives: state.lives,
        paused: state.paused,
        ended: state.ended,
    }
}

fn player_rect(y: f32, tuning: &Tuning) -> Rect {
    Rect::new(tuning.player_x, y, tuning.player_width, tuning.player_height)
}

/// Index of the current tick into a recorded path, `floor(elapsed / tick)`
/// taken from the exact tick count
pub fn ghost_frame_index(state: &GameState) -> usize {
    usize::try_from(state.ticks).unwrap_or(usize::MAX)
}

/// Ghost position at the current time, `None` once the recording ran out
pub fn ghost_y(state: &GameState) -> Option<f32> {
    state.ghost_path.get(ghost_frame_index(state)).copied()
}

/// Solid parts of a pipe above and below its gap
pub fn pipe_rects(obstacle: &Obstacle, tuning: &Tuning) -> PipeRects {
    let height = tuning.viewport_height;
    let gap_top = obstacle.gap_top(height);
    let gap_bottom = obstacle.gap_bottom(height);
    PipeRects {
        id: obstacle.id,
        upper: Rect::new(obstacle.x, 0.0, tuning.obstacle_width, gap_top),
        lower: Rect::new(
            obstacle.x,
            gap_bottom,
            tuning.obstacle_width,
            height - gap_bottom,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn obstacle(gap_center: f32, gap_height: f32) -> Obstacle {
        Obstacle {
            id: 4,
            x: 300.0,
            gap_center,
            gap_height,
            passed: false,
            spawn_time: 0.0,
        }
    }

    #[test]
    fn test_pipe_rects() {
        let tuning = Tuning::default();
        let rects = pipe_rects(&obstacle(0.5, 0.2), &tuning);
        assert!((rects.upper.size.y - 240.0).abs() < 1e-3);
        assert!((rects.lower.pos.y - 360.0).abs() < 1e-3);
        assert!((rects.lower.size.y - 240.0).abs() < 1e-3);
        assert_eq!(rects.upper.size.x, tuning.obstacle_width);
    }

    #[test]
    fn test_out_of_bounds_gap_collapses_to_zero() {
        let tuning = Tuning::default();
        let rects = pipe_rects(&obstacle(0.05, 0.5), &tuning);
        assert!(rects.upper.is_empty());
        assert_eq!(rects.upper.size.y, 0.0);
        assert!(!rects.lower.is_empty());

        let rects = pipe_rects(&obstacle(0.95, 0.5), &tuning);
        assert!(rects.lower.is_empty());
    }

    #[test]
    fn test_ghost_follows_tick_count() {
        let tuning = Tuning::default();
        let mut state = GameState::with_ghost(&tuning, Arc::from(vec![10.0, 20.0, 30.0]));
        assert_eq!(ghost_y(&state), Some(10.0));

        state.ticks = 2;
        assert_eq!(ghost_frame_index(&state), 2);
        assert_eq!(ghost_y(&state), Some(30.0));

        state.ticks = 3;
        assert_eq!(ghost_y(&state), None);
    }

    #[test]
    fn test_project_copies_hud() {
        let tuning = Tuning::default();
        let mut state = GameState::new(&tuning);
        state.score = 7;
        state.invulnerable_until = 1.0;
        state.visible_obstacles.push(obstacle(0.5, 0.2));

        let frame = project(&state, &tuning);
        assert_eq!(frame.score, 7);
        assert!(frame.flashing);
        assert!(frame.ghost.is_none());
        assert_eq!(frame.pipes.len(), 1);
        assert_eq!(frame.player.pos.x, tuning.player_x);
    }
}
