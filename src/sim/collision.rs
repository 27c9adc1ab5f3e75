//! Player physics and collision detection
//!
//! Everything here is a pure function of its inputs. The only source of
//! randomness is the explicit seed passed to [`bounce_velocity`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng;
use super::state::Obstacle;
use crate::tuning::Tuning;

/// Axis-aligned box in viewport pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, max: min + size }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict horizontal overlap (touching edges do not count)
    #[inline]
    pub fn overlaps_x(&self, left: f32, right: f32) -> bool {
        self.max.x > left && self.min.x < right
    }
}

/// Which half of a pipe was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipeSide {
    /// Player center at or above the gap center
    Top,
    /// Player center below the gap center
    Bottom,
}

/// What the player ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionKind {
    ScreenBottom,
    ScreenTop,
    Obstacle { id: u32, side: PipeSide },
}

/// Direction the player is thrown after a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bounce {
    Up,
    Down,
}

impl CollisionKind {
    /// Floor and pipe-bottom hits throw the player up, the rest down
    pub fn bounce(self) -> Bounce {
        match self {
            CollisionKind::ScreenBottom => Bounce::Up,
            CollisionKind::ScreenTop => Bounce::Down,
            CollisionKind::Obstacle { side: PipeSide::Bottom, .. } => Bounce::Up,
            CollisionKind::Obstacle { side: PipeSide::Top, .. } => Bounce::Down,
        }
    }
}

/// One tick of gravity: returns `(y, velocity)`
#[inline]
pub fn integrate(y: f32, velocity: f32, gravity: f32) -> (f32, f32) {
    let velocity = velocity + gravity;
    (y + velocity, velocity)
}

/// Keep the player box inside the viewport
#[inline]
pub fn clamp_to_viewport(y: f32, tuning: &Tuning) -> f32 {
    y.clamp(0.0, tuning.max_player_y())
}

/// Player bounding box for a given top edge
pub fn player_box(y: f32, tuning: &Tuning) -> Aabb {
    Aabb::new(
        Vec2::new(tuning.player_x, y),
        Vec2::new(tuning.player_width, tuning.player_height),
    )
}

#[inline]
pub fn hits_top(y: f32) -> bool {
    y <= 0.0
}

#[inline]
pub fn hits_bottom(y: f32, tuning: &Tuning) -> bool {
    y + tuning.player_height >= tuning.viewport_height
}

/// Player overlaps the solid part of an obstacle column
pub fn hits_obstacle(player: &Aabb, obstacle: &Obstacle, tuning: &Tuning) -> bool {
    if !player.overlaps_x(obstacle.x, obstacle.right(tuning.obstacle_width)) {
        return false;
    }
    player.min.y < obstacle.gap_top(tuning.viewport_height)
        || player.max.y > obstacle.gap_bottom(tuning.viewport_height)
}

/// Which half of the pipe the player struck
pub fn pipe_side(player: &Aabb, obstacle: &Obstacle, viewport_height: f32) -> PipeSide {
    if player.center().y > obstacle.gap_center * viewport_height {
        PipeSide::Bottom
    } else {
        PipeSide::Top
    }
}

/// First obstacle in iteration order that the player overlaps.
///
/// Order matters: this is the first match, not the nearest one.
pub fn first_obstacle_hit<'a>(
    player: &Aabb,
    obstacles: &'a [Obstacle],
    tuning: &Tuning,
) -> Option<&'a Obstacle> {
    obstacles.iter().find(|o| hits_obstacle(player, o, tuning))
}

/// Classify a collision at `y`, if any.
///
/// Precedence: screen bottom, screen top, then the first overlapping obstacle.
pub fn detect(y: f32, obstacles: &[Obstacle], tuning: &Tuning) -> Option<CollisionKind> {
    if hits_bottom(y, tuning) {
        return Some(CollisionKind::ScreenBottom);
    }
    if hits_top(y) {
        return Some(CollisionKind::ScreenTop);
    }
    let player = player_box(y, tuning);
    first_obstacle_hit(&player, obstacles, tuning).map(|o| CollisionKind::Obstacle {
        id: o.id,
        side: pipe_side(&player, o, tuning.viewport_height),
    })
}

/// Synthesize a bounce: returns `(velocity, next_seed)`.
///
/// Magnitude is `3 + |r| * 3` for a fresh draw `r` in `[-1, 1]`. The returned
/// seed must be stored or replays diverge.
pub fn bounce_velocity(bounce: Bounce, seed: u32) -> (f32, u32) {
    let (seed, r) = rng::next(seed);
    let magnitude = 3.0 + r.abs() * 3.0;
    let velocity = match bounce {
        Bounce::Up => -magnitude,
        Bounce::Down => magnitude,
    };
    (velocity, seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipe(id: u32, x: f32, gap_center: f32, gap_height: f32) -> Obstacle {
        Obstacle {
            id,
            x,
            gap_center,
            gap_height,
            passed: false,
            spawn_time: 0.0,
        }
    }

    #[test]
    fn test_integrate() {
        let (y, v) = integrate(100.0, 2.0, 0.5);
        assert_eq!(v, 2.5);
        assert_eq!(y, 102.5);
    }

    #[test]
    fn test_clamp() {
        let tuning = Tuning::default();
        assert_eq!(clamp_to_viewport(-10.0, &tuning), 0.0);
        assert_eq!(clamp_to_viewport(10_000.0, &tuning), tuning.max_player_y());
        assert_eq!(clamp_to_viewport(42.0, &tuning), 42.0);
    }

    #[test]
    fn test_screen_edges() {
        let tuning = Tuning::default();
        assert!(hits_top(0.0));
        assert!(hits_top(-3.0));
        assert!(!hits_top(0.1));
        assert!(hits_bottom(tuning.max_player_y(), &tuning));
        assert!(!hits_bottom(tuning.max_player_y() - 0.1, &tuning));
    }

    #[test]
    fn test_player_inside_gap_is_safe() {
        let tuning = Tuning::default();
        // Gap 240..360, player 24 tall at 280
        let obstacle = pipe(0, tuning.player_x - 10.0, 0.5, 0.2);
        let player = player_box(280.0, &tuning);
        assert!(!hits_obstacle(&player, &obstacle, &tuning));
    }

    #[test]
    fn test_no_horizontal_overlap_is_safe() {
        let tuning = Tuning::default();
        let obstacle = pipe(0, tuning.player_x + tuning.player_width, 0.5, 0.2);
        // Way outside the gap but only touching horizontally
        let player = player_box(10.0, &tuning);
        assert!(!hits_obstacle(&player, &obstacle, &tuning));
    }

    #[test]
    fn test_below_gap_is_bottom_hit_and_bounces_up() {
        let tuning = Tuning::default();
        let obstacle = pipe(3, tuning.player_x, 0.5, 0.2);
        // Player top at 400 >= gap bottom 360
        let kind = detect(400.0, &[obstacle], &tuning).unwrap();
        assert_eq!(
            kind,
            CollisionKind::Obstacle {
                id: 3,
                side: PipeSide::Bottom
            }
        );
        let (velocity, seed) = bounce_velocity(kind.bounce(), tuning.initial_seed);
        assert!(velocity < 0.0);
        assert!((3.0..=6.0).contains(&velocity.abs()));
        assert_eq!(seed, rng::hash(tuning.initial_seed));
    }

    #[test]
    fn test_above_gap_is_top_hit_and_bounces_down() {
        let tuning = Tuning::default();
        let obstacle = pipe(1, tuning.player_x, 0.5, 0.2);
        let kind = detect(100.0, &[obstacle], &tuning).unwrap();
        assert_eq!(kind.bounce(), Bounce::Down);
        let (velocity, _) = bounce_velocity(kind.bounce(), 9);
        assert!(velocity > 0.0);
    }

    #[test]
    fn test_first_match_wins_over_nearest() {
        let tuning = Tuning::default();
        // Both overlap; the second one is nearer the player's center but the
        // first in the list decides.
        let far = pipe(7, tuning.player_x + tuning.player_width - 1.0, 0.2, 0.1);
        let near = pipe(8, tuning.player_x, 0.9, 0.1);
        let kind = detect(300.0, &[far.clone(), near.clone()], &tuning).unwrap();
        assert_eq!(
            kind,
            CollisionKind::Obstacle {
                id: 7,
                side: PipeSide::Bottom
            }
        );
        let kind = detect(300.0, &[near, far], &tuning).unwrap();
        assert_eq!(
            kind,
            CollisionKind::Obstacle {
                id: 8,
                side: PipeSide::Top
            }
        );
    }

    #[test]
    fn test_screen_hits_take_precedence() {
        let tuning = Tuning::default();
        let obstacle = pipe(0, tuning.player_x, 0.5, 0.1);
        assert_eq!(
            detect(tuning.max_player_y() + 5.0, &[obstacle.clone()], &tuning),
            Some(CollisionKind::ScreenBottom)
        );
        assert_eq!(
            detect(-1.0, &[obstacle], &tuning),
            Some(CollisionKind::ScreenTop)
        );
    }

    #[test]
    fn test_bounce_is_deterministic() {
        assert_eq!(bounce_velocity(Bounce::Up, 5), bounce_velocity(Bounce::Up, 5));
        let (up, _) = bounce_velocity(Bounce::Up, 5);
        let (down, _) = bounce_velocity(Bounce::Down, 5);
        assert_eq!(up, -down);
    }
}
