//! Obstacle lifecycle: spawn, scroll, score, retire

use super::state::GameState;
use crate::level::Level;
use crate::tuning::Tuning;

/// Scroll every visible obstacle left by one tick
pub fn advance(state: &mut GameState, tuning: &Tuning) {
    for obstacle in &mut state.visible_obstacles {
        obstacle.x -= tuning.obstacle_speed;
    }
}

/// Bring obstacle `id` on screen unless it already entered play this run.
///
/// Returns whether it was spawned.
pub fn spawn(state: &mut GameState, level: &Level, id: u32) -> bool {
    if state.has_spawned(id) {
        return false;
    }
    let Some(template) = level.get(id) else {
        log::warn!("spawn requested for unknown obstacle {id}");
        return false;
    };
    log::debug!("obstacle {id} spawned at t={:.3}", state.elapsed_time);
    state.visible_obstacles.push(template.clone());
    true
}

/// Spawn every obstacle due within the current tick window.
///
/// An obstacle is due once `spawn_time - elapsed_time < tick_seconds`, so one
/// scheduled before the first tick is not skipped. Several due together
/// enter in spawn-time order.
pub fn spawn_due(state: &mut GameState, level: &Level, tuning: &Tuning) -> usize {
    let due: Vec<u32> = level
        .by_spawn_time()
        .take_while(|o| o.spawn_time - state.elapsed_time < tuning.tick_seconds)
        .map(|o| o.id)
        .collect();

    due.into_iter()
        .filter(|&id| spawn(state, level, id))
        .count()
}

/// Credit every obstacle whose right edge moved left of the player.
///
/// Returns the number credited this tick; the score grows by the same amount.
pub fn credit_passes(state: &mut GameState, tuning: &Tuning) -> u32 {
    let mut credited = 0;
    for obstacle in &mut state.visible_obstacles {
        if !obstacle.passed && obstacle.right(tuning.obstacle_width) < tuning.player_x {
            obstacle.passed = true;
            state.passed_ids.insert(obstacle.id);
            credited += 1;
            log::debug!("obstacle {} passed", obstacle.id);
        }
    }
    state.score += credited;
    credited
}

/// Drop obstacles that scrolled off the left edge
pub fn retire(state: &mut GameState, tuning: &Tuning) {
    state
        .visible_obstacles
        .retain(|o| o.x >= -tuning.obstacle_width);
}

/// Every obstacle of the level has been individually credited
pub fn level_complete(state: &GameState, level: &Level) -> bool {
    level
        .obstacles()
        .iter()
        .all(|o| state.passed_ids.contains(&o.id))
}
