//! Level table loading
//!
//! A level is comma-separated text: one header line, then one
//! `gapCenter,gapHeight,spawnTime` record per obstacle.

use serde::{Deserialize, Serialize};

use crate::sim::Obstacle;

/// Why a level could not be loaded
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LevelError {
    #[error("level data is empty (expected a header line)")]
    MissingHeader,
    #[error("line {line}: expected 3 fields, found {found}")]
    Arity { line: usize, found: usize },
    #[error("line {line}: {field} is not a finite number: {value:?}")]
    NotANumber {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("level has no obstacles")]
    NoObstacles,
    #[error("obstacle at index {index} has id {id}")]
    IdOrder { index: usize, id: u32 },
}

const FIELDS: [&str; 3] = ["gapCenter", "gapHeight", "spawnTime"];

/// The full obstacle table for a session.
///
/// Serializes as the bare obstacle list; spawn order is rebuilt on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Obstacle>", into = "Vec<Obstacle>")]
pub struct Level {
    obstacles: Vec<Obstacle>,
    /// Indices into `obstacles`, stable-sorted by spawn time
    spawn_order: Vec<usize>,
}

impl Level {
    /// Parse level text. Every obstacle starts at `x = viewport_width`.
    pub fn parse(text: &str, viewport_width: f32) -> Result<Self, LevelError> {
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        if lines.next().is_none() {
            return Err(LevelError::MissingHeader);
        }

        let mut obstacles = Vec::new();
        for (index, line) in lines {
            let line_no = index + 1;
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != FIELDS.len() {
                return Err(LevelError::Arity {
                    line: line_no,
                    found: fields.len(),
                });
            }

            let mut values = [0.0f32; 3];
            for (slot, (raw, name)) in values.iter_mut().zip(fields.iter().zip(FIELDS)) {
                *slot = parse_field(raw, name, line_no)?;
            }
            let [gap_center, gap_height, spawn_time] = values;

            let obstacle = Obstacle {
                id: obstacles.len() as u32,
                x: viewport_width,
                gap_center,
                gap_height,
                passed: false,
                spawn_time,
            };
            if !obstacle.gap_within_bounds() {
                log::warn!(
                    "line {line_no}: gap band {gap_center}±{} leaves the viewport",
                    gap_height / 2.0
                );
            }
            obstacles.push(obstacle);
        }

        Self::from_obstacles(obstacles)
    }

    /// Build a level from an already-constructed table. Ids must equal
    /// positions, as `parse` assigns them.
    pub fn from_obstacles(obstacles: Vec<Obstacle>) -> Result<Self, LevelError> {
        if obstacles.is_empty() {
            return Err(LevelError::NoObstacles);
        }
        if let Some((index, o)) = obstacles
            .iter()
            .enumerate()
            .find(|(index, o)| o.id as usize != *index)
        {
            return Err(LevelError::IdOrder { index, id: o.id });
        }
        let mut spawn_order: Vec<usize> = (0..obstacles.len()).collect();
        spawn_order.sort_by(|&a, &b| obstacles[a].spawn_time.total_cmp(&obstacles[b].spawn_time));
        Ok(Self {
            obstacles,
            spawn_order,
        })
    }

    /// Obstacles in file order
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Obstacles in non-decreasing spawn time
    pub fn by_spawn_time(&self) -> impl Iterator<Item = &Obstacle> {
        self.spawn_order.iter().map(|&i| &self.obstacles[i])
    }

    pub fn get(&self, id: u32) -> Option<&Obstacle> {
        self.obstacles.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

impl TryFrom<Vec<Obstacle>> for Level {
    type Error = LevelError;

    fn try_from(obstacles: Vec<Obstacle>) -> Result<Self, Self::Error> {
        Self::from_obstacles(obstacles)
    }
}

impl From<Level> for Vec<Obstacle> {
    fn from(level: Level) -> Self {
        level.obstacles
    }
}

fn parse_field(raw: &str, field: &'static str, line: usize) -> Result<f32, LevelError> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LevelError::NotANumber {
            line,
            field,
            value: raw.to_string(),
        })
}
