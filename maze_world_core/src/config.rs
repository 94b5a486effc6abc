use serde::{Deserialize, Serialize};

/// Rectangle of player offsets inside which movement is allowed.
///
/// Every edge is exclusive: a position lying exactly on an edge is outside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl PlayArea {
    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x > self.min_x && x < self.max_x && y > self.min_y && y < self.max_y
    }
}

impl Default for PlayArea {
    fn default() -> Self {
        PlayArea {
            min_x: -0.2,
            max_x: 4.3,
            min_y: -4.5,
            max_y: 0.2,
        }
    }
}

/// Tuning constants for movement, collision and pickups.
///
/// Missing fields fall back to their defaults when deserializing, so a config
/// file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Player speed in world units per time unit, before `step_scale`.
    pub velocity: f32,
    pub step_scale: f32,
    /// Fixed recoil applied opposite a blocked move.
    pub bounce_back: f32,
    /// Distance at which the player counts as standing on a key or door.
    pub pickup_radius: f32,
    pub play_area: PlayArea,
    /// Map row that a depth offset of zero lies on.
    ///
    /// Collision samples cells at `(offset.y + row_origin, offset.x)` while the
    /// scene places the player relative to the spawn cell, so this must equal
    /// the spawn row and the spawn must sit in column 0. Otherwise walls are
    /// tested in cells other than the ones the player is drawn over.
    pub row_origin: f32,
    /// Seed for tint randomization; `None` seeds from the OS.
    pub color_seed: Option<u64>,
}

impl GameConfig {
    /// Distance covered by one directional input over `dt`.
    #[inline]
    pub fn step(&self, dt: f32) -> f32 {
        self.velocity * dt * self.step_scale
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            velocity: 2.0,
            step_scale: 0.03,
            bounce_back: 0.09,
            pickup_radius: 0.1,
            play_area: PlayArea::default(),
            row_origin: 4.0,
            color_seed: None,
        }
    }
}
