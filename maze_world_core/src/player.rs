use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{collision, config::GameConfig, interaction::InteractionFlags, map::TileMap};

/// Arrow-key directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector in offset space: x is lateral, y is depth.
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::Y,
            Direction::Down => Vec2::NEG_Y,
            Direction::Left => Vec2::NEG_X,
            Direction::Right => Vec2::X,
        }
    }
}

/// Player position relative to the spawn cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// `x` follows map columns, `y` follows map rows.
    pub offset: Vec2,
    /// Height above the maze floor, driven by the modifier axis. Not collision checked.
    pub lift: f32,
}

impl PlayerState {
    /// The map cell the player is over, as `(row, col)`, rounded to the nearest cell.
    pub fn cell(&self, row_origin: f32) -> (i64, i64) {
        (
            (self.offset.y + row_origin).round() as i64,
            self.offset.x.round() as i64,
        )
    }
}

/// What a directional input ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Bounced,
    Lifted,
}

#[derive(Debug, Clone)]
pub struct PlayerController {
    state: PlayerState,
    config: GameConfig,
}

impl PlayerController {
    pub fn new(config: GameConfig) -> Self {
        PlayerController {
            state: PlayerState::default(),
            config,
        }
    }

    #[inline]
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Places the player at an explicit offset, bypassing collision.
    pub fn teleport(&mut self, offset: Vec2) {
        self.state.offset = offset;
    }

    /// Applies one directional input lasting `dt`.
    ///
    /// With the modifier held, up/down drive the lift axis instead of depth
    /// (up lowers, down raises) and left/right are unaffected. Otherwise the
    /// candidate position is checked with [`collision::can_enter`]: accepted
    /// candidates are committed, refused ones push the player back by the
    /// fixed bounce-back distance, measured from where it stood.
    pub fn handle_directional_input(
        &mut self,
        map: &TileMap,
        flags: &InteractionFlags,
        direction: Direction,
        modifier_held: bool,
        dt: f32,
    ) -> MoveOutcome {
        let step = self.config.step(dt);

        if modifier_held {
            match direction {
                Direction::Up => {
                    self.state.lift -= step;
                    return MoveOutcome::Lifted;
                }
                Direction::Down => {
                    self.state.lift += step;
                    return MoveOutcome::Lifted;
                }
                Direction::Left | Direction::Right => {}
            }
        }

        let unit = direction.unit();
        let candidate = self.state.offset + unit * step;
        if collision::can_enter(map, flags, &self.config, candidate.x, candidate.y) {
            self.state.offset = candidate;
            MoveOutcome::Moved
        } else {
            let bounced = self.state.offset - unit * self.config.bounce_back;
            debug!(?direction, from = %self.state.offset, to = %bounced, "move blocked");
            self.state.offset = bounced;
            MoveOutcome::Bounced
        }
    }
}
