use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::{
    interaction::{InteractionState, KeyCell, KeyVariant},
    map::{CellKind, TileMap},
    player::PlayerState,
};

/// Height at which floor tiles sit.
const FLOOR_LEVEL: f32 = -2.0;
/// Height at which walls, doors, keys and the player sit.
const ENTITY_LEVEL: f32 = -1.0;
const PLAYER_SCALE: f32 = 0.3;
const KEY_SCALE: f32 = 0.4;

const FLOOR_TEXTURE: u32 = 0;
const BRICK_TEXTURE: u32 = 1;

/// What mesh a draw instruction refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Floor,
    Wall,
    Door,
    Player,
    Key,
}

/// One mesh to draw this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawInstruction {
    pub kind: EntityKind,
    pub transform: Mat4,
    pub texture_slot: u32,
}

impl DrawInstruction {
    /// World-space origin of the instruction's transform.
    pub fn translation(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }
}

/// Everything the renderer needs for one frame. Rebuilt every frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub instructions: Vec<DrawInstruction>,
    /// World positions of every wall, in row-major order.
    pub wall_positions: Vec<Vec3>,
}

impl Frame {
    pub fn count(&self, kind: EntityKind) -> usize {
        self.instructions
            .iter()
            .filter(|instruction| instruction.kind == kind)
            .count()
    }
}

/// Turns the tile map plus the current game state into draw instructions.
#[derive(Debug, Clone)]
pub struct SceneComposer {
    key_cell: Option<KeyCell>,
    door_cell: Option<Vec2>,
}

impl SceneComposer {
    /// Resolves the level's key and door cells once. When a level has
    /// several of either, the last one in row-major order is the one checked.
    pub fn new(map: &TileMap) -> Self {
        let key_cell = map
            .find_last(CellKind::is_key)
            .map(|((row, col), kind)| KeyCell {
                position: cell_position(row, col),
                variant: KeyVariant::from_cell(kind),
            });
        let door_cell = map
            .find_last(|kind| kind == CellKind::Door)
            .map(|((row, col), _)| cell_position(row, col));
        SceneComposer {
            key_cell,
            door_cell,
        }
    }

    /// Walks the map once in row-major order and emits one instruction per
    /// visible entity.
    ///
    /// A spawn cell also runs the interaction check for the player standing
    /// at `spawn + offset`, so flags latched there affect cells later in the
    /// same frame.
    pub fn compose_frame(
        &self,
        map: &TileMap,
        player: &PlayerState,
        interaction: &mut InteractionState,
        elapsed: f32,
    ) -> Frame {
        let mut frame = Frame::default();

        for ((row, col), kind) in map.cells() {
            let (x, y) = (col as f32, row as f32);
            match kind {
                CellKind::Floor => frame.instructions.push(DrawInstruction {
                    kind: EntityKind::Floor,
                    transform: Mat4::from_translation(Vec3::new(FLOOR_LEVEL, x, y)),
                    texture_slot: FLOOR_TEXTURE,
                }),
                CellKind::Wall => {
                    let position = Vec3::new(ENTITY_LEVEL, x, y);
                    frame.wall_positions.push(position);
                    frame.instructions.push(DrawInstruction {
                        kind: EntityKind::Wall,
                        transform: Mat4::from_translation(position),
                        texture_slot: BRICK_TEXTURE,
                    });
                }
                CellKind::Door => {
                    let flags = interaction.flags();
                    if !flags.door_passable() {
                        frame.instructions.push(DrawInstruction {
                            kind: EntityKind::Door,
                            transform: Mat4::from_translation(Vec3::new(ENTITY_LEVEL, x, y)),
                            texture_slot: flags.active_key.texture_slot(),
                        });
                    }
                }
                CellKind::Spawn => {
                    let position = Vec2::new(x, y) + player.offset;
                    let origin = Vec3::new(ENTITY_LEVEL + player.lift, position.x, position.y);
                    frame.instructions.push(DrawInstruction {
                        kind: EntityKind::Player,
                        transform: Mat4::from_translation(origin)
                            * Mat4::from_scale(Vec3::splat(PLAYER_SCALE))
                            * spin(elapsed),
                        texture_slot: BRICK_TEXTURE,
                    });
                    interaction.update(position, self.key_cell, self.door_cell);
                }
                CellKind::KeyA | CellKind::KeyB => {
                    if !interaction.flags().key_collected {
                        frame.instructions.push(DrawInstruction {
                            kind: EntityKind::Key,
                            transform: Mat4::from_translation(Vec3::new(ENTITY_LEVEL, x, y))
                                * Mat4::from_scale(Vec3::splat(KEY_SCALE))
                                * spin(elapsed),
                            texture_slot: KeyVariant::from_cell(kind).texture_slot(),
                        });
                    }
                }
            }
        }

        frame
    }
}

/// Cell-space position `(column, row)` used for proximity checks.
fn cell_position(row: usize, col: usize) -> Vec2 {
    Vec2::new(col as f32, row as f32)
}

/// Idle rotation for animated meshes after `elapsed` seconds.
fn spin(elapsed: f32) -> Mat4 {
    let tumble = Vec3::new(0.0, 1.0, 1.0).normalize();
    Mat4::from_axis_angle(tumble, elapsed * FRAC_PI_2)
        * Mat4::from_axis_angle(Vec3::X, elapsed * FRAC_PI_4)
}
