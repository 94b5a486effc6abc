//! Grid-world logic for a small maze demo: the tile map, player movement with
//! cell collision, key and door pickups, and per-frame scene composition.
//! Rendering, windowing and asset loading live with the caller.

pub mod collision;
pub mod color;
pub mod config;
pub mod input;
pub mod interaction;
pub mod map;
pub mod mesh;
pub mod player;
pub mod scene;
pub mod world;

pub use config::{GameConfig, PlayArea};
pub use map::{CellKind, GridError, MapFormatError, TileMap};
pub use scene::{DrawInstruction, EntityKind, Frame};
pub use world::World;
