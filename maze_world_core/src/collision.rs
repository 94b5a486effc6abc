use tracing::debug;

use crate::{config::GameConfig, interaction::InteractionFlags, map::TileMap};

/// Decides whether the player may stand at offset `(x, y)`.
///
/// `x` is the lateral offset (map column), `y` the depth offset; the sampled
/// map row is `y + row_origin`. Checks run in order:
///
/// 1. a collected key disables collision everywhere;
/// 2. positions outside the play area are refused;
/// 3. the cells at the ceiling and at the floor of `(y + row_origin, x)` are
///    sampled, and a wall or door in either refuses the move. A sample that
///    falls off the map refuses it too.
pub fn can_enter(
    map: &TileMap,
    flags: &InteractionFlags,
    config: &GameConfig,
    x: f32,
    y: f32,
) -> bool {
    if flags.key_collected {
        return true;
    }
    if !config.play_area.contains(x, y) {
        return false;
    }

    let row = y + config.row_origin;
    let samples = [
        (row.ceil() as i64, x.ceil() as i64),
        (row.floor() as i64, x.floor() as i64),
    ];
    samples.iter().all(|&(row, col)| match map.cell_at(row, col) {
        Ok(kind) => !kind.is_blocking(),
        Err(err) => {
            debug!(%err, "collision sample left the map");
            false
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maze() -> TileMap {
        TileMap::parse(
            "5 5
             2 2 2 2 2
             0 0 0 3 0
             0 2 0 2 0
             0 2 5 2 0
             4 0 1 0 1",
        )
        .unwrap()
    }

    fn open_floor() -> TileMap {
        let description = format!("5 5 {}", "0 ".repeat(25));
        TileMap::parse(&description).unwrap()
    }

    fn free() -> InteractionFlags {
        InteractionFlags::default()
    }

    #[test]
    fn open_floor_is_enterable() {
        let config = GameConfig::default();
        let map = maze();
        assert!(can_enter(&map, &free(), &config, 0.0, 0.0));
        assert!(can_enter(&map, &free(), &config, 2.0, 0.0));
        assert!(can_enter(&map, &free(), &config, 2.0, -2.0));
    }

    #[test]
    fn walls_and_doors_block() {
        let config = GameConfig::default();
        let map = maze();
        // wall at row 3, col 1
        assert!(!can_enter(&map, &free(), &config, 1.0, -1.0));
        // door at row 1, col 3
        assert!(!can_enter(&map, &free(), &config, 3.0, -3.0));
    }

    #[test]
    fn either_sample_blocks() {
        let config = GameConfig::default();
        let map = maze();
        // ceiling sample (row 4, col 1) is floor, floor sample (row 3, col 0) is floor
        assert!(can_enter(&map, &free(), &config, 0.5, -0.5));
        // ceiling sample lands on the wall at (3, 1), floor sample on (2, 0)
        assert!(!can_enter(&map, &free(), &config, 0.5, -1.5));
        // floor sample lands on the wall at (3, 1), ceiling sample on (4, 2)
        assert!(!can_enter(&map, &free(), &config, 1.5, -0.5));
    }

    #[test]
    fn outside_play_area_is_refused() {
        let config = GameConfig::default();
        let map = open_floor();
        assert!(!can_enter(&map, &free(), &config, -0.2, 0.0));
        assert!(!can_enter(&map, &free(), &config, -0.3, -1.0));
        assert!(!can_enter(&map, &free(), &config, 4.3, -1.0));
        assert!(!can_enter(&map, &free(), &config, 1.0, -4.5));
        assert!(!can_enter(&map, &free(), &config, 1.0, 0.2));
    }

    #[test]
    fn samples_off_the_map_are_refused() {
        let config = GameConfig::default();
        let map = open_floor();
        // inside the play area but floor(x) is column -1
        assert!(!can_enter(&map, &free(), &config, -0.1, -1.0));
        // ceil(y + 4) is row 5 on a five row map
        assert!(!can_enter(&map, &free(), &config, 1.0, 0.1));
    }

    #[test]
    fn row_origin_tracks_the_spawn_row() {
        // spawn on row 1 of a two row map, wall to its right
        let map = TileMap::parse("2 2\n0 0\n4 2").unwrap();
        let config = GameConfig {
            row_origin: 1.0,
            ..GameConfig::default()
        };
        assert!(can_enter(&map, &free(), &config, 0.0, 0.0));
        assert!(can_enter(&map, &free(), &config, 0.0, -1.0));
        assert!(!can_enter(&map, &free(), &config, 1.0, 0.0));
    }

    #[test]
    fn collected_key_disables_collision() {
        let config = GameConfig::default();
        let map = maze();
        let flags = InteractionFlags {
            key_collected: true,
            ..InteractionFlags::default()
        };
        assert!(can_enter(&map, &flags, &config, 1.0, -1.0));
        assert!(can_enter(&map, &flags, &config, 3.0, -3.0));
        assert!(can_enter(&map, &flags, &config, -10.0, 10.0));
    }
}
