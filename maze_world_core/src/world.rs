use rand::{SeedableRng, rngs::StdRng};

use crate::{
    color::ColorState,
    config::GameConfig,
    input::{Command, InputEvent, InputState},
    interaction::{InteractionFlags, InteractionState},
    map::TileMap,
    player::{PlayerController, PlayerState},
    scene::{Frame, SceneComposer},
};

/// All mutable game state, owned by the frame loop.
///
/// A frame is driven as: feed the frame's events to [`World::handle_event`],
/// then call [`World::tick`] once with the frame time.
pub struct World {
    map: TileMap,
    composer: SceneComposer,
    player: PlayerController,
    interaction: InteractionState,
    input: InputState,
    color: ColorState,
    rng: StdRng,
    elapsed: f32,
    fullscreen: bool,
}

impl World {
    pub fn new(map: TileMap, config: GameConfig) -> Self {
        let rng = match config.color_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        World {
            composer: SceneComposer::new(&map),
            map,
            interaction: InteractionState::new(config.pickup_radius),
            player: PlayerController::new(config),
            input: InputState::default(),
            color: ColorState::default(),
            rng,
            elapsed: 0.0,
            fullscreen: false,
        }
    }

    /// Records one input event and applies any command it fires.
    ///
    /// Tint randomization and the fullscreen flag are handled here; the
    /// command is still returned so the front end can react to it.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<Command> {
        let command = self.input.apply(event)?;
        match command {
            Command::RandomizeColor => self.color.randomize(&mut self.rng),
            Command::ToggleFullscreen => self.fullscreen = !self.fullscreen,
            Command::Quit => {}
        }
        Some(command)
    }

    /// Advances one frame: held directions move the player, then the scene
    /// is composed. `dt` is whatever the platform measured for this frame.
    pub fn tick(&mut self, dt: f32) -> Frame {
        self.elapsed += dt;

        let shift = self.input.shift();
        for direction in self.input.held_directions() {
            self.player.handle_directional_input(
                &self.map,
                self.interaction.flags(),
                direction,
                shift,
                dt,
            );
        }

        self.composer.compose_frame(
            &self.map,
            self.player.state(),
            &mut self.interaction,
            self.elapsed,
        )
    }

    /// Drops held keys, for front ends that cannot observe key releases.
    pub fn release_keys(&mut self) {
        self.input.release_all();
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn player(&self) -> &PlayerState {
        self.player.state()
    }

    /// The `(row, col)` map cell nearest the player.
    pub fn player_cell(&self) -> (i64, i64) {
        self.player.state().cell(self.player.config().row_origin)
    }

    pub fn player_mut(&mut self) -> &mut PlayerController {
        &mut self.player
    }

    pub fn flags(&self) -> &InteractionFlags {
        self.interaction.flags()
    }

    pub fn color(&self) -> ColorState {
        self.color
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;

    fn world() -> World {
        let map = TileMap::parse("2 2\n0 0\n4 0").unwrap();
        let config = GameConfig {
            color_seed: Some(3),
            row_origin: 1.0,
            ..GameConfig::default()
        };
        World::new(map, config)
    }

    #[test]
    fn held_key_moves_every_tick() {
        let mut world = world();
        world.handle_event(InputEvent::down(Key::Down));
        world.tick(1.0);
        world.tick(1.0);
        assert!((world.player().offset.y + 0.12).abs() < 1e-6);

        world.handle_event(InputEvent::up(Key::Down));
        world.tick(1.0);
        assert!((world.player().offset.y + 0.12).abs() < 1e-6);
        assert_eq!(world.elapsed(), 3.0);
        assert_eq!(world.player_cell(), (1, 0));
    }

    #[test]
    fn commands_update_state() {
        let mut world = world();
        assert_eq!(
            world.handle_event(InputEvent::up(Key::ColorRandomize)),
            Some(Command::RandomizeColor)
        );
        assert_ne!(world.color(), ColorState::default());

        world.handle_event(InputEvent::up(Key::Fullscreen));
        assert!(world.is_fullscreen());
        world.handle_event(InputEvent::up(Key::Fullscreen));
        assert!(!world.is_fullscreen());

        assert_eq!(world.handle_event(InputEvent::down(Key::Quit)), None);
        assert_eq!(
            world.handle_event(InputEvent::up(Key::Quit)),
            Some(Command::Quit)
        );
    }

    #[test]
    fn release_keys_stops_movement() {
        let mut world = world();
        world.handle_event(InputEvent::down(Key::Right));
        world.release_keys();
        world.tick(1.0);
        assert_eq!(world.player().offset.x, 0.0);
    }
}
