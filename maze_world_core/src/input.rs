use serde::{Deserialize, Serialize};

use crate::player::Direction;

/// Keys the game reacts to, already mapped from the platform's key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    ColorRandomize,
    Fullscreen,
    Quit,
}

impl Key {
    pub fn direction(self) -> Option<Direction> {
        match self {
            Key::Up => Some(Direction::Up),
            Key::Down => Some(Direction::Down),
            Key::Left => Some(Direction::Left),
            Key::Right => Some(Direction::Right),
            Key::ColorRandomize | Key::Fullscreen | Key::Quit => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEventKind {
    KeyDown,
    KeyUp,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    pub kind: KeyEventKind,
    pub key: Key,
    pub modifiers: Modifiers,
}

impl InputEvent {
    pub fn down(key: Key) -> Self {
        InputEvent {
            kind: KeyEventKind::KeyDown,
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn up(key: Key) -> Self {
        InputEvent {
            kind: KeyEventKind::KeyUp,
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }
}

/// One-shot actions fired when their key is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    RandomizeColor,
    ToggleFullscreen,
    Quit,
}

const DIRECTION_COUNT: usize = 4;

/// Which direction keys are currently held, and whether shift was down when
/// the last key event arrived. Held directions re-trigger every frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    held: [bool; DIRECTION_COUNT],
    shift: bool,
}

impl InputState {
    /// Records an event. Releasing an action key yields its command.
    pub fn apply(&mut self, event: InputEvent) -> Option<Command> {
        self.shift = event.modifiers.shift;
        let is_down = event.kind == KeyEventKind::KeyDown;

        if let Some(direction) = event.key.direction() {
            self.held[index(direction)] = is_down;
            return None;
        }
        if is_down {
            return None;
        }
        match event.key {
            Key::ColorRandomize => Some(Command::RandomizeColor),
            Key::Fullscreen => Some(Command::ToggleFullscreen),
            Key::Quit => Some(Command::Quit),
            Key::Up | Key::Down | Key::Left | Key::Right => None,
        }
    }

    #[inline]
    pub fn is_held(&self, direction: Direction) -> bool {
        self.held[index(direction)]
    }

    #[inline]
    pub fn shift(&self) -> bool {
        self.shift
    }

    /// Held directions in a fixed order.
    pub fn held_directions(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(|direction| self.is_held(*direction))
    }

    /// Forgets every held key. For front ends that never see key releases.
    pub fn release_all(&mut self) {
        self.held = [false; DIRECTION_COUNT];
        self.shift = false;
    }
}

const fn index(direction: Direction) -> usize {
    match direction {
        Direction::Up => 0,
        Direction::Down => 1,
        Direction::Left => 2,
        Direction::Right => 3,
    }
}
