use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::map::CellKind;

/// Slack on the pickup distance so a player exactly `pickup_radius` away
/// still counts after `cell + offset` rounding.
const PICKUP_TOLERANCE: f32 = 1e-5;

/// Which key the level offers, and therefore which texture keys and doors bind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyVariant {
    #[default]
    None,
    KeyA,
    KeyB,
}

impl KeyVariant {
    pub fn from_cell(kind: CellKind) -> KeyVariant {
        match kind {
            CellKind::KeyA => KeyVariant::KeyA,
            CellKind::KeyB => KeyVariant::KeyB,
            _ => KeyVariant::None,
        }
    }

    /// Texture slot the renderer binds for this variant.
    pub fn texture_slot(self) -> u32 {
        match self {
            KeyVariant::None => 0,
            KeyVariant::KeyA => 2,
            KeyVariant::KeyB => 3,
        }
    }
}

/// Key and door progress. Both flags only ever go from `false` to `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionFlags {
    pub key_collected: bool,
    pub door_open: bool,
    pub active_key: KeyVariant,
}

impl InteractionFlags {
    /// An open door is only removed from the scene once the key is held too.
    #[inline]
    pub fn door_passable(&self) -> bool {
        self.door_open && self.key_collected
    }
}

/// Location and variant of the level's key cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyCell {
    pub position: Vec2,
    pub variant: KeyVariant,
}

#[derive(Debug, Clone)]
pub struct InteractionState {
    flags: InteractionFlags,
    pickup_radius: f32,
}

impl InteractionState {
    pub fn new(pickup_radius: f32) -> Self {
        InteractionState {
            flags: InteractionFlags::default(),
            pickup_radius,
        }
    }

    #[inline]
    pub fn flags(&self) -> &InteractionFlags {
        &self.flags
    }

    /// Compares the player's cell-space position against the key and door cells.
    ///
    /// Positions are `(column, row)` pairs. A key cell always sets the active
    /// variant; reaching within `pickup_radius` of the key or door latches the
    /// matching flag.
    pub fn update(&mut self, player_pos: Vec2, key: Option<KeyCell>, door: Option<Vec2>) {
        if let Some(key) = key {
            self.flags.active_key = key.variant;
            if !self.flags.key_collected && self.within_reach(player_pos, key.position) {
                self.flags.key_collected = true;
                info!(variant = ?key.variant, position = %key.position, "key collected");
            }
        }

        if let Some(door) = door {
            if !self.flags.door_open && self.within_reach(player_pos, door) {
                self.flags.door_open = true;
                info!(position = %door, "door opened");
            }
        }
    }

    #[inline]
    fn within_reach(&self, player_pos: Vec2, target: Vec2) -> bool {
        player_pos.distance(target) <= self.pickup_radius + PICKUP_TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RADIUS: f32 = 0.1;

    fn key_a_at(x: f32, y: f32) -> Option<KeyCell> {
        Some(KeyCell {
            position: Vec2::new(x, y),
            variant: KeyVariant::KeyA,
        })
    }

    #[test]
    fn key_within_radius_is_collected() {
        let mut state = InteractionState::new(RADIUS);
        state.update(Vec2::new(2.0, 3.0), key_a_at(2.0, 3.0), None);
        assert!(state.flags().key_collected);
        assert_eq!(state.flags().active_key, KeyVariant::KeyA);
    }

    #[test]
    fn key_at_exact_radius_is_collected() {
        let mut state = InteractionState::new(0.5);
        state.update(Vec2::new(2.5, 3.0), key_a_at(2.0, 3.0), None);
        assert!(state.flags().key_collected);
    }

    #[test]
    fn radius_holds_away_from_the_origin() {
        // spawn two columns over, stepped back 0.9 towards the key
        let player = Vec2::new(2.0, 0.0) + Vec2::new(-0.9, 0.0);
        let mut state = InteractionState::new(RADIUS);
        state.update(player, key_a_at(1.0, 0.0), Some(Vec2::new(1.2, 0.0)));
        assert!(state.flags().key_collected);
        assert!(state.flags().door_open);
    }

    #[test]
    fn just_past_radius_is_not_collected() {
        let mut state = InteractionState::new(RADIUS);
        state.update(Vec2::new(3.0, 2.11), key_a_at(3.0, 2.0), None);
        assert!(!state.flags().key_collected);
    }

    #[test]
    fn distant_key_sets_variant_only() {
        let mut state = InteractionState::new(RADIUS);
        let key = Some(KeyCell {
            position: Vec2::new(4.0, 0.0),
            variant: KeyVariant::KeyB,
        });
        state.update(Vec2::new(0.0, 4.0), key, None);
        assert!(!state.flags().key_collected);
        assert_eq!(state.flags().active_key, KeyVariant::KeyB);
        assert_eq!(state.flags().active_key.texture_slot(), 3);
    }

    #[test]
    fn flags_stay_latched() {
        let mut state = InteractionState::new(RADIUS);
        let door = Some(Vec2::new(1.0, 1.0));
        state.update(Vec2::new(1.0, 1.0), key_a_at(1.0, 1.0), door);
        assert!(state.flags().key_collected);
        assert!(state.flags().door_open);

        for _ in 0..10 {
            state.update(Vec2::new(9.0, 9.0), key_a_at(1.0, 1.0), door);
            assert!(state.flags().key_collected);
            assert!(state.flags().door_open);
        }
        assert!(state.flags().door_passable());
    }

    #[test]
    fn door_alone_is_not_passable() {
        let mut state = InteractionState::new(RADIUS);
        state.update(Vec2::ZERO, key_a_at(3.0, 3.0), Some(Vec2::new(0.05, 0.0)));
        assert!(state.flags().door_open);
        assert!(!state.flags().key_collected);
        assert!(!state.flags().door_passable());
    }

    #[test]
    fn missing_cells_change_nothing() {
        let mut state = InteractionState::new(RADIUS);
        state.update(Vec2::ZERO, None, None);
        assert_eq!(*state.flags(), InteractionFlags::default());
        assert_eq!(KeyVariant::from_cell(CellKind::Wall), KeyVariant::None);
        assert_eq!(KeyVariant::None.texture_slot(), 0);
    }
}
