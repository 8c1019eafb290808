//! Weapons and damage.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// A weapon system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    /// Damage per shot.
    pub damage: f32,
    /// Reach, world units.
    pub range: f32,
    /// Seconds between shots.
    pub cooldown: f64,
    /// Current target. Cleared when the target is gone.
    pub target_id: Option<EntityId>,
}

impl Weapon {
    /// An idle weapon.
    #[must_use]
    pub fn new(damage: f32, range: f32, cooldown: f64) -> Self {
        Self {
            damage,
            range,
            cooldown,
            target_id: None,
        }
    }
}

/// Structural integrity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitpoints {
    /// Current hit points.
    pub hp: f32,
    /// Maximum hit points.
    pub max: f32,
    /// Regeneration per second.
    pub regen: f32,
}

impl Hitpoints {
    /// Create a hitpoints component at full HP.
    #[must_use]
    pub fn full(max: f32) -> Self {
        Self {
            hp: max,
            max,
            regen: 0.0,
        }
    }

    /// Returns `true` if the entity is alive (HP > 0).
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Apply damage, clamping to zero.
    pub fn damage(&mut self, amount: f32) {
        self.hp = (self.hp - amount).max(0.0);
    }

    /// Regenerate for `dt` seconds, clamping to max. Dead entities stay dead.
    pub fn regenerate(&mut self, dt: f32) {
        if self.is_alive() {
            self.hp = (self.hp + self.regen * dt).min(self.max);
        }
    }
}
