//! Cargo, mining, docking and facilities.
//!
//! Only the contracts the kernel needs: quantities move between storages,
//! nothing here knows about prices.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::EntityId;

/// Tradeable goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Commodity {
    Ore,
    Ice,
    Fuel,
    Water,
    Food,
    Metals,
    Electronics,
}

impl Commodity {
    /// Every commodity, in declaration order.
    pub const ALL: [Commodity; 7] = [
        Commodity::Ore,
        Commodity::Ice,
        Commodity::Fuel,
        Commodity::Water,
        Commodity::Food,
        Commodity::Metals,
        Commodity::Electronics,
    ];
}

impl std::fmt::Display for Commodity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Commodity::Ore => "ore",
            Commodity::Ice => "ice",
            Commodity::Fuel => "fuel",
            Commodity::Water => "water",
            Commodity::Food => "food",
            Commodity::Metals => "metals",
            Commodity::Electronics => "electronics",
        };
        f.write_str(name)
    }
}

/// Errors from storage transfers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    /// Not enough of a commodity stored.
    #[error("insufficient {commodity}: requested {requested}, stored {stored}")]
    Insufficient {
        commodity: Commodity,
        requested: f32,
        stored: f32,
    },
}

/// Cargo hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    /// Total capacity across all commodities.
    pub max: f32,
    stored: BTreeMap<Commodity, f32>,
}

impl Storage {
    /// An empty hold of the given capacity.
    #[must_use]
    pub fn new(max: f32) -> Self {
        Self {
            max,
            stored: BTreeMap::new(),
        }
    }

    /// Quantity of `commodity` held.
    #[must_use]
    pub fn get(&self, commodity: Commodity) -> f32 {
        self.stored.get(&commodity).copied().unwrap_or(0.0)
    }

    /// Total quantity held.
    #[must_use]
    pub fn used(&self) -> f32 {
        self.stored.values().sum()
    }

    /// Free capacity.
    #[must_use]
    pub fn available(&self) -> f32 {
        (self.max - self.used()).max(0.0)
    }

    /// Whether no capacity is left.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.available() <= f32::EPSILON
    }

    /// Adds up to `quantity`, limited by free capacity. Returns what was added.
    pub fn add(&mut self, commodity: Commodity, quantity: f32) -> f32 {
        let added = quantity.min(self.available()).max(0.0);
        if added > 0.0 {
            *self.stored.entry(commodity).or_insert(0.0) += added;
        }
        added
    }

    /// Removes exactly `quantity`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Insufficient`] and leaves the hold unchanged
    /// when less than `quantity` is stored.
    pub fn remove(&mut self, commodity: Commodity, quantity: f32) -> Result<(), StorageError> {
        let stored = self.get(commodity);
        if stored + f32::EPSILON < quantity {
            return Err(StorageError::Insufficient {
                commodity,
                requested: quantity,
                stored,
            });
        }
        let left = (stored - quantity).max(0.0);
        if left <= f32::EPSILON {
            self.stored.remove(&commodity);
        } else {
            self.stored.insert(commodity, left);
        }
        Ok(())
    }

    /// Stored commodities with their quantities.
    pub fn iter(&self) -> impl Iterator<Item = (Commodity, f32)> + '_ {
        self.stored.iter().map(|(c, q)| (*c, *q))
    }
}

/// Mining equipment.
///
/// Yield accrues fractionally in `buffer`; only whole units move into
/// storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mining {
    /// Units per second while in range.
    pub efficiency: f32,
    /// Reach, world units.
    pub range: f32,
    /// The field being mined.
    pub entity_id: Option<EntityId>,
    /// Fractional yield not yet moved into storage.
    pub buffer: f32,
}

impl Mining {
    /// Idle mining equipment.
    #[must_use]
    pub fn new(efficiency: f32, range: f32) -> Self {
        Self {
            efficiency,
            range,
            entity_id: None,
            buffer: 0.0,
        }
    }
}

/// A resource field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Minable {
    /// What the field yields.
    pub commodity: Commodity,
    /// Units left.
    pub resources: f32,
}

impl Minable {
    /// Only whole units leave a field, so a fractional remainder counts as
    /// empty.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.resources < 1.0
    }
}

/// A floating cargo crate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    /// Contents.
    pub commodity: Commodity,
    /// Amount.
    pub quantity: f32,
}

/// Ship size class. Small craft dock anywhere and attack in flybys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShipSize {
    Small,
    #[default]
    Medium,
    Large,
}

/// Docking pads.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Docks {
    /// Number of pads.
    pub pads: u32,
    /// Entities currently docked, in arrival order.
    pub docked: Vec<EntityId>,
}

impl Docks {
    /// Empty docks with `pads` pads.
    #[must_use]
    pub fn new(pads: u32) -> Self {
        Self {
            pads,
            docked: Vec::new(),
        }
    }

    /// Whether a pad is free.
    #[must_use]
    pub fn has_free_pad(&self) -> bool {
        (self.docked.len() as u32) < self.pads
    }

    /// Occupies a pad. Returns `false` when full.
    pub fn dock(&mut self, entity: EntityId) -> bool {
        if self.docked.contains(&entity) {
            return true;
        }
        if !self.has_free_pad() {
            return false;
        }
        self.docked.push(entity);
        true
    }

    /// Frees the pad held by `entity`.
    pub fn undock(&mut self, entity: EntityId) {
        self.docked.retain(|e| *e != entity);
    }
}

/// Ability to dock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dockable {
    /// Size class.
    pub size: ShipSize,
    /// Where the entity is docked, if anywhere.
    pub docked_in: Option<EntityId>,
}

/// Marks a stationary facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Facility {
    /// Module slots.
    pub slots: u32,
}

/// A ship that can deploy itself as a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Deployable {
    /// Pads the deployed facility gets.
    pub pads: u32,
    /// Module slots the deployed facility gets.
    pub slots: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_limited_by_capacity() {
        let mut s = Storage::new(10.0);
        assert_eq!(s.add(Commodity::Ore, 6.0), 6.0);
        assert_eq!(s.add(Commodity::Ice, 6.0), 4.0);
        assert!(s.is_full());
        assert_eq!(s.used(), 10.0);
    }

    #[test]
    fn test_remove_insufficient_leaves_storage_unchanged() {
        let mut s = Storage::new(10.0);
        s.add(Commodity::Fuel, 2.0);
        let err = s.remove(Commodity::Fuel, 3.0).unwrap_err();
        assert!(matches!(err, StorageError::Insufficient { .. }));
        assert_eq!(s.get(Commodity::Fuel), 2.0);
        s.remove(Commodity::Fuel, 2.0).unwrap();
        assert_eq!(s.iter().count(), 0);
    }

    #[test]
    fn test_docks_respect_pad_count() {
        let mut d = Docks::new(1);
        assert!(d.dock(EntityId(1)));
        assert!(d.dock(EntityId(1)));
        assert!(!d.dock(EntityId(2)));
        d.undock(EntityId(1));
        assert!(d.dock(EntityId(2)));
    }
}
