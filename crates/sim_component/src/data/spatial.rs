//! Where things are.

use serde::{Deserialize, Serialize};
use sim_math::{HexCoord, Vec2};

use crate::entity::EntityId;

/// In-sector position of an entity.
///
/// `sector` is readable by anyone but only the world may change it, because
/// sector-partitioned indices have to be told about every sector crossing.
/// Use `World::relocate` to move an entity between sectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Coordinates inside the sector, in world units.
    pub coord: Vec2,
    /// Facing, radians counter-clockwise from +X.
    pub angle: f32,
    sector: EntityId,
    /// Set by navigation when the entity moved during the current tick.
    #[serde(default)]
    pub moved: bool,
}

impl Position {
    /// Create a position inside `sector`.
    #[must_use]
    pub fn new(coord: Vec2, sector: EntityId) -> Self {
        Self {
            coord,
            angle: 0.0,
            sector,
            moved: false,
        }
    }

    /// The sector this entity is in.
    #[must_use]
    pub fn sector(&self) -> EntityId {
        self.sector
    }

    /// Distance to another position, or `None` when the two are in
    /// different sectors.
    #[must_use]
    pub fn distance_to(&self, other: &Position) -> Option<f32> {
        (self.sector == other.sector).then(|| self.coord.distance(other.coord))
    }

    /// The same position moved to `coord` in `sector`.
    ///
    /// This only builds a value. A live entity changes sector through
    /// `World::relocate`, which announces the crossing.
    #[must_use]
    pub fn in_sector(self, sector: EntityId, coord: Vec2) -> Self {
        Self {
            coord,
            sector,
            ..self
        }
    }

    /// In-place access to everything but the sector.
    pub fn edit(&mut self) -> PositionMut<'_> {
        PositionMut {
            coord: &mut self.coord,
            angle: &mut self.angle,
            moved: &mut self.moved,
            sector: self.sector,
        }
    }
}

/// Write access to a live [`Position`] that cannot change its sector.
#[derive(Debug)]
pub struct PositionMut<'a> {
    pub coord: &'a mut Vec2,
    pub angle: &'a mut f32,
    pub moved: &'a mut bool,
    sector: EntityId,
}

impl PositionMut<'_> {
    #[must_use]
    pub fn sector(&self) -> EntityId {
        self.sector
    }
}

/// Marks an entity as a sector: a node of the galaxy graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    /// Location on the galaxy hex grid.
    pub hex: HexCoord,
}

/// A jump gate. Its destination is the paired gate in another sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Teleport {
    /// The gate on the other side, if linked.
    pub destination_id: Option<EntityId>,
}

/// A disposable move target. Reaching it removes it from the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Waypoint {
    /// The entity that placed it.
    pub owner: Option<EntityId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_requires_same_sector() {
        let a = Position::new(Vec2::ZERO, EntityId(1));
        let b = Position::new(Vec2::new(3.0, 4.0), EntityId(1));
        let c = Position::new(Vec2::new(3.0, 4.0), EntityId(2));
        assert_eq!(a.distance_to(&b), Some(5.0));
        assert_eq!(a.distance_to(&c), None);
    }

    #[test]
    fn test_in_sector_keeps_heading() {
        let mut p = Position::new(Vec2::ZERO, EntityId(1));
        p.angle = 1.5;
        let moved = p.in_sector(EntityId(2), Vec2::new(1.0, 1.0));
        assert_eq!(moved.sector(), EntityId(2));
        assert_eq!(moved.coord, Vec2::new(1.0, 1.0));
        assert_eq!(moved.angle, 1.5);
        assert_eq!(p.sector(), EntityId(1));
    }

    #[test]
    fn test_edit_leaves_sector_alone() {
        let mut p = Position::new(Vec2::ZERO, EntityId(4));
        let view = p.edit();
        *view.coord = Vec2::new(3.0, 0.0);
        *view.moved = true;
        assert_eq!(view.sector(), EntityId(4));
        assert_eq!(p.coord, Vec2::new(3.0, 0.0));
        assert!(p.moved);
        assert_eq!(p.sector(), EntityId(4));
    }
}
