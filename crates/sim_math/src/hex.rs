//! Axial hex coordinates for the galaxy map.
//!
//! Sectors sit on a pointy-top hex grid. [`HexCoord`] stores the axial
//! `(q, r)` pair; the implicit third cube coordinate is `-q - r`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// The six axial neighbour offsets, clockwise starting east.
const DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

/// An axial hex coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct HexCoord {
    /// Column axis.
    pub q: i32,
    /// Row axis.
    pub r: i32,
}

impl HexCoord {
    /// The origin hex.
    pub const ORIGIN: Self = Self { q: 0, r: 0 };

    /// Create a coordinate from axial components.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit cube `s` component.
    #[must_use]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// Grid distance in hex steps.
    #[must_use]
    pub fn distance(self, other: Self) -> u32 {
        let dq = (self.q - other.q).unsigned_abs();
        let dr = (self.r - other.r).unsigned_abs();
        let ds = (self.s() - other.s()).unsigned_abs();
        dq.max(dr).max(ds)
    }

    /// The six adjacent hexes, clockwise starting east.
    #[must_use]
    pub fn neighbours(self) -> [Self; 6] {
        DIRECTIONS.map(|(dq, dr)| Self::new(self.q + dq, self.r + dr))
    }

    /// Whether `other` shares an edge with this hex.
    #[must_use]
    pub fn is_adjacent(self, other: Self) -> bool {
        self.distance(other) == 1
    }

    /// Centre of the hex on the galaxy map for a hex of the given circumradius.
    #[must_use]
    pub fn to_world(self, size: f32) -> Vec2 {
        let q = self.q as f32;
        let r = self.r as f32;
        Vec2::new(size * 3f32.sqrt() * (q + r / 2.0), size * 1.5 * r)
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}
