//! Names, ownership, factions and the command chain.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    /// The entity's display name.
    pub value: String,
}

impl Name {
    /// Create a new name component.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { value: name.into() }
    }
}

/// The faction an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// The owning faction entity.
    pub id: EntityId,
}

/// Standing towards one other faction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// The other faction.
    pub faction: EntityId,
    /// Standing, -100 (war) to 100 (allied).
    pub value: f32,
}

/// A faction and its standings with other factions.
///
/// Relations are a list sorted by faction id rather than a map so the record
/// round-trips through every save format unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    /// Short identifier, e.g. `"PLA"`.
    pub slug: String,
    relations: Vec<Relation>,
}

impl Faction {
    /// Create a faction with neutral standing towards everyone.
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            relations: Vec::new(),
        }
    }

    /// Standing towards `other`; unknown factions are neutral (0).
    #[must_use]
    pub fn relation(&self, other: EntityId) -> f32 {
        self.relations
            .binary_search_by_key(&other, |r| r.faction)
            .map(|i| self.relations[i].value)
            .unwrap_or(0.0)
    }

    /// Set the standing towards `other`, clamped to [-100, 100].
    pub fn set_relation(&mut self, other: EntityId, value: f32) {
        let value = value.clamp(-100.0, 100.0);
        match self.relations.binary_search_by_key(&other, |r| r.faction) {
            Ok(i) => self.relations[i].value = value,
            Err(i) => self.relations.insert(
                i,
                Relation {
                    faction: other,
                    value,
                },
            ),
        }
    }

    /// Whether standing towards `other` is at or below `threshold`.
    #[must_use]
    pub fn is_hostile(&self, other: EntityId, threshold: f32) -> bool {
        self.relation(other) <= threshold
    }

    /// All recorded standings, sorted by faction id.
    #[must_use]
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }
}

/// Points at the entity this one takes orders from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commander {
    /// The commanding entity.
    pub id: EntityId,
}

/// The entities under this one's command.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Subordinates {
    /// Subordinate ids, in assignment order.
    pub ids: Vec<EntityId>,
}
