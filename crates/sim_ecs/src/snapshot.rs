//! Plain-data image of a world.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sim_component::{AnyComponent, EntityAllocator, EntityId};

use crate::cooldown::Cooldowns;

/// One entity as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub components: Vec<AnyComponent>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Cooldowns::is_empty")]
    pub cooldowns: Cooldowns,
}

/// Every entity plus the id allocator, in id order.
///
/// Indices and observers are not part of the image; they are runtime
/// wiring and are rebuilt by whoever restores the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub allocator: EntityAllocator,
    pub entities: Vec<EntitySnapshot>,
}
