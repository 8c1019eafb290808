//! Entity identifiers and allocation.
//!
//! An [`EntityId`] is a lightweight `u64` identifier with no inherent data.
//! Ids are handed out by the [`EntityAllocator`] owned by the world and are
//! never reused, so a stale id held in another entity's component can only
//! ever resolve to "gone", never to a different entity.

use serde::{Deserialize, Serialize};

/// A unique entity identifier.
///
/// Cross-entity relations (owner, target, commander, ...) are stored as
/// `EntityId` fields and resolved through the world on use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The null / invalid entity sentinel.
    pub const INVALID: EntityId = EntityId(0);

    /// Create an entity id from a raw `u64` identifier.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) entity id.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Allocates monotonically increasing entity ids.
///
/// The allocator is part of the persisted world state: restoring it from a
/// save keeps ids unique across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    /// Creates a new allocator. Ids start at 1 (0 is reserved for [`EntityId::INVALID`]).
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Restores an allocator that will hand out `next_id` next.
    #[must_use]
    pub fn resume_at(next_id: u64) -> Self {
        Self {
            next_id: next_id.max(1),
        }
    }

    /// Allocates a fresh entity id.
    pub fn allocate(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        EntityId(id)
    }

    /// The id the next call to [`allocate`](Self::allocate) returns.
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next_id
    }

    /// Returns the number of entities allocated so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_id - 1
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_creation() {
        let e = EntityId::from_raw(42);
        assert_eq!(e.id(), 42);
        assert!(e.is_valid());
    }

    #[test]
    fn test_entity_invalid() {
        assert!(!EntityId::INVALID.is_valid());
        assert_eq!(EntityId::INVALID.id(), 0);
    }

    #[test]
    fn test_allocator_produces_unique_ids() {
        let mut alloc = EntityAllocator::new();
        let e1 = alloc.allocate();
        let e2 = alloc.allocate();
        let e3 = alloc.allocate();
        assert_eq!(e1.id(), 1);
        assert_eq!(e2.id(), 2);
        assert_eq!(e3.id(), 3);
        assert_eq!(alloc.count(), 3);
    }

    #[test]
    fn test_allocator_resume_never_reuses() {
        let mut alloc = EntityAllocator::resume_at(17);
        assert_eq!(alloc.allocate(), EntityId(17));
        assert_eq!(alloc.peek(), 18);
    }

    #[test]
    fn test_entity_serializes_as_plain_number() {
        let json = serde_json::to_string(&EntityId::from_raw(999)).unwrap();
        assert_eq!(json, "999");
    }
}
