//! Query descriptors.
//!
//! A [`QueryDescriptor`] declares which component kinds and tags an entity
//! must carry to be seen by a system. Cached indices, sector indices and
//! one-off scans all share its [`accepts`](QueryDescriptor::accepts)
//! predicate.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::component::ComponentKind;
use crate::mask::ComponentMask;

/// Describes the entities a system wants to see.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct QueryDescriptor {
    /// Components the entity must hold.
    pub required: ComponentMask,
    /// Tags the entity must carry.
    pub tags: BTreeSet<String>,
}

impl QueryDescriptor {
    /// Create a descriptor matching every entity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            required: ComponentMask::EMPTY,
            tags: BTreeSet::new(),
        }
    }

    /// Create a descriptor requiring all of `kinds`.
    #[must_use]
    pub fn of(kinds: &[ComponentKind]) -> Self {
        Self {
            required: ComponentMask::of(kinds),
            tags: BTreeSet::new(),
        }
    }

    /// Add a required component.
    #[must_use]
    pub fn with(mut self, kind: ComponentKind) -> Self {
        self.required.insert(kind);
        self
    }

    /// Add a required tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// The membership predicate: every required bit present and every
    /// required tag carried.
    #[must_use]
    pub fn accepts(&self, mask: ComponentMask, tags: &BTreeSet<String>) -> bool {
        mask.contains(self.required) && self.tags.is_subset(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|t| (*t).to_string()).collect()
    }

    #[test]
    fn test_empty_descriptor_accepts_everything() {
        let q = QueryDescriptor::new();
        assert!(q.accepts(ComponentMask::EMPTY, &BTreeSet::new()));
    }

    #[test]
    fn test_requires_components() {
        let q = QueryDescriptor::of(&[ComponentKind::Position, ComponentKind::Drive]);
        let partial = ComponentMask::of(&[ComponentKind::Position]);
        let full = partial.with(ComponentKind::Drive).with(ComponentKind::Name);
        assert!(!q.accepts(partial, &BTreeSet::new()));
        assert!(q.accepts(full, &BTreeSet::new()));
    }

    #[test]
    fn test_requires_tags() {
        let q = QueryDescriptor::of(&[ComponentKind::Position]).tag("player");
        let mask = ComponentMask::of(&[ComponentKind::Position]);
        assert!(!q.accepts(mask, &tags(&["discovered"])));
        assert!(q.accepts(mask, &tags(&["player", "discovered"])));
    }
}
