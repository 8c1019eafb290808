//! The entity record held by the world.

use std::collections::{BTreeMap, BTreeSet};

use sim_component::data::{Position, PositionMut};
use sim_component::{AnyComponent, Component, ComponentKind, ComponentMask, ComponentMut, EntityId};

use crate::cooldown::Cooldowns;

/// One registered entity: its components, tags and timers.
///
/// The capability mask always equals the set of kinds present in
/// `components`. Structural changes (adding or removing components or tags)
/// go through the [`World`](crate::World) so that indices and observers see
/// them. Component contents may be edited through
/// [`get_mut`](Entity::get_mut), except a position's sector, which only the
/// world changes.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    mask: ComponentMask,
    components: BTreeMap<ComponentKind, AnyComponent>,
    tags: BTreeSet<String>,
    cooldowns: Cooldowns,
}

impl Entity {
    pub(crate) fn new(id: EntityId) -> Self {
        Self {
            id,
            mask: ComponentMask::EMPTY,
            components: BTreeMap::new(),
            tags: BTreeSet::new(),
            cooldowns: Cooldowns::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Which component kinds are present.
    #[must_use]
    pub fn mask(&self) -> ComponentMask {
        self.mask
    }

    #[must_use]
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Whether the entity holds a component of `kind`.
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.mask.has(kind)
    }

    /// Typed read access.
    pub fn get<T: Component>(&self) -> Option<&T> {
        if !self.mask.has(T::KIND) {
            return None;
        }
        self.components.get(&T::KIND).and_then(T::from_any)
    }

    /// Typed write access to a component's contents.
    pub fn get_mut<T: ComponentMut>(&mut self) -> Option<&mut T> {
        if !self.mask.has(T::KIND) {
            return None;
        }
        self.components.get_mut(&T::KIND).and_then(T::from_any_mut)
    }

    /// The raw union stored for `kind`.
    pub fn component(&self, kind: ComponentKind) -> Option<&AnyComponent> {
        if !self.mask.has(kind) {
            return None;
        }
        self.components.get(&kind)
    }

    /// Every component, in registry order.
    pub fn components(&self) -> impl Iterator<Item = &AnyComponent> {
        self.components.values()
    }

    /// Shorthand for the sector in this entity's position.
    pub fn sector(&self) -> Option<EntityId> {
        self.get::<Position>().map(Position::sector)
    }

    /// Named timers attached to this entity.
    #[must_use]
    pub fn cooldowns(&self) -> &Cooldowns {
        &self.cooldowns
    }

    pub fn cooldowns_mut(&mut self) -> &mut Cooldowns {
        &mut self.cooldowns
    }

    // -- Structural edits (world only) --

    /// Stores `component` and sets its bit. Hands the component back if the
    /// kind is already present.
    pub(crate) fn insert(&mut self, component: AnyComponent) -> Result<(), AnyComponent> {
        let kind = component.kind();
        if self.mask.has(kind) {
            return Err(component);
        }
        self.components.insert(kind, component);
        self.mask.insert(kind);
        Ok(())
    }

    /// Overwrites an existing component of the same kind. Hands the
    /// component back if the kind is absent.
    pub(crate) fn replace(&mut self, component: AnyComponent) -> Result<(), AnyComponent> {
        let kind = component.kind();
        if !self.mask.has(kind) {
            return Err(component);
        }
        self.components.insert(kind, component);
        Ok(())
    }

    /// Clears the bit for `kind`, leaving the payload in place until
    /// [`take`](Self::take) is called. Returns `false` if the kind was absent.
    pub(crate) fn clear_bit(&mut self, kind: ComponentKind) -> bool {
        let present = self.mask.has(kind);
        self.mask.remove(kind);
        present
    }

    /// Drops the payload for a kind whose bit was already cleared.
    pub(crate) fn take(&mut self, kind: ComponentKind) -> Option<AnyComponent> {
        self.components.remove(&kind)
    }

    /// Payload access that ignores the mask, for removal notifications.
    pub(crate) fn payload(&self, kind: ComponentKind) -> Option<&AnyComponent> {
        self.components.get(&kind)
    }

    pub(crate) fn insert_tag(&mut self, tag: String) -> bool {
        self.tags.insert(tag)
    }

    pub(crate) fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    pub(crate) fn set_cooldowns(&mut self, cooldowns: Cooldowns) {
        self.cooldowns = cooldowns;
    }

    /// Write access to the position, sector excluded.
    pub fn position_mut(&mut self) -> Option<PositionMut<'_>> {
        self.position_slot().map(Position::edit)
    }

    pub(crate) fn position_slot(&mut self) -> Option<&mut Position> {
        if !self.mask.has(ComponentKind::Position) {
            return None;
        }
        self.components
            .get_mut(&ComponentKind::Position)
            .and_then(Position::from_any_mut)
    }
}

#[cfg(test)]
mod tests {
    use sim_component::data::{Name, Position};
    use sim_math::Vec2;

    use super::*;

    #[test]
    fn test_insert_sets_mask() {
        let mut e = Entity::new(EntityId(1));
        e.insert(Name::new("Courier").into()).unwrap();
        assert!(e.has(ComponentKind::Name));
        assert_eq!(e.get::<Name>().unwrap().value, "Courier");
        assert!(e.get::<Position>().is_none());
    }

    #[test]
    fn test_duplicate_insert_is_handed_back() {
        let mut e = Entity::new(EntityId(1));
        e.insert(Name::new("A").into()).unwrap();
        let rejected = e.insert(Name::new("B").into()).unwrap_err();
        assert_eq!(rejected.kind(), ComponentKind::Name);
        assert_eq!(e.get::<Name>().unwrap().value, "A");
    }

    #[test]
    fn test_cleared_bit_hides_payload() {
        let mut e = Entity::new(EntityId(1));
        e.insert(Position::new(Vec2::ZERO, EntityId(9)).into())
            .unwrap();
        assert!(e.clear_bit(ComponentKind::Position));
        assert!(e.get::<Position>().is_none());
        assert!(e.payload(ComponentKind::Position).is_some());
        assert!(e.take(ComponentKind::Position).is_some());
        assert!(!e.clear_bit(ComponentKind::Position));
    }
}
