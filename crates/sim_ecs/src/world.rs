//! The entity store.
//!
//! [`World`] owns every entity and is the only place structural changes
//! happen. Each change is published on the change bus before the mutating
//! call returns, so indices and observers never see a stale world.

use std::collections::BTreeMap;

use sim_component::data::{Position, PositionMut};
use sim_component::{
    AnyComponent, Component, ComponentKind, ComponentMut, EntityAllocator, EntityId, QueryDescriptor,
};
use sim_math::Vec2;

use crate::bus::{ChangeBus, ChangeEvent, Observer, Phase, SubscriberId};
use crate::entity::Entity;
use crate::error::{EcsError, Result};
use crate::index::{IndexHandle, IndexRegistry};
use crate::snapshot::{EntitySnapshot, WorldSnapshot};

/// Publishes to indices first, then observers.
fn emit(indices: &mut IndexRegistry, bus: &mut ChangeBus, event: &ChangeEvent<'_>) {
    indices.notify(event);
    bus.publish(event);
}

/// Entity storage with change notification.
#[derive(Debug, Default)]
pub struct World {
    allocator: EntityAllocator,
    entities: BTreeMap<EntityId, Entity>,
    indices: IndexRegistry,
    bus: ChangeBus,
}

impl World {
    /// An empty world with no indices or observers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Entity lifecycle --

    /// Allocate and register an empty entity.
    pub fn spawn(&mut self) -> EntityId {
        let id = self.allocator.allocate();
        let entity = self.entities.entry(id).or_insert_with(|| Entity::new(id));
        emit(
            &mut self.indices,
            &mut self.bus,
            &ChangeEvent::EntityAdded { entity: &*entity },
        );
        id
    }

    /// Spawn an entity and attach `components` and `tags`.
    ///
    /// Listing the same kind twice is an error; the entity stays registered
    /// with whatever was attached before the duplicate.
    pub fn spawn_with<I, T>(&mut self, components: I, tags: T) -> Result<EntityId>
    where
        I: IntoIterator<Item = AnyComponent>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        let id = self.spawn();
        for component in components {
            self.add_component(id, component)?;
        }
        for tag in tags {
            self.add_tag(id, tag)?;
        }
        Ok(id)
    }

    /// Remove an entity. Idempotent: returns `false` if it was already gone.
    pub fn unregister(&mut self, id: EntityId, reason: &str) -> bool {
        let Some(entity) = self.entities.get(&id) else {
            tracing::debug!(entity = %id, reason, "unregister of absent entity ignored");
            return false;
        };
        emit(
            &mut self.indices,
            &mut self.bus,
            &ChangeEvent::EntityRemoved { entity, reason },
        );
        self.entities.remove(&id);
        tracing::debug!(entity = %id, reason, "entity unregistered");
        true
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Mutable access to every entity, in id order. Structural changes are
    /// still only possible through the world.
    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    /// Registered ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutable entity access. Positions stay behind [`Entity::position_mut`].
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Like [`get`](Self::get) but treats absence as an error.
    pub fn entity(&self, id: EntityId) -> Result<&Entity> {
        self.entities.get(&id).ok_or(EcsError::MissingEntity(id))
    }

    /// Like [`get_mut`](Self::get_mut) but treats absence as an error.
    pub fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        self.entities.get_mut(&id).ok_or(EcsError::MissingEntity(id))
    }

    // -- Component operations --

    /// Typed read access. `None` if the entity or component is absent.
    pub fn component<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.entities.get(&id).and_then(Entity::get::<T>)
    }

    /// Typed write access. Not available for [`Position`]; see
    /// [`position_mut`](Self::position_mut).
    pub fn component_mut<T: ComponentMut>(&mut self, id: EntityId) -> Option<&mut T> {
        self.entities.get_mut(&id).and_then(Entity::get_mut::<T>)
    }

    /// Typed read access for components the caller knows must be there.
    pub fn require<T: Component>(&self, id: EntityId) -> Result<&T> {
        self.entity(id)?.get::<T>().ok_or(EcsError::MissingComponent {
            entity: id,
            kind: T::KIND,
        })
    }

    /// Typed write access for components the caller knows must be there.
    pub fn require_mut<T: ComponentMut>(&mut self, id: EntityId) -> Result<&mut T> {
        self.entity_mut(id)?
            .get_mut::<T>()
            .ok_or(EcsError::MissingComponent {
                entity: id,
                kind: T::KIND,
            })
    }

    /// Write access to a position's coordinates and heading. Use
    /// [`relocate`](Self::relocate) to change its sector.
    pub fn position_mut(&mut self, id: EntityId) -> Option<PositionMut<'_>> {
        self.entities.get_mut(&id).and_then(Entity::position_mut)
    }

    /// Like [`position_mut`](Self::position_mut) for a position that must
    /// be there.
    pub fn require_position_mut(&mut self, id: EntityId) -> Result<PositionMut<'_>> {
        self.position_mut(id).ok_or(EcsError::MissingComponent {
            entity: id,
            kind: ComponentKind::Position,
        })
    }

    #[must_use]
    pub fn has(&self, id: EntityId, kind: ComponentKind) -> bool {
        self.entities.get(&id).is_some_and(|e| e.has(kind))
    }

    /// Attach a component. Fails without any change if the kind is present.
    pub fn add_component(&mut self, id: EntityId, component: impl Into<AnyComponent>) -> Result<()> {
        let component = component.into();
        let kind = component.kind();
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(EcsError::MissingEntity(id))?;
        entity
            .insert(component)
            .map_err(|_| EcsError::DuplicateComponent { entity: id, kind })?;
        emit(
            &mut self.indices,
            &mut self.bus,
            &ChangeEvent::ComponentAdded {
                entity: &*entity,
                kind,
            },
        );
        Ok(())
    }

    /// Attach a component, overwriting one of the same kind in place.
    ///
    /// A fresh attachment is published as an addition. Overwriting a
    /// position with one in another sector is published as a relocation.
    pub fn set_component(&mut self, id: EntityId, component: impl Into<AnyComponent>) -> Result<()> {
        let component = component.into();
        let to = Position::from_any(&component).map(Position::sector);
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(EcsError::MissingEntity(id))?;
        let from = entity.sector();
        if let Err(component) = entity.replace(component) {
            return self.add_component(id, component);
        }
        match (from, to) {
            (Some(from), Some(to)) if from != to => {
                emit(
                    &mut self.indices,
                    &mut self.bus,
                    &ChangeEvent::Relocated {
                        entity: &*entity,
                        from,
                        to,
                    },
                );
                tracing::debug!(entity = %id, from = %from, to = %to, "relocated by overwrite");
            }
            _ => {}
        }
        Ok(())
    }

    /// Detach a component and hand it back.
    ///
    /// The capability bit is cleared and the removal published while the
    /// payload is still readable; the payload is dropped afterwards.
    pub fn remove_component(&mut self, id: EntityId, kind: ComponentKind) -> Result<AnyComponent> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(EcsError::MissingEntity(id))?;
        if !entity.clear_bit(kind) {
            return Err(EcsError::MissingComponent { entity: id, kind });
        }
        if let Some(removed) = entity.payload(kind) {
            emit(
                &mut self.indices,
                &mut self.bus,
                &ChangeEvent::ComponentRemoved {
                    entity: &*entity,
                    kind,
                    removed,
                },
            );
        }
        entity
            .take(kind)
            .ok_or(EcsError::MissingComponent { entity: id, kind })
    }

    /// Typed [`remove_component`](Self::remove_component).
    pub fn remove<T: Component>(&mut self, id: EntityId) -> Result<T> {
        let any = self.remove_component(id, T::KIND)?;
        T::from_any(&any).cloned().ok_or(EcsError::MissingComponent {
            entity: id,
            kind: T::KIND,
        })
    }

    // -- Tags --

    /// Returns `false` (and publishes nothing) if the tag was already set.
    pub fn add_tag(&mut self, id: EntityId, tag: impl Into<String>) -> Result<bool> {
        let tag = tag.into();
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(EcsError::MissingEntity(id))?;
        if !entity.insert_tag(tag.clone()) {
            return Ok(false);
        }
        emit(
            &mut self.indices,
            &mut self.bus,
            &ChangeEvent::TagAdded {
                entity: &*entity,
                tag: &tag,
            },
        );
        Ok(true)
    }

    /// Remove a tag. Returns `false` if the entity did not carry it.
    pub fn remove_tag(&mut self, id: EntityId, tag: &str) -> Result<bool> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(EcsError::MissingEntity(id))?;
        if !entity.remove_tag(tag) {
            return Ok(false);
        }
        emit(
            &mut self.indices,
            &mut self.bus,
            &ChangeEvent::TagRemoved {
                entity: &*entity,
                tag,
            },
        );
        Ok(true)
    }

    // -- Spatial --

    /// Move an entity to `coord` in `sector`, telling sector indices about
    /// the crossing. Returns the sector it left.
    pub fn relocate(&mut self, id: EntityId, sector: EntityId, coord: Vec2) -> Result<EntityId> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(EcsError::MissingEntity(id))?;
        let position = entity.position_slot().ok_or(EcsError::MissingComponent {
            entity: id,
            kind: ComponentKind::Position,
        })?;
        let from = position.sector();
        *position = position.in_sector(sector, coord);
        emit(
            &mut self.indices,
            &mut self.bus,
            &ChangeEvent::Relocated {
                entity: &*entity,
                from,
                to: sector,
            },
        );
        tracing::debug!(entity = %id, from = %from, to = %sector, "relocated");
        Ok(from)
    }

    /// Distance between two entities, `None` if either lacks a position or
    /// they are in different sectors.
    pub fn distance(&self, a: EntityId, b: EntityId) -> Option<f32> {
        let pa = self.component::<Position>(a)?;
        let pb = self.component::<Position>(b)?;
        pa.distance_to(pb)
    }

    // -- Queries --

    /// One-off scan, in id order.
    pub fn query<'a>(&'a self, descriptor: &'a QueryDescriptor) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities
            .values()
            .filter(move |e| descriptor.accepts(e.mask(), e.tags()))
    }

    /// Ids matched by a full scan, in id order.
    #[must_use]
    pub fn query_ids(&self, descriptor: &QueryDescriptor) -> Vec<EntityId> {
        self.query(descriptor).map(Entity::id).collect()
    }

    /// Register a cached index. Identical descriptors share one index.
    pub fn register_index(&mut self, descriptor: QueryDescriptor) -> IndexHandle {
        self.indices.register(descriptor, false)
    }

    /// Register a cached index that also buckets members by sector.
    pub fn register_sector_index(&mut self, descriptor: QueryDescriptor) -> IndexHandle {
        self.indices.register(descriptor, true)
    }

    #[must_use]
    pub fn index_descriptor(&self, handle: IndexHandle) -> Option<&QueryDescriptor> {
        self.indices.descriptor(handle)
    }

    /// Members of an index, in id order. Collects the index on first use.
    pub fn members(&mut self, handle: IndexHandle) -> Vec<EntityId> {
        self.indices.ensure(handle, self.entities.values());
        self.indices.members(handle)
    }

    /// Members of an index positioned in `sector`.
    pub fn members_in_sector(&mut self, handle: IndexHandle, sector: EntityId) -> Vec<EntityId> {
        self.indices.ensure(handle, self.entities.values());
        if self.indices.is_sectored(handle) {
            return self.indices.members_in_sector(handle, sector);
        }
        self.indices
            .members(handle)
            .into_iter()
            .filter(|id| self.entities.get(id).and_then(Entity::sector) == Some(sector))
            .collect()
    }

    /// Whether `id` is currently a member of the index.
    pub fn index_contains(&mut self, handle: IndexHandle, id: EntityId) -> bool {
        self.indices.ensure(handle, self.entities.values());
        self.indices.contains(handle, id)
    }

    // -- Observers --

    /// Register a named observer; returns `true` if one was replaced.
    pub fn subscribe(&mut self, id: SubscriberId, observer: Observer) -> bool {
        self.bus.subscribe(id, observer)
    }

    /// Drop an observer; returns `false` if none was registered under `id`.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Announce a scheduler phase to observers.
    pub fn publish_phase(&mut self, phase: Phase, tick_id: u64) {
        self.bus.publish(&ChangeEvent::Phase { phase, tick_id });
    }

    // -- Persistence --

    /// Capture every entity, tag and timer along with the id allocator.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            allocator: self.allocator.clone(),
            entities: self
                .entities
                .values()
                .map(|e| EntitySnapshot {
                    id: e.id(),
                    components: e.components().cloned().collect(),
                    tags: e.tags().clone(),
                    cooldowns: e.cooldowns().clone(),
                })
                .collect(),
        }
    }

    /// Rebuild a world from a snapshot. No events are published; indices
    /// registered afterwards collect from the restored state.
    pub fn restore(snapshot: WorldSnapshot) -> Result<Self> {
        let mut world = World::new();
        let mut next = snapshot.allocator.peek();
        for saved in snapshot.entities {
            if world.entities.contains_key(&saved.id) {
                return Err(EcsError::DuplicateEntity(saved.id));
            }
            let mut entity = Entity::new(saved.id);
            for component in saved.components {
                let kind = component.kind();
                entity
                    .insert(component)
                    .map_err(|_| EcsError::DuplicateComponent {
                        entity: saved.id,
                        kind,
                    })?;
            }
            for tag in saved.tags {
                entity.insert_tag(tag);
            }
            entity.set_cooldowns(saved.cooldowns);
            next = next.max(saved.id.id() + 1);
            world.entities.insert(saved.id, entity);
        }
        world.allocator = EntityAllocator::resume_at(next);
        Ok(world)
    }
}
