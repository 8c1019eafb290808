//! Reactive entity indices.
//!
//! An index is a cached answer to a [`QueryDescriptor`]. It is filled lazily
//! by a full scan the first time it is read, and from then on kept current
//! by the change bus. Sector indices additionally bucket members by the
//! sector in their position and follow relocations.
//!
//! Membership is ordered by entity id, so iteration order never depends on
//! the order in which entities happened to change.

use std::collections::{BTreeMap, BTreeSet};

use sim_component::{ComponentKind, EntityId, QueryDescriptor};

use crate::bus::ChangeEvent;
use crate::entity::Entity;

/// Handle to an index registered with a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexHandle(usize);

#[derive(Debug, Default)]
struct Membership {
    /// Member -> sector it is bucketed under (sector indices only).
    members: BTreeMap<EntityId, Option<EntityId>>,
    buckets: BTreeMap<EntityId, BTreeSet<EntityId>>,
}

impl Membership {
    fn insert(&mut self, id: EntityId, sector: Option<EntityId>) {
        self.members.insert(id, sector);
        if let Some(sector) = sector {
            self.buckets.entry(sector).or_default().insert(id);
        }
    }

    fn remove(&mut self, id: EntityId) {
        if let Some(Some(sector)) = self.members.remove(&id) {
            self.unbucket(sector, id);
        }
    }

    fn unbucket(&mut self, sector: EntityId, id: EntityId) {
        if let Some(bucket) = self.buckets.get_mut(&sector) {
            bucket.remove(&id);
            if bucket.is_empty() {
                self.buckets.remove(&sector);
            }
        }
    }
}

#[derive(Debug)]
struct Index {
    descriptor: QueryDescriptor,
    sectored: bool,
    /// `None` until first read.
    state: Option<Membership>,
}

impl Index {
    fn accepts(&self, entity: &Entity) -> bool {
        self.descriptor.accepts(entity.mask(), entity.tags())
    }

    fn bucket_of(&self, entity: &Entity) -> Option<EntityId> {
        if self.sectored { entity.sector() } else { None }
    }

    fn sync(&mut self, entity: &Entity) {
        let accepted = self.accepts(entity);
        let sector = self.bucket_of(entity);
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let present = state.members.contains_key(&entity.id());
        match (accepted, present) {
            (true, false) => state.insert(entity.id(), sector),
            (false, true) => state.remove(entity.id()),
            _ => {}
        }
    }

    fn relocate(&mut self, entity: &Entity, to: EntityId) {
        if !self.sectored {
            return;
        }
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let Some(slot) = state.members.get_mut(&entity.id()) else {
            return;
        };
        let from = slot.replace(to);
        if let Some(from) = from {
            state.unbucket(from, entity.id());
        }
        state.buckets.entry(to).or_default().insert(entity.id());
    }

    fn collect<'a>(&mut self, entities: impl Iterator<Item = &'a Entity>) {
        let mut state = Membership::default();
        for entity in entities {
            if self.accepts(entity) {
                state.insert(entity.id(), self.bucket_of(entity));
            }
        }
        self.state = Some(state);
    }
}

/// All indices registered with one world.
#[derive(Debug, Default)]
pub struct IndexRegistry {
    indices: Vec<Index>,
}

impl IndexRegistry {
    /// Register an index, or return the handle of an identical one.
    ///
    /// Sector indices always require a position.
    pub(crate) fn register(&mut self, mut descriptor: QueryDescriptor, sectored: bool) -> IndexHandle {
        if sectored {
            descriptor.required.insert(ComponentKind::Position);
        }
        if let Some(i) = self
            .indices
            .iter()
            .position(|idx| idx.sectored == sectored && idx.descriptor == descriptor)
        {
            return IndexHandle(i);
        }
        self.indices.push(Index {
            descriptor,
            sectored,
            state: None,
        });
        IndexHandle(self.indices.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub(crate) fn descriptor(&self, handle: IndexHandle) -> Option<&QueryDescriptor> {
        self.indices.get(handle.0).map(|idx| &idx.descriptor)
    }

    pub(crate) fn is_sectored(&self, handle: IndexHandle) -> bool {
        self.indices.get(handle.0).is_some_and(|idx| idx.sectored)
    }

    /// Collect `handle` if it has never been read.
    pub(crate) fn ensure<'a>(
        &mut self,
        handle: IndexHandle,
        entities: impl Iterator<Item = &'a Entity>,
    ) {
        if let Some(idx) = self.indices.get_mut(handle.0) {
            if idx.state.is_none() {
                idx.collect(entities);
            }
        }
    }

    /// Members of a collected index, by id. Empty for an uncollected or
    /// unknown handle.
    pub(crate) fn members(&self, handle: IndexHandle) -> Vec<EntityId> {
        self.indices
            .get(handle.0)
            .and_then(|idx| idx.state.as_ref())
            .map(|state| state.members.keys().copied().collect())
            .unwrap_or_default()
    }

    pub(crate) fn members_in_sector(&self, handle: IndexHandle, sector: EntityId) -> Vec<EntityId> {
        self.indices
            .get(handle.0)
            .and_then(|idx| idx.state.as_ref())
            .and_then(|state| state.buckets.get(&sector))
            .map(|bucket| bucket.iter().copied().collect())
            .unwrap_or_default()
    }

    pub(crate) fn contains(&self, handle: IndexHandle, id: EntityId) -> bool {
        self.indices
            .get(handle.0)
            .and_then(|idx| idx.state.as_ref())
            .is_some_and(|state| state.members.contains_key(&id))
    }

    /// Reconcile every collected index with a change.
    pub(crate) fn notify(&mut self, event: &ChangeEvent<'_>) {
        match event {
            ChangeEvent::EntityAdded { entity }
            | ChangeEvent::ComponentAdded { entity, .. }
            | ChangeEvent::ComponentRemoved { entity, .. }
            | ChangeEvent::TagAdded { entity, .. }
            | ChangeEvent::TagRemoved { entity, .. } => {
                for idx in &mut self.indices {
                    idx.sync(entity);
                }
            }
            ChangeEvent::EntityRemoved { entity, .. } => {
                for idx in &mut self.indices {
                    if let Some(state) = idx.state.as_mut() {
                        state.remove(entity.id());
                    }
                }
            }
            ChangeEvent::Relocated { entity, to, .. } => {
                for idx in &mut self.indices {
                    idx.relocate(entity, *to);
                }
            }
            ChangeEvent::Phase { .. } => {}
        }
    }
}
