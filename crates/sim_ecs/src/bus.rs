//! The change bus.
//!
//! Every structural mutation of the world is published as a [`ChangeEvent`],
//! synchronously, before the mutating call returns. Indices are updated
//! first, then named observers run in subscription order.
//!
//! Observers receive a shared borrow of the affected entity and no access to
//! the world, so they cannot mutate state from inside a notification. Work
//! that needs the world is queued by the observer and picked up by a system.

use std::fmt;

use serde::{Deserialize, Serialize};
use sim_component::{AnyComponent, ComponentKind, EntityId};

use crate::entity::Entity;

/// The lifecycle stages every tick passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Start,
    Update,
    Cleanup,
    End,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Phase; 4] = [Phase::Start, Phase::Update, Phase::Cleanup, Phase::End];

    pub fn name(self) -> &'static str {
        match self {
            Phase::Start => "start",
            Phase::Update => "update",
            Phase::Cleanup => "cleanup",
            Phase::End => "end",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A structural change.
///
/// For removals the entity is passed in its post-change state (bit cleared,
/// tag gone). A removed component's payload rides along in `removed`.
#[derive(Debug, Clone, Copy)]
pub enum ChangeEvent<'a> {
    EntityAdded {
        entity: &'a Entity,
    },
    ComponentAdded {
        entity: &'a Entity,
        kind: ComponentKind,
    },
    ComponentRemoved {
        entity: &'a Entity,
        kind: ComponentKind,
        removed: &'a AnyComponent,
    },
    TagAdded {
        entity: &'a Entity,
        tag: &'a str,
    },
    TagRemoved {
        entity: &'a Entity,
        tag: &'a str,
    },
    /// Published while the entity is still fully readable; it is dropped
    /// from the world right after.
    EntityRemoved {
        entity: &'a Entity,
        reason: &'a str,
    },
    Relocated {
        entity: &'a Entity,
        from: EntityId,
        to: EntityId,
    },
    /// A scheduler phase is about to run.
    Phase {
        phase: Phase,
        tick_id: u64,
    },
}

impl ChangeEvent<'_> {
    /// The entity this event is about, if any.
    pub fn entity(&self) -> Option<&Entity> {
        match self {
            ChangeEvent::EntityAdded { entity }
            | ChangeEvent::ComponentAdded { entity, .. }
            | ChangeEvent::ComponentRemoved { entity, .. }
            | ChangeEvent::TagAdded { entity, .. }
            | ChangeEvent::TagRemoved { entity, .. }
            | ChangeEvent::EntityRemoved { entity, .. }
            | ChangeEvent::Relocated { entity, .. } => Some(entity),
            ChangeEvent::Phase { .. } => None,
        }
    }
}

/// Stable identity of an observer. Subscribing twice under the same id
/// replaces the first handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub &'static str);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// An observer callback.
pub type Observer = Box<dyn FnMut(&ChangeEvent<'_>)>;

/// Named observers, notified in subscription order.
#[derive(Default)]
pub struct ChangeBus {
    observers: Vec<(SubscriberId, Observer)>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `observer` under `id`. Returns `true` if an earlier handler
    /// with the same id was replaced; it keeps its position in the order.
    pub fn subscribe(&mut self, id: SubscriberId, observer: Observer) -> bool {
        if let Some(slot) = self.observers.iter_mut().find(|(sid, _)| *sid == id) {
            slot.1 = observer;
            return true;
        }
        self.observers.push((id, observer));
        false
    }

    /// Drop the handler registered under `id`.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn publish(&mut self, event: &ChangeEvent<'_>) {
        for (_, observer) in &mut self.observers {
            observer(event);
        }
    }
}

impl fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.observers.iter().map(|(id, _)| id))
            .finish()
    }
}
