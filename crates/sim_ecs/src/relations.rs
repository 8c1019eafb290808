//! The command chain.
//!
//! `Commander` on a subordinate and `Subordinates` on its commander are two
//! halves of one relation. These operations keep both halves in step and
//! refuse any assignment that would make an entity its own superior.

use sim_component::data::{Commander, Subordinates};
use sim_component::{ComponentKind, EntityId};

use crate::error::{EcsError, Result};
use crate::world::World;

impl World {
    /// The commander of `id`, if it has one.
    pub fn commander_of(&self, id: EntityId) -> Option<EntityId> {
        self.component::<Commander>(id).map(|c| c.id)
    }

    /// `id` followed by each superior up to the top of the chain.
    ///
    /// Stops early if the chain points at an entity that no longer exists.
    pub fn chain_of_command(&self, id: EntityId) -> Vec<EntityId> {
        let mut chain = vec![id];
        let mut cursor = self.commander_of(id);
        while let Some(next) = cursor {
            if chain.contains(&next) || !self.contains(next) {
                break;
            }
            chain.push(next);
            cursor = self.commander_of(next);
        }
        chain
    }

    /// Put `subordinate` under `commander`, leaving any previous commander.
    ///
    /// The chain is checked before anything changes: on error the world is
    /// untouched.
    pub fn assign_commander(&mut self, commander: EntityId, subordinate: EntityId) -> Result<()> {
        self.entity(commander)?;
        self.entity(subordinate)?;
        if self.chain_of_command(commander).contains(&subordinate) {
            return Err(EcsError::CyclicCommandChain {
                commander,
                subordinate,
            });
        }

        self.release_subordinate(subordinate)?;
        self.add_component(subordinate, Commander { id: commander })?;
        match self.component_mut::<Subordinates>(commander) {
            Some(list) => list.ids.push(subordinate),
            None => self.add_component(
                commander,
                Subordinates {
                    ids: vec![subordinate],
                },
            )?,
        }
        tracing::debug!(commander = %commander, subordinate = %subordinate, "command assigned");
        Ok(())
    }

    /// Detach `subordinate` from its commander. Returns the former commander.
    pub fn release_subordinate(&mut self, subordinate: EntityId) -> Result<Option<EntityId>> {
        let Some(commander) = self.commander_of(subordinate) else {
            return Ok(None);
        };
        self.remove_component(subordinate, ComponentKind::Commander)?;
        self.drop_from_list(commander, subordinate)?;
        Ok(Some(commander))
    }

    /// Dissolve everything around `id`: it leaves its own commander and every
    /// subordinate becomes independent.
    pub fn disband(&mut self, id: EntityId) -> Result<()> {
        self.release_subordinate(id)?;
        let subordinates = match self.component::<Subordinates>(id) {
            Some(list) => list.ids.clone(),
            None => return Ok(()),
        };
        for sub in subordinates {
            if self.commander_of(sub) == Some(id) {
                self.remove_component(sub, ComponentKind::Commander)?;
            }
        }
        self.remove_component(id, ComponentKind::Subordinates)?;
        Ok(())
    }

    fn drop_from_list(&mut self, commander: EntityId, subordinate: EntityId) -> Result<()> {
        let now_empty = match self.component_mut::<Subordinates>(commander) {
            Some(list) => {
                list.ids.retain(|id| *id != subordinate);
                list.ids.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.remove_component(commander, ComponentKind::Subordinates)?;
        }
        Ok(())
    }
}
