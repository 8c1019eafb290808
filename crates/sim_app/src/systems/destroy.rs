use sim_component::data::{Dockable, Docks, Hitpoints};
use sim_component::{ComponentKind, EntityId, QueryDescriptor};
use sim_ecs::{IndexHandle, Phase, World};
use sim_system::{System, SystemContext, SystemError};

use crate::orders::actions::undock;
use crate::orders::release_all;

/// Removes entities whose hull reached zero, after every update-phase
/// system had its say this tick.
#[derive(Debug, Default)]
pub struct DestroySystem {
    index: Option<IndexHandle>,
}

impl DestroySystem {
    /// Creates the destroy system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn index(&mut self, world: &mut World) -> IndexHandle {
        *self
            .index
            .get_or_insert_with(|| world.register_index(QueryDescriptor::of(&[ComponentKind::Hitpoints])))
    }
}

impl System for DestroySystem {
    fn name(&self) -> &str {
        "destroy"
    }

    fn phases(&self) -> &[Phase] {
        &[Phase::Cleanup]
    }

    fn apply(&mut self, world: &mut World) {
        self.index = None;
        self.index(world);
    }

    fn exec(&mut self, _phase: Phase, ctx: &mut SystemContext<'_>) -> Result<(), SystemError> {
        let index = self.index(ctx.world);
        let dead: Vec<EntityId> = ctx
            .world
            .members(index)
            .into_iter()
            .filter(|id| ctx.world.component::<Hitpoints>(*id).is_some_and(|h| !h.is_alive()))
            .collect();
        for id in dead {
            destroy(ctx.world, id)?;
            tracing::debug!(tick_id = ctx.tick_id, entity = %id, "destroyed");
        }
        Ok(())
    }
}

fn destroy(world: &mut World, id: EntityId) -> Result<(), SystemError> {
    release_all(world, id);
    undock(world, id);
    let docked = world
        .component::<Docks>(id)
        .map(|d| d.docked.clone())
        .unwrap_or_default();
    for ship in docked {
        if let Some(dockable) = world.component_mut::<Dockable>(ship) {
            dockable.docked_in = None;
        }
    }
    world.disband(id)?;
    world.unregister(id, "destroyed");
    Ok(())
}
