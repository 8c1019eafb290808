use sim_component::{ComponentKind, QueryDescriptor};
use sim_ecs::{IndexHandle, Phase, World};
use sim_system::{System, SystemContext, SystemError};

use crate::orders;

/// Drives the order machine of every entity carrying orders.
#[derive(Debug, Default)]
pub struct OrderSystem {
    index: Option<IndexHandle>,
}

impl OrderSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn index(&mut self, world: &mut World) -> IndexHandle {
        *self
            .index
            .get_or_insert_with(|| world.register_index(QueryDescriptor::of(&[ComponentKind::Orders])))
    }
}

impl System for OrderSystem {
    fn name(&self) -> &str {
        "orders"
    }

    fn apply(&mut self, world: &mut World) {
        self.index = None;
        self.index(world);
    }

    fn exec(&mut self, _phase: Phase, ctx: &mut SystemContext<'_>) -> Result<(), SystemError> {
        let index = self.index(ctx.world);
        for id in ctx.world.members(index) {
            // Earlier steps this tick may have removed it.
            if !ctx.world.has(id, ComponentKind::Orders) {
                continue;
            }
            orders::step(ctx.world, ctx.resources, id)?;
        }
        Ok(())
    }
}
