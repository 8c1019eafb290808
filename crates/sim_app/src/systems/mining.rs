//! Moves mined resources from fields into holds.
//!
//! Yield accrues fractionally in the miner's buffer; only whole units leave
//! the field, limited by what the field has left and what the hold fits.
//! The buffer never holds more than one transfer's worth, and a field with
//! less than a unit left is treated as empty.

use sim_component::data::{Minable, Mining, Storage};
use sim_component::{ComponentKind, EntityId, QueryDescriptor};
use sim_ecs::{IndexHandle, Phase, World};
use sim_system::{System, SystemContext, SystemError};

/// Transfers whole units from the field each miner is locked on.
#[derive(Debug, Default)]
pub struct MiningSystem {
    index: Option<IndexHandle>,
}

impl MiningSystem {
    /// Creates the mining system. Its index is registered on first use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn index(&mut self, world: &mut World) -> IndexHandle {
        *self.index.get_or_insert_with(|| {
            world.register_index(QueryDescriptor::of(&[
                ComponentKind::Mining,
                ComponentKind::Storage,
                ComponentKind::Position,
            ]))
        })
    }
}

impl System for MiningSystem {
    fn name(&self) -> &str {
        "mining"
    }

    fn apply(&mut self, world: &mut World) {
        self.index = None;
        self.index(world);
    }

    fn exec(&mut self, _phase: Phase, ctx: &mut SystemContext<'_>) -> Result<(), SystemError> {
        let index = self.index(ctx.world);
        let dt = ctx.dt as f32;
        for id in ctx.world.members(index) {
            mine(ctx.world, id, dt)?;
        }
        Ok(())
    }
}

fn mine(world: &mut World, id: EntityId, dt: f32) -> Result<(), SystemError> {
    let mining = world.require::<Mining>(id)?;
    let Some(field) = mining.entity_id else {
        return Ok(());
    };
    let (efficiency, range) = (mining.efficiency, mining.range);

    let in_range = world.distance(id, field).is_some_and(|d| d <= range);
    let Some(minable) = world
        .component::<Minable>(field)
        .copied()
        .filter(|m| in_range && !m.is_exhausted())
    else {
        world.require_mut::<Mining>(id)?.entity_id = None;
        return Ok(());
    };

    let space = world.require::<Storage>(id)?.available();
    let limit = minable.resources.floor().min(space.floor()).max(1.0);
    let mining = world.require_mut::<Mining>(id)?;
    mining.buffer = (mining.buffer + efficiency * dt).min(limit);
    let whole = mining.buffer.floor().min(minable.resources.floor()).min(space.floor());
    if whole < 1.0 {
        return Ok(());
    }
    mining.buffer -= whole;

    world.require_mut::<Minable>(field)?.resources -= whole;
    world.require_mut::<Storage>(id)?.add(minable.commodity, whole);
    tracing::trace!(entity = %id, field = %field, amount = whole, "mined");
    Ok(())
}

#[cfg(test)]
mod tests {
    use sim_component::data::{Commodity, Position};
    use sim_math::Vec2;
    use sim_system::{Resources, SimConfig, SystemQueue};

    use super::*;

    fn run(world: &mut World, system: &mut MiningSystem, dt: f64) {
        let mut resources = Resources::new(SimConfig::default());
        let mut queue = SystemQueue::new();
        let mut ctx = SystemContext::new(1, dt, 0.0, world, &mut resources, &mut queue);
        system.exec(Phase::Update, &mut ctx).unwrap();
    }

    fn setup(field_resources: f32, hold: f32) -> (World, EntityId, EntityId) {
        let mut world = World::new();
        let sector = EntityId(100);
        let field = world
            .spawn_with(
                [
                    Position::new(Vec2::ZERO, sector).into(),
                    Minable {
                        commodity: Commodity::Ore,
                        resources: field_resources,
                    }
                    .into(),
                ],
                Vec::<String>::new(),
            )
            .unwrap();
        let mut mining = Mining::new(1.0, 2.0);
        mining.entity_id = Some(field);
        let miner = world
            .spawn_with(
                [
                    Position::new(Vec2::new(1.0, 0.0), sector).into(),
                    mining.into(),
                    Storage::new(hold).into(),
                ],
                Vec::<String>::new(),
            )
            .unwrap();
        (world, miner, field)
    }

    #[test]
    fn test_buffers_fractional_yield() {
        let (mut world, miner, field) = setup(100.0, 50.0);
        let mut system = MiningSystem::new();

        run(&mut world, &mut system, 0.5);
        assert_eq!(world.component::<Storage>(miner).unwrap().get(Commodity::Ore), 0.0);
        run(&mut world, &mut system, 0.75);
        assert_eq!(world.component::<Storage>(miner).unwrap().get(Commodity::Ore), 1.0);
        assert!((world.component::<Mining>(miner).unwrap().buffer - 0.25).abs() < 1e-6);
        assert_eq!(world.component::<Minable>(field).unwrap().resources, 99.0);
    }

    #[test]
    fn test_limited_by_field_and_hold() {
        let (mut world, miner, field) = setup(3.0, 2.0);
        let mut system = MiningSystem::new();
        run(&mut world, &mut system, 10.0);
        assert_eq!(world.component::<Storage>(miner).unwrap().get(Commodity::Ore), 2.0);
        assert_eq!(world.component::<Minable>(field).unwrap().resources, 1.0);
    }

    #[test]
    fn test_out_of_range_stops_mining() {
        let (mut world, miner, _) = setup(100.0, 50.0);
        world.component_mut::<Mining>(miner).unwrap().range = 0.5;
        let mut system = MiningSystem::new();
        run(&mut world, &mut system, 1.0);
        assert_eq!(world.component::<Mining>(miner).unwrap().entity_id, None);
    }

    #[test]
    fn test_fractional_remainder_ends_mining() {
        let (mut world, miner, field) = setup(0.6, 50.0);
        let mut system = MiningSystem::new();
        for _ in 0..20 {
            run(&mut world, &mut system, 1.0);
        }
        let mining = world.component::<Mining>(miner).unwrap();
        assert_eq!(mining.entity_id, None);
        assert!(mining.buffer <= 1.0);
        assert_eq!(world.component::<Minable>(field).unwrap().resources, 0.6);
    }

    #[test]
    fn test_buffer_is_capped_while_hold_is_full() {
        let (mut world, miner, _) = setup(100.0, 2.0);
        let mut system = MiningSystem::new();
        for _ in 0..50 {
            run(&mut world, &mut system, 1.0);
        }
        assert_eq!(world.component::<Storage>(miner).unwrap().get(Commodity::Ore), 2.0);
        assert!(world.component::<Mining>(miner).unwrap().buffer <= 1.0);
    }
}
