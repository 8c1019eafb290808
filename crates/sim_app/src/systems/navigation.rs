//! Moves entities towards their drive target.

use sim_component::data::{Drive, DriveMode, Position};
use sim_component::{ComponentKind, EntityId, QueryDescriptor};
use sim_ecs::{IndexHandle, Phase, World};
use sim_math::{Vec2, heading, step_towards};
use sim_system::{System, SystemContext, SystemError};

/// Seconds a flyby keeps going straight after passing its target.
const FLYBY_OVERSHOOT: f32 = 1.5;

/// Steers every entity with a drive towards its target and integrates motion.
#[derive(Debug, Default)]
pub struct NavigationSystem {
    index: Option<IndexHandle>,
}

impl NavigationSystem {
    /// Creates a navigation system with no index yet; `apply` or the first
    /// tick registers it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn index(&mut self, world: &mut World) -> IndexHandle {
        *self.index.get_or_insert_with(|| {
            world.register_index(QueryDescriptor::of(&[
                ComponentKind::Drive,
                ComponentKind::Position,
            ]))
        })
    }
}

impl System for NavigationSystem {
    fn name(&self) -> &str {
        "navigation"
    }

    fn apply(&mut self, world: &mut World) {
        self.index = None;
        self.index(world);
    }

    fn exec(&mut self, _phase: Phase, ctx: &mut SystemContext<'_>) -> Result<(), SystemError> {
        let index = self.index(ctx.world);
        let dt = ctx.dt as f32;
        for id in ctx.world.members(index) {
            navigate(ctx.world, id, dt)?;
        }
        Ok(())
    }
}

fn navigate(world: &mut World, id: EntityId, dt: f32) -> Result<(), SystemError> {
    let here = *world.require::<Position>(id)?;
    let Some(target) = world.require::<Drive>(id)?.target else {
        *world.require_position_mut(id)?.moved = false;
        return Ok(());
    };
    let there = world
        .component::<Position>(target)
        .filter(|p| p.sector() == here.sector())
        .map(|p| p.coord);
    let Some(there) = there else {
        // Gone or out of reach; planning picks a new target.
        world.require_mut::<Drive>(id)?.clear_target();
        *world.require_position_mut(id)?.moved = false;
        return Ok(());
    };

    let distance = here.coord.distance(there);
    let drive = world.require_mut::<Drive>(id)?;
    drive.update_state(distance, dt);
    let travel = drive.speed() * dt;

    let (coord, angle) = match drive.mode {
        DriveMode::Goto | DriveMode::Follow => {
            let travel = travel.min((distance - drive.minimal_distance).max(0.0));
            let angle = if travel > 0.0 { heading(here.coord, there) } else { here.angle };
            (step_towards(here.coord, there, travel), angle)
        }
        DriveMode::Flyby if drive.flyby_timer > 0.0 => {
            drive.flyby_timer = (drive.flyby_timer - dt).max(0.0);
            (here.coord + Vec2::from_angle(here.angle) * travel, here.angle)
        }
        DriveMode::Flyby => {
            if distance <= drive.minimal_distance {
                drive.flyby_timer = FLYBY_OVERSHOOT;
                (here.coord + Vec2::from_angle(here.angle) * travel, here.angle)
            } else {
                let angle = heading(here.coord, there);
                (step_towards(here.coord, there, travel), angle)
            }
        }
    };

    let position = world.require_position_mut(id)?;
    *position.moved = coord != *position.coord;
    *position.coord = coord;
    *position.angle = angle;
    Ok(())
}

#[cfg(test)]
mod tests {
    use sim_system::{Resources, SimConfig, SystemQueue};

    use super::*;

    fn run(world: &mut World, system: &mut NavigationSystem, dt: f64) {
        let mut resources = Resources::new(SimConfig::default());
        let mut queue = SystemQueue::new();
        let mut ctx = SystemContext::new(1, dt, 0.0, world, &mut resources, &mut queue);
        system.exec(Phase::Update, &mut ctx).unwrap();
    }

    fn mover(world: &mut World, at: Vec2) -> EntityId {
        world
            .spawn_with(
                [
                    Position::new(at, EntityId(100)).into(),
                    Drive::new(1.0, 10.0, 0.0).into(),
                ],
                Vec::<String>::new(),
            )
            .unwrap()
    }

    fn marker(world: &mut World, at: Vec2, sector: u64) -> EntityId {
        world
            .spawn_with([Position::new(at, EntityId(sector)).into()], Vec::<String>::new())
            .unwrap()
    }

    #[test]
    fn test_goto_stops_at_minimal_distance() {
        let mut world = World::new();
        let mut system = NavigationSystem::new();
        let ship = mover(&mut world, Vec2::ZERO);
        let target = marker(&mut world, Vec2::new(2.0, 0.0), 100);
        world
            .component_mut::<Drive>(ship)
            .unwrap()
            .set_target(target, DriveMode::Goto, 0.5);

        for _ in 0..10 {
            run(&mut world, &mut system, 0.5);
        }
        let position = world.component::<Position>(ship).unwrap();
        assert!((position.coord.x - 1.5).abs() < 1e-5);
        assert!(!position.moved);
    }

    #[test]
    fn test_cruises_on_long_trips() {
        let mut world = World::new();
        let mut system = NavigationSystem::new();
        let ship = mover(&mut world, Vec2::ZERO);
        let target = marker(&mut world, Vec2::new(100.0, 0.0), 100);
        world
            .component_mut::<Drive>(ship)
            .unwrap()
            .set_target(target, DriveMode::Goto, 0.5);

        run(&mut world, &mut system, 1.0);
        run(&mut world, &mut system, 1.0);
        run(&mut world, &mut system, 1.0);
        // One tick warming at maneuver speed, then two at cruise speed.
        let x = world.component::<Position>(ship).unwrap().coord.x;
        assert!((x - 21.0).abs() < 1e-4, "x = {x}");
    }

    #[test]
    fn test_target_in_other_sector_clears_drive() {
        let mut world = World::new();
        let mut system = NavigationSystem::new();
        let ship = mover(&mut world, Vec2::ZERO);
        let target = marker(&mut world, Vec2::new(2.0, 0.0), 200);
        world
            .component_mut::<Drive>(ship)
            .unwrap()
            .set_target(target, DriveMode::Goto, 0.5);

        run(&mut world, &mut system, 0.5);
        assert_eq!(world.component::<Drive>(ship).unwrap().target, None);
        assert_eq!(world.component::<Position>(ship).unwrap().coord, Vec2::ZERO);
    }

    #[test]
    fn test_flyby_overshoots() {
        let mut world = World::new();
        let mut system = NavigationSystem::new();
        let ship = mover(&mut world, Vec2::ZERO);
        let target = marker(&mut world, Vec2::new(1.0, 0.0), 100);
        world
            .component_mut::<Drive>(ship)
            .unwrap()
            .set_target(target, DriveMode::Flyby, 0.5);

        run(&mut world, &mut system, 1.0);
        run(&mut world, &mut system, 1.0);
        let position = world.component::<Position>(ship).unwrap();
        assert!(position.coord.x > 1.0, "passes the target");
        assert!(world.component::<Drive>(ship).unwrap().flyby_timer > 0.0);
    }
}
