//! Turning an order into a list of actions.
//!
//! Planning reads the world and the path table and never touches the
//! order stack itself; the caller installs the result. The one side effect
//! is spawning a waypoint for patrol-style orders.

use std::collections::VecDeque;

use rand::Rng;
use sim_component::data::{
    Action, Deployable, Docks, Minable, Mining, OrderKind, Position, Sector, Storage, Weapon,
};
use sim_component::{ComponentKind, EntityId, QueryDescriptor};
use sim_ecs::{Entity, World};
use sim_math::Vec2;
use sim_system::{PathTable, Resources, SystemError};

use crate::factory;

/// Outcome of planning one order.
#[derive(Debug, Clone, PartialEq)]
pub enum Planned {
    /// Run these actions. `sector` is where the order's target was.
    Plan {
        actions: VecDeque<Action>,
        sector: Option<EntityId>,
    },
    /// The order cannot be carried out and is finished.
    GiveUp(&'static str),
}

impl Planned {
    fn local(actions: impl IntoIterator<Item = Action>, sector: Option<EntityId>) -> Self {
        Planned::Plan {
            actions: actions.into_iter().collect(),
            sector,
        }
    }
}

/// The sector an entity is positioned in.
pub fn sector_of(world: &World, id: EntityId) -> Option<EntityId> {
    world.get(id).and_then(Entity::sector)
}

/// Teleport actions taking a ship from `from` to `to`.
///
/// Same-sector travel needs no table. `None` means no route is known.
pub fn route(paths: &PathTable, from: EntityId, to: EntityId) -> Option<VecDeque<Action>> {
    if from == to {
        return Some(VecDeque::new());
    }
    let sectors = paths.route(from, to)?;
    sectors
        .windows(2)
        .map(|hop| {
            paths
                .gate(hop[0], hop[1])
                .map(|gate| Action::Teleport { target_id: gate })
        })
        .collect()
}

/// Route to wherever `target` is, then `tail`.
fn to_target(
    world: &World,
    paths: &PathTable,
    here: EntityId,
    target: EntityId,
    tail: impl IntoIterator<Item = Action>,
) -> Planned {
    let Some(there) = sector_of(world, target) else {
        return Planned::GiveUp("target gone");
    };
    let Some(mut actions) = route(paths, here, there) else {
        return Planned::GiveUp("target unreachable");
    };
    actions.extend(tail);
    Planned::Plan {
        actions,
        sector: Some(there),
    }
}

/// Plan `kind` for entity `id`.
pub fn plan(
    world: &mut World,
    resources: &mut Resources,
    id: EntityId,
    kind: &OrderKind,
) -> Result<Planned, SystemError> {
    let Some(here) = sector_of(world, id) else {
        return Ok(Planned::GiveUp("no position"));
    };
    let paths = &resources.paths;

    let planned = match kind {
        OrderKind::Move { target_id } => to_target(
            world,
            paths,
            here,
            *target_id,
            [Action::Move {
                target_id: *target_id,
                ignore_reached: false,
            }],
        ),
        OrderKind::Dock { target_id } | OrderKind::Trade { target_id, .. } => {
            if world.component::<Docks>(*target_id).is_none() {
                return Ok(Planned::GiveUp("target has no docks"));
            }
            to_target(
                world,
                paths,
                here,
                *target_id,
                [
                    Action::Move {
                        target_id: *target_id,
                        ignore_reached: false,
                    },
                    Action::Dock {
                        target_id: *target_id,
                    },
                ],
            )
        }
        OrderKind::Collect { target_id } => {
            if world.component::<Storage>(id).is_none() {
                return Ok(Planned::GiveUp("no storage"));
            }
            to_target(
                world,
                paths,
                here,
                *target_id,
                [Action::Collect {
                    target_id: *target_id,
                }],
            )
        }
        OrderKind::Attack { target_id, .. } => {
            if world.component::<Weapon>(id).is_none() {
                return Ok(Planned::GiveUp("unarmed"));
            }
            to_target(
                world,
                paths,
                here,
                *target_id,
                [Action::Attack {
                    target_id: *target_id,
                }],
            )
        }
        OrderKind::Escort { target_id } | OrderKind::Follow { target_id } => to_target(
            world,
            paths,
            here,
            *target_id,
            [Action::Move {
                target_id: *target_id,
                ignore_reached: true,
            }],
        ),
        OrderKind::Mine {
            field_id,
            commodity,
        } => {
            let equipped = world.component::<Mining>(id).is_some();
            match world.component::<Storage>(id) {
                None => return Ok(Planned::GiveUp("no storage")),
                Some(_) if !equipped => return Ok(Planned::GiveUp("no mining equipment")),
                Some(storage) if storage.is_full() => return Ok(Planned::GiveUp("hold full")),
                Some(_) => {}
            }
            let field = match field_id {
                Some(field) => Some(*field),
                None => nearest_field(world, paths, id, here, *commodity),
            };
            let Some(field) = field else {
                return Ok(Planned::GiveUp("no field"));
            };
            match world.component::<Minable>(field) {
                Some(minable) if minable.commodity == *commodity => {}
                _ => return Ok(Planned::GiveUp("not a matching field")),
            }
            to_target(world, paths, here, field, [Action::Mine { target_id: field }])
        }
        OrderKind::Patrol { sector_id } | OrderKind::Pillage { sector_id } => {
            if world.component::<Sector>(*sector_id).is_none() {
                return Ok(Planned::GiveUp("not a sector"));
            }
            let Some(mut actions) = route(paths, here, *sector_id) else {
                return Ok(Planned::GiveUp("sector unreachable"));
            };
            let radius = resources.config.patrol_radius;
            let angle = resources.rng.gen_range(0.0..std::f32::consts::TAU);
            let distance = resources.rng.gen_range(0.0..=radius);
            let coord = Vec2::from_angle(angle) * distance;
            let waypoint = factory::waypoint(world, *sector_id, coord, Some(id))?;
            actions.push_back(Action::Move {
                target_id: waypoint,
                ignore_reached: false,
            });
            Planned::Plan {
                actions,
                sector: Some(*sector_id),
            }
        }
        OrderKind::Hold => Planned::Plan {
            actions: VecDeque::new(),
            sector: Some(here),
        },
        OrderKind::Deploy => {
            if world.component::<Deployable>(id).is_none() {
                return Ok(Planned::GiveUp("not deployable"));
            }
            Planned::local([Action::DeployFacility], Some(here))
        }
    };
    Ok(planned)
}

/// The closest field yielding `commodity`: fewest jumps first, then
/// distance within the ship's own sector, then lowest id.
fn nearest_field(
    world: &World,
    paths: &PathTable,
    id: EntityId,
    here: EntityId,
    commodity: sim_component::data::Commodity,
) -> Option<EntityId> {
    let origin = world.component::<Position>(id)?.coord;
    let query = QueryDescriptor::of(&[ComponentKind::Minable, ComponentKind::Position]);
    world
        .query(&query)
        .filter_map(|field| {
            let minable = field.get::<Minable>()?;
            if minable.commodity != commodity || minable.is_exhausted() {
                return None;
            }
            let position = field.get::<Position>()?;
            let jumps = if position.sector() == here {
                0
            } else {
                paths.distance(here, position.sector())?
            };
            let local = if jumps == 0 {
                origin.distance(position.coord)
            } else {
                0.0
            };
            Some((jumps, local, field.id()))
        })
        .min_by(|a, b| {
            a.0.cmp(&b.0)
                .then(a.1.total_cmp(&b.1))
                .then(a.2.cmp(&b.2))
        })
        .map(|(_, _, field)| field)
}

#[cfg(test)]
mod tests {
    use sim_component::data::{Commodity, Drive};
    use sim_math::HexCoord;
    use sim_system::SimConfig;

    use super::*;

    fn setup() -> (World, Resources, EntityId, EntityId) {
        let mut world = World::new();
        let a = factory::sector(&mut world, "Alpha", HexCoord::ORIGIN).unwrap();
        let b = factory::sector(&mut world, "Beta", HexCoord::new(1, 0)).unwrap();
        factory::link_sectors(&mut world, a, b).unwrap();
        let mut resources = Resources::new(SimConfig::default());
        resources.paths = PathTable::from_world(&world);
        (world, resources, a, b)
    }

    fn scout(world: &mut World, sector: EntityId) -> EntityId {
        world
            .spawn_with(
                [
                    Position::new(Vec2::ZERO, sector).into(),
                    Drive::new(1.0, 4.0, 1.0).into(),
                ],
                Vec::<String>::new(),
            )
            .unwrap()
    }

    #[test]
    fn test_move_across_sectors_routes_through_gate() {
        let (mut world, mut resources, a, b) = setup();
        let ship = scout(&mut world, a);
        let target = scout(&mut world, b);
        let gate = resources.paths.gate(a, b).unwrap();

        let planned = plan(&mut world, &mut resources, ship, &OrderKind::Move { target_id: target }).unwrap();
        assert_eq!(
            planned,
            Planned::Plan {
                actions: VecDeque::from([
                    Action::Teleport { target_id: gate },
                    Action::Move {
                        target_id: target,
                        ignore_reached: false
                    },
                ]),
                sector: Some(b),
            }
        );
    }

    #[test]
    fn test_missing_target_gives_up() {
        let (mut world, mut resources, a, _) = setup();
        let ship = scout(&mut world, a);
        let planned = plan(
            &mut world,
            &mut resources,
            ship,
            &OrderKind::Move {
                target_id: EntityId(999),
            },
        )
        .unwrap();
        assert_eq!(planned, Planned::GiveUp("target gone"));
    }

    #[test]
    fn test_patrol_spawns_owned_waypoint() {
        let (mut world, mut resources, a, b) = setup();
        let ship = scout(&mut world, a);
        let planned = plan(&mut world, &mut resources, ship, &OrderKind::Patrol { sector_id: b }).unwrap();
        let Planned::Plan { actions, .. } = planned else {
            panic!("patrol should plan");
        };
        let Some(Action::Move { target_id, .. }) = actions.back() else {
            panic!("patrol ends in a move");
        };
        let waypoint = world
            .component::<sim_component::data::Waypoint>(*target_id)
            .unwrap();
        assert_eq!(waypoint.owner, Some(ship));
        assert_eq!(sector_of(&world, *target_id), Some(b));
    }

    #[test]
    fn test_mine_picks_nearest_matching_field() {
        let (mut world, mut resources, a, b) = setup();
        let ship = scout(&mut world, a);
        world.add_component(ship, Mining::new(1.0, 2.0)).unwrap();
        world.add_component(ship, Storage::new(10.0)).unwrap();
        let _ice = factory::asteroid_field(&mut world, a, Vec2::ONE, Commodity::Ice, 50.0).unwrap();
        let ore = factory::asteroid_field(&mut world, b, Vec2::ONE, Commodity::Ore, 50.0).unwrap();

        let planned = plan(
            &mut world,
            &mut resources,
            ship,
            &OrderKind::Mine {
                field_id: None,
                commodity: Commodity::Ore,
            },
        )
        .unwrap();
        let Planned::Plan { actions, sector } = planned else {
            panic!("mine should plan");
        };
        assert_eq!(sector, Some(b));
        assert_eq!(actions.back(), Some(&Action::Mine { target_id: ore }));
    }

    #[test]
    fn test_unreachable_sector_gives_up() {
        let (mut world, mut resources, a, _) = setup();
        let island = factory::sector(&mut world, "Island", HexCoord::new(9, 9)).unwrap();
        resources.paths = PathTable::from_world(&world);
        let ship = scout(&mut world, a);
        let planned = plan(&mut world, &mut resources, ship, &OrderKind::Patrol { sector_id: island }).unwrap();
        assert_eq!(planned, Planned::GiveUp("sector unreachable"));
    }
}
