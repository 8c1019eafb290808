//! Patrols, pillagers and escorts pick fights with what they see.
//!
//! Every `spotting_interval` seconds each such entity looks for the closest
//! enemy in its sector within `spotting_range` and, if one is found, an
//! automatic attack order is pushed ahead of its current order. The
//! displaced order keeps its plan and resumes once the attack is over.
//!
//! Who counts as an enemy depends only on the owner, the sector and the
//! order kind, so the list is computed once per such key and shared by all
//! entities with that key. The cache is thrown away at the end of every
//! scan.

use std::collections::BTreeMap;

use sim_component::data::{Faction, OrderKind, Orders, Owner, Position};
use sim_component::{ComponentKind, EntityId, QueryDescriptor};
use sim_ecs::{Cooldowns, IndexHandle, Phase, World};
use sim_system::{SimConfig, System, SystemContext, SystemError};

const SCAN: &str = "scan";

type EnemyKey = (EntityId, EntityId, &'static str);

#[derive(Debug, Default)]
pub struct SpottingSystem {
    cooldowns: Cooldowns,
    spotters: Option<IndexHandle>,
    targets: Option<IndexHandle>,
}

impl SpottingSystem {
    /// Creates the spotting system. Its indices are registered on first use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn indices(&mut self, world: &mut World) -> (IndexHandle, IndexHandle) {
        let spotters = *self.spotters.get_or_insert_with(|| {
            world.register_index(QueryDescriptor::of(&[
                ComponentKind::Orders,
                ComponentKind::Weapon,
                ComponentKind::Owner,
                ComponentKind::Position,
            ]))
        });
        let targets = *self.targets.get_or_insert_with(|| {
            world.register_sector_index(QueryDescriptor::of(&[
                ComponentKind::Owner,
                ComponentKind::Hitpoints,
            ]))
        });
        (spotters, targets)
    }
}

impl System for SpottingSystem {
    fn name(&self) -> &str {
        "spotting"
    }

    fn apply(&mut self, world: &mut World) {
        self.spotters = None;
        self.targets = None;
        self.indices(world);
    }

    fn exec(&mut self, _phase: Phase, ctx: &mut SystemContext<'_>) -> Result<(), SystemError> {
        let config = &ctx.resources.config;
        if !self.cooldowns.ready(SCAN, config.spotting_interval) {
            return Ok(());
        }
        let (spotters, targets) = self.indices(ctx.world);

        let mut enemies: BTreeMap<EnemyKey, Vec<EntityId>> = BTreeMap::new();
        for id in ctx.world.members(spotters) {
            let Some((owner, sector, kind)) = spotting_key(ctx.world, id) else {
                continue;
            };
            let key = (owner, sector, kind.name());
            if !enemies.contains_key(&key) {
                let list = enemies_of(ctx.world, config, targets, owner, sector, kind);
                enemies.insert(key, list);
            }
            let Some(target) = closest(ctx.world, config, id, &enemies[&key]) else {
                continue;
            };
            ctx.world.require_mut::<Orders>(id)?.push_auto(OrderKind::Attack {
                target_id: target,
                follow_outside_sector: false,
                max_distance: Some(config.spotting_range * 2.0),
            });
            tracing::debug!(tick_id = ctx.tick_id, entity = %id, target = %target, "enemy spotted");
        }
        Ok(())
    }

    fn cooldowns(&self) -> Option<&Cooldowns> {
        Some(&self.cooldowns)
    }

    fn cooldowns_mut(&mut self) -> Option<&mut Cooldowns> {
        Some(&mut self.cooldowns)
    }
}

/// Owner, sector and active order of an entity that is on the lookout.
fn spotting_key(world: &World, id: EntityId) -> Option<(EntityId, EntityId, OrderKind)> {
    let kind = world.component::<Orders>(id)?.front()?.kind.clone();
    if !matches!(
        kind,
        OrderKind::Patrol { .. } | OrderKind::Pillage { .. } | OrderKind::Escort { .. }
    ) {
        return None;
    }
    let owner = world.component::<Owner>(id)?.id;
    let sector = world.component::<Position>(id)?.sector();
    Some((owner, sector, kind))
}

fn enemies_of(
    world: &mut World,
    config: &SimConfig,
    targets: IndexHandle,
    owner: EntityId,
    sector: EntityId,
    kind: OrderKind,
) -> Vec<EntityId> {
    let Some(faction) = world.component::<Faction>(owner).cloned() else {
        return Vec::new();
    };
    let pillaging = matches!(kind, OrderKind::Pillage { .. });
    world
        .members_in_sector(targets, sector)
        .into_iter()
        .filter(|candidate| {
            let Some(other) = world.component::<Owner>(*candidate).map(|o| o.id) else {
                return false;
            };
            if other == owner {
                return false;
            }
            if pillaging {
                faction.relation(other) <= 0.0
            } else {
                faction.is_hostile(other, config.hostility_threshold)
            }
        })
        .collect()
}

fn closest(world: &World, config: &SimConfig, id: EntityId, enemies: &[EntityId]) -> Option<EntityId> {
    enemies
        .iter()
        .filter_map(|enemy| Some((world.distance(id, *enemy)?, *enemy)))
        .filter(|(distance, _)| *distance <= config.spotting_range)
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
        .map(|(_, enemy)| enemy)
}

#[cfg(test)]
mod tests {
    use sim_component::data::Action;
    use sim_math::{HexCoord, Vec2};
    use sim_system::{Resources, SystemQueue};

    use super::*;
    use crate::factory::{self, ShipClass};

    struct Scene {
        world: World,
        resources: Resources,
        sector: EntityId,
        traders: EntityId,
        pirates: EntityId,
    }

    fn scene() -> Scene {
        let mut world = World::new();
        let sector = factory::sector(&mut world, "Alpha", HexCoord::ORIGIN).unwrap();
        let traders = factory::faction(&mut world, "Traders", "TRD").unwrap();
        let pirates = factory::faction(&mut world, "Pirates", "PIR").unwrap();
        factory::set_relation(&mut world, traders, pirates, -100.0).unwrap();
        Scene {
            world,
            resources: Resources::new(SimConfig::default()),
            sector,
            traders,
            pirates,
        }
    }

    fn scan(scene: &mut Scene, system: &mut SpottingSystem) {
        let mut queue = SystemQueue::new();
        let mut ctx = SystemContext::new(1, 0.1, 0.0, &mut scene.world, &mut scene.resources, &mut queue);
        system.exec(Phase::Update, &mut ctx).unwrap();
    }

    fn front(world: &World, id: EntityId) -> OrderKind {
        world.component::<Orders>(id).unwrap().front().unwrap().kind.clone()
    }

    #[test]
    fn test_patrol_attacks_closest_hostile() {
        let mut s = scene();
        let sector = s.sector;
        let guard = factory::ship(&mut s.world, ShipClass::Fighter, s.traders, sector, Vec2::ZERO).unwrap();
        s.world
            .component_mut::<Orders>(guard)
            .unwrap()
            .replace(sim_component::data::Order::new(OrderKind::Patrol { sector_id: sector }));
        let far = factory::ship(&mut s.world, ShipClass::Fighter, s.pirates, sector, Vec2::new(6.0, 0.0)).unwrap();
        let near = factory::ship(&mut s.world, ShipClass::Fighter, s.pirates, sector, Vec2::new(3.0, 0.0)).unwrap();

        let mut system = SpottingSystem::new();
        scan(&mut s, &mut system);

        let OrderKind::Attack { target_id, .. } = front(&s.world, guard) else {
            panic!("attack pushed");
        };
        assert_eq!(target_id, near);
        assert_ne!(target_id, far);
        assert_eq!(s.world.component::<Orders>(guard).unwrap().len(), 2);
    }

    #[test]
    fn test_displaced_plan_is_kept() {
        let mut s = scene();
        let sector = s.sector;
        let guard = factory::ship(&mut s.world, ShipClass::Fighter, s.traders, sector, Vec2::ZERO).unwrap();
        let mut patrol = sim_component::data::Order::new(OrderKind::Patrol { sector_id: sector });
        let waypoint = factory::waypoint(&mut s.world, sector, Vec2::ONE, Some(guard)).unwrap();
        patrol.set_plan(
            [Action::Move {
                target_id: waypoint,
                ignore_reached: false,
            }]
            .into(),
            Some(sector),
        );
        s.world.component_mut::<Orders>(guard).unwrap().replace(patrol.clone());
        factory::ship(&mut s.world, ShipClass::Fighter, s.pirates, sector, Vec2::new(2.0, 0.0)).unwrap();

        let mut system = SpottingSystem::new();
        scan(&mut s, &mut system);

        let displaced = s.world.component::<Orders>(guard).unwrap().iter().nth(1).cloned().unwrap();
        assert_eq!(displaced, patrol);
    }

    #[test]
    fn test_neutral_and_out_of_range_ignored() {
        let mut s = scene();
        let sector = s.sector;
        let neutrals = factory::faction(&mut s.world, "Neutral", "NEU").unwrap();
        let guard = factory::ship(&mut s.world, ShipClass::Fighter, s.traders, sector, Vec2::ZERO).unwrap();
        s.world
            .component_mut::<Orders>(guard)
            .unwrap()
            .replace(sim_component::data::Order::new(OrderKind::Patrol { sector_id: sector }));
        factory::ship(&mut s.world, ShipClass::Hauler, neutrals, sector, Vec2::new(1.0, 0.0)).unwrap();
        factory::ship(&mut s.world, ShipClass::Fighter, s.pirates, sector, Vec2::new(50.0, 0.0)).unwrap();

        let mut system = SpottingSystem::new();
        scan(&mut s, &mut system);
        assert_eq!(front(&s.world, guard), OrderKind::Patrol { sector_id: sector });
    }

    #[test]
    fn test_pillage_targets_neutrals() {
        let mut s = scene();
        let sector = s.sector;
        let neutrals = factory::faction(&mut s.world, "Neutral", "NEU").unwrap();
        let raider = factory::ship(&mut s.world, ShipClass::Fighter, s.pirates, sector, Vec2::ZERO).unwrap();
        s.world
            .component_mut::<Orders>(raider)
            .unwrap()
            .replace(sim_component::data::Order::new(OrderKind::Pillage { sector_id: sector }));
        let victim = factory::ship(&mut s.world, ShipClass::Hauler, neutrals, sector, Vec2::new(1.0, 0.0)).unwrap();

        let mut system = SpottingSystem::new();
        scan(&mut s, &mut system);
        assert!(matches!(front(&s.world, raider), OrderKind::Attack { target_id, .. } if target_id == victim));
    }

    #[test]
    fn test_scans_wait_for_interval() {
        let mut s = scene();
        let sector = s.sector;
        let guard = factory::ship(&mut s.world, ShipClass::Fighter, s.traders, sector, Vec2::ZERO).unwrap();
        s.world
            .component_mut::<Orders>(guard)
            .unwrap()
            .replace(sim_component::data::Order::new(OrderKind::Patrol { sector_id: sector }));

        let mut system = SpottingSystem::new();
        scan(&mut s, &mut system);
        factory::ship(&mut s.world, ShipClass::Fighter, s.pirates, sector, Vec2::new(2.0, 0.0)).unwrap();
        scan(&mut s, &mut system);
        assert_eq!(front(&s.world, guard), OrderKind::Patrol { sector_id: sector });

        system.cooldowns_mut().unwrap().update(1.0);
        scan(&mut s, &mut system);
        assert!(matches!(front(&s.world, guard), OrderKind::Attack { .. }));
    }
}
