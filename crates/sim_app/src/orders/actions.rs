//! Driving one action for one tick.

use sim_component::data::{
    Action, Collectible, Deployable, Dockable, Docks, Drive, DriveMode, Facility, Hitpoints, Minable,
    Mining, OrderKind, Position, ShipSize, Storage, Teleport, Waypoint, Weapon,
};
use sim_component::{ComponentKind, EntityId, tags};
use sim_ecs::World;
use sim_system::{SimConfig, SystemError};

use super::planning::sector_of;

/// What the order machine should do after driving an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep going next tick.
    Continue,
    /// The action is complete; move on to the next one.
    Done,
    /// The plan no longer fits the world; plan the order again.
    Replan,
    /// The order cannot be completed; drop it.
    GiveUp(&'static str),
}

/// Per-action context from the owning order.
#[derive(Debug, Clone, Copy)]
pub struct ActionScope<'a> {
    pub kind: &'a OrderKind,
    pub planned_sector: Option<EntityId>,
}

impl ActionScope<'_> {
    /// A target that vanished ends the order if it was the order's own
    /// target; anything picked by planning (gate, waypoint, field) is
    /// replaced by planning again.
    fn target_missing(&self, target: EntityId) -> Step {
        if self.kind.target() == Some(target) {
            Step::GiveUp("target gone")
        } else {
            Step::Replan
        }
    }
}

fn steer(world: &mut World, id: EntityId, target: EntityId, mode: DriveMode, minimal_distance: f32) {
    if let Some(drive) = world.component_mut::<Drive>(id) {
        drive.set_target(target, mode, minimal_distance);
    }
}

fn stop(world: &mut World, id: EntityId) {
    if let Some(drive) = world.component_mut::<Drive>(id) {
        drive.clear_target();
    }
}

/// Leave the pad this entity is docked at, if any.
pub fn undock(world: &mut World, id: EntityId) {
    let Some(station) = world.component::<Dockable>(id).and_then(|d| d.docked_in) else {
        return;
    };
    if let Some(docks) = world.component_mut::<Docks>(station) {
        docks.undock(id);
    }
    if let Some(dockable) = world.component_mut::<Dockable>(id) {
        dockable.docked_in = None;
    }
    tracing::debug!(entity = %id, station = %station, "undocked");
}

/// Drive `action` for entity `id`.
pub fn drive(
    world: &mut World,
    config: &SimConfig,
    id: EntityId,
    action: Action,
    scope: ActionScope<'_>,
) -> Result<Step, SystemError> {
    if !matches!(action, Action::Dock { .. }) {
        undock(world, id);
    }
    let here = sector_of(world, id);

    // Every targeted action needs its target in the same sector.
    if let Some(target) = action.target() {
        let Some(there) = sector_of(world, target) else {
            return Ok(match action {
                Action::Attack { .. } => Step::Done,
                _ => scope.target_missing(target),
            });
        };
        if Some(there) != here {
            return Ok(match (action, scope.kind) {
                (
                    Action::Attack { .. },
                    OrderKind::Attack {
                        follow_outside_sector: false,
                        ..
                    },
                ) if scope.planned_sector != Some(there) => Step::GiveUp("target left sector"),
                _ => Step::Replan,
            });
        }
    }

    match action {
        Action::Move {
            target_id,
            ignore_reached,
        } => Ok(move_to(world, config, id, target_id, ignore_reached)),
        Action::Teleport { target_id } => teleport(world, config, id, target_id),
        Action::Attack { target_id } => Ok(attack(world, id, target_id, scope)),
        Action::Dock { target_id } => Ok(dock(world, config, id, target_id)),
        Action::Mine { target_id } => Ok(mine(world, id, target_id)),
        Action::Collect { target_id } => collect(world, config, id, target_id),
        Action::DeployFacility => deploy(world, id),
    }
}

fn move_to(world: &mut World, config: &SimConfig, id: EntityId, target: EntityId, ignore_reached: bool) -> Step {
    let reach = config.dock_distance;
    if ignore_reached {
        steer(world, id, target, DriveMode::Follow, reach);
        return Step::Continue;
    }
    let distance = world.distance(id, target).unwrap_or(f32::INFINITY);
    if distance <= reach {
        stop(world, id);
        if world.component::<Waypoint>(target).is_some() {
            world.unregister(target, "waypoint reached");
        }
        return Step::Done;
    }
    steer(world, id, target, DriveMode::Goto, reach * 0.5);
    Step::Continue
}

fn teleport(world: &mut World, config: &SimConfig, id: EntityId, gate: EntityId) -> Result<Step, SystemError> {
    let far_side = world
        .component::<Teleport>(gate)
        .and_then(|t| t.destination_id)
        .and_then(|dest| world.component::<Position>(dest).copied());
    let Some(far_side) = far_side else {
        tracing::warn!(entity = %id, gate = %gate, "gate leads nowhere");
        return Ok(Step::Replan);
    };

    let distance = world.distance(id, gate).unwrap_or(f32::INFINITY);
    if distance > config.dock_distance {
        steer(world, id, gate, DriveMode::Goto, config.dock_distance * 0.5);
        return Ok(Step::Continue);
    }
    stop(world, id);
    world.relocate(id, far_side.sector(), far_side.coord)?;
    tracing::debug!(entity = %id, gate = %gate, sector = %far_side.sector(), "jumped");
    Ok(Step::Done)
}

fn attack(world: &mut World, id: EntityId, target: EntityId, scope: ActionScope<'_>) -> Step {
    // Nothing left to shoot at: the weapon lets go and the action is over.
    if world.component::<Hitpoints>(target).is_none() {
        return Step::Done;
    }
    let distance = world.distance(id, target).unwrap_or(f32::INFINITY);
    if let OrderKind::Attack {
        max_distance: Some(max),
        ..
    } = scope.kind
    {
        if distance > *max {
            return Step::GiveUp("target out of range");
        }
    }

    let Some(weapon) = world.component_mut::<Weapon>(id) else {
        return Step::GiveUp("unarmed");
    };
    weapon.target_id = Some(target);
    let range = weapon.range;

    let small = world
        .component::<Dockable>(id)
        .is_some_and(|d| d.size == ShipSize::Small);
    let mode = if small { DriveMode::Flyby } else { DriveMode::Follow };
    steer(world, id, target, mode, range * 0.5);
    Step::Continue
}

fn dock(world: &mut World, config: &SimConfig, id: EntityId, station: EntityId) -> Step {
    match world.component::<Dockable>(id).and_then(|d| d.docked_in) {
        Some(current) if current == station => return Step::Done,
        Some(_) => undock(world, id),
        None => {}
    }
    let distance = world.distance(id, station).unwrap_or(f32::INFINITY);
    if distance > config.dock_distance {
        steer(world, id, station, DriveMode::Goto, config.dock_distance * 0.5);
        return Step::Continue;
    }
    stop(world, id);
    let Some(docks) = world.component_mut::<Docks>(station) else {
        return Step::GiveUp("target has no docks");
    };
    if !docks.dock(id) {
        return Step::Continue;
    }
    if let Some(dockable) = world.component_mut::<Dockable>(id) {
        dockable.docked_in = Some(station);
    }
    tracing::debug!(entity = %id, station = %station, "docked");
    Step::Done
}

fn mine(world: &mut World, id: EntityId, field: EntityId) -> Step {
    if world.component::<Minable>(field).is_none_or(Minable::is_exhausted) {
        return Step::Replan;
    }
    if world.component::<Storage>(id).is_none_or(Storage::is_full) {
        return Step::Done;
    }
    let Some(range) = world.component::<Mining>(id).map(|m| m.range) else {
        return Step::GiveUp("no mining equipment");
    };
    let distance = world.distance(id, field).unwrap_or(f32::INFINITY);
    let in_range = distance <= range;
    if in_range {
        stop(world, id);
    } else {
        steer(world, id, field, DriveMode::Goto, range * 0.5);
    }
    if let Some(mining) = world.component_mut::<Mining>(id) {
        mining.entity_id = in_range.then_some(field);
    }
    Step::Continue
}

fn collect(world: &mut World, config: &SimConfig, id: EntityId, crate_id: EntityId) -> Result<Step, SystemError> {
    let distance = world.distance(id, crate_id).unwrap_or(f32::INFINITY);
    if distance > config.collect_distance {
        steer(world, id, crate_id, DriveMode::Goto, config.collect_distance * 0.5);
        return Ok(Step::Continue);
    }
    stop(world, id);
    let Some(cargo) = world.component::<Collectible>(crate_id).copied() else {
        return Ok(Step::GiveUp("not collectible"));
    };
    let storage = world.require_mut::<Storage>(id)?;
    let taken = storage.add(cargo.commodity, cargo.quantity);
    world.unregister(crate_id, "collected");
    tracing::debug!(entity = %id, commodity = %cargo.commodity, taken, "collected");
    Ok(Step::Done)
}

/// Turn a deployable ship into a facility in place.
pub fn deploy(world: &mut World, id: EntityId) -> Result<Step, SystemError> {
    let Some(deployable) = world.component::<Deployable>(id).copied() else {
        return Ok(Step::GiveUp("not deployable"));
    };
    undock(world, id);
    world.remove_component(id, ComponentKind::Deployable)?;
    for kind in [ComponentKind::Drive, ComponentKind::Dockable] {
        if world.has(id, kind) {
            world.remove_component(id, kind)?;
        }
    }
    world.set_component(id, Docks::new(deployable.pads))?;
    world.set_component(id, Facility {
        slots: deployable.slots,
    })?;
    world.remove_tag(id, tags::SHIP)?;
    world.add_tag(id, tags::FACILITY)?;
    tracing::debug!(entity = %id, "deployed facility");
    Ok(Step::Done)
}

/// Undo whatever `action` set up on the entity when it stops being driven.
pub fn release(world: &mut World, id: EntityId, action: Action) {
    match action {
        Action::Attack { target_id } => {
            if let Some(weapon) = world.component_mut::<Weapon>(id) {
                if weapon.target_id == Some(target_id) {
                    weapon.target_id = None;
                }
            }
        }
        Action::Mine { .. } => {
            if let Some(mining) = world.component_mut::<Mining>(id) {
                mining.entity_id = None;
            }
        }
        Action::Move { target_id, .. } => {
            let own_waypoint = world
                .component::<Waypoint>(target_id)
                .is_some_and(|w| w.owner == Some(id));
            if own_waypoint {
                world.unregister(target_id, "plan discarded");
            }
        }
        _ => {}
    }
    stop(world, id);
}
