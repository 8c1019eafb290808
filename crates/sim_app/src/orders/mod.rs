//! The order-execution state machine.
//!
//! Each tick, for every entity carrying orders:
//!
//! 1. Orders at the top of the stack whose target no longer exists are
//!    dropped. A removed target is normal, not an error.
//! 2. If the active order needs a plan (never planned, or interrupted) its
//!    stale actions are released and [`planning::plan`] builds new ones.
//! 3. The front action is driven once. Finishing it moves to the next one;
//!    running out of actions completes the order, except for persistent
//!    orders which are planned again.
//!
//! Auto orders pushed in front of another order leave the displaced plan
//! alone, so when they pop the original order carries on where it was.

pub mod actions;
pub mod planning;

use sim_component::EntityId;
use sim_component::data::{Action, OrderKind, OrderState, Orders, Storage, TradeOffer, TransferDirection};
use sim_ecs::World;
use sim_system::{Resources, SystemError};

pub use actions::{ActionScope, Step};
pub use planning::{Planned, plan, route, sector_of};

/// Advance the orders of `id` by one tick and report where they stand.
///
/// # Errors
///
/// Only entity-store invariant violations; missing targets and unreachable
/// sectors end the affected order instead.
pub fn step(world: &mut World, resources: &mut Resources, id: EntityId) -> Result<OrderState, SystemError> {
    drop_orphaned(world, id)?;

    if state(world, id) == OrderState::Planning {
        replan(world, resources, id)?;
    }

    match state(world, id) {
        OrderState::Executing => execute(world, resources, id)?,
        OrderState::Completed => complete(world, id)?,
        OrderState::Idle | OrderState::Planning => {}
    }
    Ok(state(world, id))
}

fn state(world: &World, id: EntityId) -> OrderState {
    world
        .component::<Orders>(id)
        .map_or(OrderState::Idle, Orders::state)
}

/// Drop active orders whose target has been unregistered.
fn drop_orphaned(world: &mut World, id: EntityId) -> Result<(), SystemError> {
    loop {
        let orphaned = world
            .component::<Orders>(id)
            .and_then(Orders::front)
            .and_then(|order| order.kind.target())
            .is_some_and(|target| !world.contains(target));
        if !orphaned {
            return Ok(());
        }
        abandon(world, id, "target gone")?;
    }
}

fn replan(world: &mut World, resources: &mut Resources, id: EntityId) -> Result<(), SystemError> {
    let Some(order) = world.component::<Orders>(id).and_then(Orders::front) else {
        return Ok(());
    };
    let kind = order.kind.clone();
    let stale: Vec<Action> = order.actions.iter().copied().collect();
    for action in stale {
        actions::release(world, id, action);
    }

    match plan(world, resources, id, &kind)? {
        Planned::Plan { actions, sector } => {
            tracing::debug!(entity = %id, order = kind.name(), steps = actions.len(), "order planned");
            if let Some(order) = world.require_mut::<Orders>(id)?.front_mut() {
                order.set_plan(actions, sector);
            }
            Ok(())
        }
        Planned::GiveUp(reason) => abandon(world, id, reason),
    }
}

fn execute(world: &mut World, resources: &mut Resources, id: EntityId) -> Result<(), SystemError> {
    let Some(order) = world.component::<Orders>(id).and_then(Orders::front) else {
        return Ok(());
    };
    let Some(action) = order.actions.front().copied() else {
        return Ok(());
    };
    let kind = order.kind.clone();
    let scope = ActionScope {
        kind: &kind,
        planned_sector: order.planned_sector,
    };

    match actions::drive(world, &resources.config, id, action, scope)? {
        Step::Continue => Ok(()),
        Step::Done => {
            actions::release(world, id, action);
            let finished = match world.require_mut::<Orders>(id)?.front_mut() {
                Some(order) => {
                    order.actions.pop_front();
                    order.actions.is_empty()
                }
                None => false,
            };
            if finished {
                complete(world, id)?;
            }
            Ok(())
        }
        Step::Replan => {
            actions::release(world, id, action);
            let rest: Vec<Action> = match world.require_mut::<Orders>(id)?.front_mut() {
                Some(order) => {
                    let rest = order.actions.iter().skip(1).copied().collect();
                    order.invalidate();
                    rest
                }
                None => Vec::new(),
            };
            for action in rest {
                actions::release(world, id, action);
            }
            tracing::debug!(entity = %id, order = kind.name(), "plan invalidated");
            Ok(())
        }
        Step::GiveUp(reason) => abandon(world, id, reason),
    }
}

/// The active order ran out of actions.
fn complete(world: &mut World, id: EntityId) -> Result<(), SystemError> {
    let orders = world.require_mut::<Orders>(id)?;
    let Some(order) = orders.front_mut() else {
        return Ok(());
    };
    if order.kind.is_persistent() {
        order.invalidate();
        return Ok(());
    }
    let Some(order) = orders.pop_front() else {
        return Ok(());
    };
    if let OrderKind::Trade { target_id, offer } = &order.kind {
        let moved = transfer(world, id, *target_id, offer)?;
        tracing::debug!(entity = %id, partner = %target_id, commodity = %offer.commodity, moved, "trade settled");
    }
    tracing::debug!(entity = %id, order = order.kind.name(), "order complete");
    Ok(())
}

/// Drop the active order and release whatever its plan had set up.
fn abandon(world: &mut World, id: EntityId, reason: &'static str) -> Result<(), SystemError> {
    let Some(order) = world.require_mut::<Orders>(id)?.pop_front() else {
        return Ok(());
    };
    for action in order.actions {
        actions::release(world, id, action);
    }
    tracing::debug!(entity = %id, order = order.kind.name(), reason, "order dropped");
    Ok(())
}

/// Drop every order of `id` and release what their plans set up, such as
/// patrol waypoints the entity owns.
pub fn release_all(world: &mut World, id: EntityId) {
    let dropped = world.component_mut::<Orders>(id).map(Orders::clear).unwrap_or_default();
    for order in dropped {
        for action in order.actions {
            actions::release(world, id, action);
        }
    }
}

/// Move cargo between a ship and its docked partner. Returns the amount
/// moved, limited by what the source holds and the destination fits.
fn transfer(world: &mut World, id: EntityId, partner: EntityId, offer: &TradeOffer) -> Result<f32, SystemError> {
    let (from, to) = match offer.direction {
        TransferDirection::Buy => (partner, id),
        TransferDirection::Sell => (id, partner),
    };
    let stored = world
        .component::<Storage>(from)
        .map_or(0.0, |s| s.get(offer.commodity));
    let space = world.component::<Storage>(to).map_or(0.0, Storage::available);
    let amount = offer.quantity.min(stored).min(space);
    if amount <= 0.0 {
        return Ok(0.0);
    }
    world
        .require_mut::<Storage>(from)?
        .remove(offer.commodity, amount)
        .map_err(|e| SystemError::invalid("orders", e.to_string()))?;
    world.require_mut::<Storage>(to)?.add(offer.commodity, amount);
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use sim_component::data::{Drive, Hitpoints, Order, Position, Weapon};
    use sim_math::{HexCoord, Vec2};
    use sim_system::{PathTable, SimConfig};

    use super::*;
    use crate::factory;

    fn setup() -> (World, Resources, EntityId) {
        let mut world = World::new();
        let sector = factory::sector(&mut world, "Alpha", HexCoord::ORIGIN).unwrap();
        let mut resources = Resources::new(SimConfig::default());
        resources.paths = PathTable::from_world(&world);
        (world, resources, sector)
    }

    fn ship(world: &mut World, sector: EntityId, at: Vec2, orders: Orders) -> EntityId {
        world
            .spawn_with(
                [
                    Position::new(at, sector).into(),
                    Drive::new(1.0, 4.0, 1.0).into(),
                    Weapon::new(5.0, 3.0, 1.0).into(),
                    Hitpoints::full(10.0).into(),
                    orders.into(),
                ],
                Vec::<String>::new(),
            )
            .unwrap()
    }

    fn front(world: &World, id: EntityId) -> Option<Order> {
        world.component::<Orders>(id).and_then(Orders::front).cloned()
    }

    #[test]
    fn test_idle_without_orders() {
        let (mut world, mut resources, sector) = setup();
        let id = ship(&mut world, sector, Vec2::ZERO, Orders::new());
        assert_eq!(step(&mut world, &mut resources, id).unwrap(), OrderState::Idle);
    }

    #[test]
    fn test_move_plans_then_completes() {
        let (mut world, mut resources, sector) = setup();
        let beacon = factory::waypoint(&mut world, sector, Vec2::new(0.5, 0.0), None).unwrap();
        let id = ship(&mut world, sector, Vec2::ZERO, Orders::with(OrderKind::Move { target_id: beacon }));

        // Already within reach: plan, drive the move, finish, pop.
        assert_eq!(step(&mut world, &mut resources, id).unwrap(), OrderState::Idle);
        assert!(!world.contains(beacon), "reached waypoint is removed");
    }

    #[test]
    fn test_move_executes_until_reached() {
        let (mut world, mut resources, sector) = setup();
        let beacon = factory::waypoint(&mut world, sector, Vec2::new(20.0, 0.0), None).unwrap();
        let id = ship(&mut world, sector, Vec2::ZERO, Orders::with(OrderKind::Move { target_id: beacon }));

        assert_eq!(step(&mut world, &mut resources, id).unwrap(), OrderState::Executing);
        assert_eq!(world.component::<Drive>(id).unwrap().target, Some(beacon));
    }

    #[test]
    fn test_removed_target_drops_order() {
        let (mut world, mut resources, sector) = setup();
        let victim = ship(&mut world, sector, Vec2::new(2.0, 0.0), Orders::new());
        let id = ship(
            &mut world,
            sector,
            Vec2::ZERO,
            Orders::with(OrderKind::Attack {
                target_id: victim,
                follow_outside_sector: false,
                max_distance: None,
            }),
        );
        step(&mut world, &mut resources, id).unwrap();
        assert_eq!(world.component::<Weapon>(id).unwrap().target_id, Some(victim));

        world.unregister(victim, "destroyed");
        assert_eq!(step(&mut world, &mut resources, id).unwrap(), OrderState::Idle);
        assert_eq!(world.component::<Weapon>(id).unwrap().target_id, None);
    }

    #[test]
    fn test_interrupt_forces_replan() {
        let (mut world, mut resources, sector) = setup();
        // Far from the patrol area so the first waypoint is not reached at once.
        let id = ship(&mut world, sector, Vec2::new(50.0, 0.0), Orders::with(OrderKind::Patrol { sector_id: sector }));
        step(&mut world, &mut resources, id).unwrap();
        let first = front(&world, id).unwrap();
        let Some(Action::Move { target_id: first_waypoint, .. }) = first.actions.back().copied() else {
            panic!("patrol plans a move");
        };

        world.component_mut::<Orders>(id).unwrap().mark_interrupt();
        step(&mut world, &mut resources, id).unwrap();
        let second = front(&world, id).unwrap();
        assert!(!second.interrupt);
        assert!(!world.contains(first_waypoint), "stale waypoint released");
        assert_ne!(second.actions, first.actions);
    }

    #[test]
    fn test_release_all_removes_owned_waypoints() {
        let (mut world, mut resources, sector) = setup();
        let id = ship(&mut world, sector, Vec2::new(50.0, 0.0), Orders::with(OrderKind::Patrol { sector_id: sector }));
        step(&mut world, &mut resources, id).unwrap();
        let Some(Action::Move { target_id: waypoint, .. }) = front(&world, id).unwrap().actions.back().copied() else {
            panic!("patrol plans a move");
        };

        release_all(&mut world, id);
        assert!(!world.contains(waypoint));
        assert_eq!(world.component::<Orders>(id).unwrap().len(), 0);
        assert_eq!(world.component::<Drive>(id).unwrap().target, None);
    }

    #[test]
    fn test_persistent_order_is_replanned_not_popped() {
        let (mut world, mut resources, sector) = setup();
        let id = ship(&mut world, sector, Vec2::ZERO, Orders::with(OrderKind::Hold));
        for _ in 0..3 {
            step(&mut world, &mut resources, id).unwrap();
            assert_eq!(front(&world, id).unwrap().kind, OrderKind::Hold);
        }
    }

    #[test]
    fn test_attack_gives_up_beyond_max_distance() {
        let (mut world, mut resources, sector) = setup();
        let victim = ship(&mut world, sector, Vec2::new(50.0, 0.0), Orders::new());
        let id = ship(
            &mut world,
            sector,
            Vec2::ZERO,
            Orders::with(OrderKind::Attack {
                target_id: victim,
                follow_outside_sector: false,
                max_distance: Some(10.0),
            }),
        );
        assert_eq!(step(&mut world, &mut resources, id).unwrap(), OrderState::Idle);
    }

    #[test]
    fn test_trade_moves_cargo_on_completion() {
        let (mut world, mut resources, sector) = setup();
        let owner = factory::faction(&mut world, "Traders", "trd").unwrap();
        let station = factory::facility(&mut world, "Depot", owner, sector, Vec2::new(0.5, 0.0)).unwrap();
        world
            .require_mut::<Storage>(station)
            .unwrap()
            .add(sim_component::data::Commodity::Water, 30.0);
        let id = ship(
            &mut world,
            sector,
            Vec2::ZERO,
            Orders::with(OrderKind::Trade {
                target_id: station,
                offer: TradeOffer {
                    commodity: sim_component::data::Commodity::Water,
                    quantity: 20.0,
                    direction: TransferDirection::Buy,
                },
            }),
        );
        world.add_component(id, Storage::new(15.0)).unwrap();

        for _ in 0..4 {
            step(&mut world, &mut resources, id).unwrap();
        }
        assert!(front(&world, id).is_none());
        let hold = world.component::<Storage>(id).unwrap();
        assert_eq!(hold.get(sim_component::data::Commodity::Water), 15.0);
        let depot = world.component::<Storage>(station).unwrap();
        assert_eq!(depot.get(sim_component::data::Commodity::Water), 15.0);
    }

    #[test]
    fn test_auto_order_leaves_displaced_plan_untouched() {
        let (mut world, mut resources, sector) = setup();
        let id = ship(&mut world, sector, Vec2::new(50.0, 0.0), Orders::with(OrderKind::Patrol { sector_id: sector }));
        step(&mut world, &mut resources, id).unwrap();
        let planned: VecDeque<Action> = front(&world, id).unwrap().actions;

        let victim = ship(&mut world, sector, Vec2::new(51.0, 0.0), Orders::new());
        world.component_mut::<Orders>(id).unwrap().push_auto(OrderKind::Attack {
            target_id: victim,
            follow_outside_sector: false,
            max_distance: None,
        });
        step(&mut world, &mut resources, id).unwrap();
        assert_eq!(front(&world, id).unwrap().kind.name(), "attack");

        let displaced = world.component::<Orders>(id).unwrap().iter().nth(1).cloned().unwrap();
        assert_eq!(displaced.actions, planned);
        assert!(!displaced.interrupt);
    }
}
