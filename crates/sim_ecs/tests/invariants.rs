//! Property tests for mask and index consistency.

use proptest::prelude::*;
use sim_component::data::{Drive, Name, Position, Weapon};
use sim_component::{AnyComponent, ComponentKind, ComponentMask, EntityId, QueryDescriptor};
use sim_ecs::{IndexHandle, World};
use sim_math::Vec2;

#[derive(Debug, Clone)]
enum Op {
    Spawn,
    Add(usize, u8),
    Remove(usize, u8),
    Tag(usize),
    Untag(usize),
    Relocate(usize, u8),
    Overwrite(usize, u8),
    MoveTo(usize, u8),
    Nudge(usize),
    Unregister(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Spawn),
        (any::<usize>(), 0u8..4).prop_map(|(e, k)| Op::Add(e, k)),
        (any::<usize>(), 0u8..4).prop_map(|(e, k)| Op::Remove(e, k)),
        any::<usize>().prop_map(Op::Tag),
        any::<usize>().prop_map(Op::Untag),
        (any::<usize>(), 0u8..3).prop_map(|(e, s)| Op::Relocate(e, s)),
        (any::<usize>(), 0u8..4).prop_map(|(e, k)| Op::Overwrite(e, k)),
        (any::<usize>(), 0u8..3).prop_map(|(e, s)| Op::MoveTo(e, s)),
        any::<usize>().prop_map(Op::Nudge),
        any::<usize>().prop_map(Op::Unregister),
    ]
}

fn component(k: u8) -> AnyComponent {
    match k {
        0 => Position::new(Vec2::ZERO, SECTORS[0]).into(),
        1 => Drive::new(1.0, 5.0, 1.0).into(),
        2 => Weapon::new(1.0, 5.0, 1.0).into(),
        _ => Name::new("x").into(),
    }
}

fn pick(ids: &[EntityId], i: usize) -> Option<EntityId> {
    (!ids.is_empty()).then(|| ids[i % ids.len()])
}

fn kind(k: u8) -> ComponentKind {
    component(k).kind()
}

const SECTORS: [EntityId; 3] = [EntityId(1_000), EntityId(1_001), EntityId(1_002)];

/// Masks equal component keys and every index equals a fresh scan.
fn check_consistent(
    world: &mut World,
    q: &QueryDescriptor,
    plain: IndexHandle,
    sectored: IndexHandle,
) -> Result<(), TestCaseError> {
    for entity in world.entities() {
        let from_components: ComponentMask = entity.components().map(AnyComponent::kind).collect();
        prop_assert_eq!(entity.mask(), from_components);
    }

    let scanned = world.query_ids(q);
    prop_assert_eq!(world.members(plain), scanned);
    for sector in SECTORS {
        let expected: Vec<EntityId> = world
            .query(q)
            .filter(|e| e.sector() == Some(sector))
            .map(|e| e.id())
            .collect();
        prop_assert_eq!(world.members_in_sector(sectored, sector), expected);
    }
    Ok(())
}

proptest! {
    #[test]
    fn mask_and_indices_hold_after_every_change(ops in prop::collection::vec(op(), 1..80)) {
        let mut world = World::new();
        let q = QueryDescriptor::of(&[ComponentKind::Position, ComponentKind::Drive]).tag("ship");
        let plain = world.register_index(q.clone());
        let sectored = world.register_sector_index(q.clone());
        // Read once up front so the indices are live for every op.
        world.members(plain);
        world.members(sectored);

        let mut ids: Vec<EntityId> = Vec::new();
        for op in ops {
            match op {
                Op::Spawn => ids.push(world.spawn()),
                Op::Add(i, k) => if let Some(id) = pick(&ids, i) {
                    let _ = world.add_component(id, component(k));
                },
                Op::Remove(i, k) => if let Some(id) = pick(&ids, i) {
                    let _ = world.remove_component(id, kind(k));
                },
                Op::Tag(i) => if let Some(id) = pick(&ids, i) {
                    let _ = world.add_tag(id, "ship");
                },
                Op::Untag(i) => if let Some(id) = pick(&ids, i) {
                    let _ = world.remove_tag(id, "ship");
                },
                Op::Relocate(i, s) => if let Some(id) = pick(&ids, i) {
                    let _ = world.relocate(id, SECTORS[s as usize], Vec2::ONE);
                },
                Op::Overwrite(i, k) => if let Some(id) = pick(&ids, i) {
                    let _ = world.set_component(id, component(k));
                },
                Op::MoveTo(i, s) => if let Some(id) = pick(&ids, i) {
                    let _ = world.set_component(id, Position::new(Vec2::X, SECTORS[s as usize]));
                },
                Op::Nudge(i) => if let Some(id) = pick(&ids, i) {
                    if let Some(view) = world.position_mut(id) {
                        *view.coord += Vec2::Y;
                    }
                },
                Op::Unregister(i) => if let Some(id) = pick(&ids, i) {
                    world.unregister(id, "test");
                },
            }
            check_consistent(&mut world, &q, plain, sectored)?;
        }
    }
}
