//! Weapon fire and hull regeneration.

use sim_component::data::{Hitpoints, Weapon};
use sim_component::{ComponentKind, EntityId, QueryDescriptor};
use sim_ecs::{IndexHandle, Phase, World};
use sim_system::{System, SystemContext, SystemError};

/// Cooldown gating how often an entity fires.
pub const SHOOT: &str = "shoot";

#[derive(Debug, Default)]
pub struct CombatSystem {
    armed: Option<IndexHandle>,
    damageable: Option<IndexHandle>,
}

impl CombatSystem {
    /// Creates the combat system. Its indices are registered on first use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn indices(&mut self, world: &mut World) -> (IndexHandle, IndexHandle) {
        let armed = *self.armed.get_or_insert_with(|| {
            world.register_index(QueryDescriptor::of(&[
                ComponentKind::Weapon,
                ComponentKind::Position,
            ]))
        });
        let damageable = *self
            .damageable
            .get_or_insert_with(|| world.register_index(QueryDescriptor::of(&[ComponentKind::Hitpoints])));
        (armed, damageable)
    }
}

impl System for CombatSystem {
    fn name(&self) -> &str {
        "combat"
    }

    fn apply(&mut self, world: &mut World) {
        self.armed = None;
        self.damageable = None;
        self.indices(world);
    }

    fn exec(&mut self, _phase: Phase, ctx: &mut SystemContext<'_>) -> Result<(), SystemError> {
        let (armed, damageable) = self.indices(ctx.world);
        let dt = ctx.dt as f32;
        for id in ctx.world.members(damageable) {
            ctx.world.require_mut::<Hitpoints>(id)?.regenerate(dt);
        }
        for id in ctx.world.members(armed) {
            fire(ctx.world, id)?;
        }
        Ok(())
    }
}

fn fire(world: &mut World, id: EntityId) -> Result<(), SystemError> {
    let weapon = *world.require::<Weapon>(id)?;
    let Some(target) = weapon.target_id else {
        return Ok(());
    };
    if !world.has(target, ComponentKind::Hitpoints) {
        world.require_mut::<Weapon>(id)?.target_id = None;
        return Ok(());
    }
    let in_range = world.distance(id, target).is_some_and(|d| d <= weapon.range);
    if !in_range {
        return Ok(());
    }

    let ready = world.entity_mut(id)?.cooldowns_mut().ready(SHOOT, weapon.cooldown);
    if !ready {
        return Ok(());
    }
    let hull = world.require_mut::<Hitpoints>(target)?;
    hull.damage(weapon.damage);
    tracing::trace!(entity = %id, target = %target, hp = hull.hp, "hit");
    Ok(())
}
