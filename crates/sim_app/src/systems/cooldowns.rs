use sim_ecs::Phase;
use sim_system::{System, SystemContext, SystemError};

/// Runs every entity's cooldown timers down at the start of a tick, before
/// any system reads them.
#[derive(Debug, Default)]
pub struct CooldownSystem;

impl CooldownSystem {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl System for CooldownSystem {
    fn name(&self) -> &str {
        "cooldowns"
    }

    fn phases(&self) -> &[Phase] {
        &[Phase::Start]
    }

    fn exec(&mut self, _phase: Phase, ctx: &mut SystemContext<'_>) -> Result<(), SystemError> {
        for entity in ctx.world.entities_mut() {
            entity.cooldowns_mut().update(ctx.dt);
        }
        Ok(())
    }
}
