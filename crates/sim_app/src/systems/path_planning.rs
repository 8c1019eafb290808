use sim_ecs::{Cooldowns, Phase};
use sim_system::{PathTable, System, SystemContext, SystemError};

const REBUILD: &str = "rebuild";

/// Rebuilds the sector routing table on the first tick and then every
/// `path_interval` seconds.
#[derive(Debug, Default)]
pub struct PathPlanningSystem {
    cooldowns: Cooldowns,
}

impl PathPlanningSystem {
    /// Creates the path planning system; the first tick builds the table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for PathPlanningSystem {
    fn name(&self) -> &str {
        "pathPlanning"
    }

    fn phases(&self) -> &[Phase] {
        &[Phase::Start]
    }

    fn exec(&mut self, _phase: Phase, ctx: &mut SystemContext<'_>) -> Result<(), SystemError> {
        if !self.cooldowns.ready(REBUILD, ctx.resources.config.path_interval) {
            return Ok(());
        }
        ctx.resources.paths = PathTable::from_world(ctx.world);
        tracing::debug!(
            tick_id = ctx.tick_id,
            sectors = ctx.resources.paths.sectors().count(),
            "path table rebuilt"
        );
        Ok(())
    }

    fn cooldowns(&self) -> Option<&Cooldowns> {
        Some(&self.cooldowns)
    }

    fn cooldowns_mut(&mut self) -> Option<&mut Cooldowns> {
        Some(&mut self.cooldowns)
    }
}
