use sim_component::tags;
use sim_ecs::{Cooldowns, Phase};
use sim_system::{System, SystemContext, SystemError};

const REPORT: &str = "report";

/// Seconds of simulated time between summaries.
const REPORT_INTERVAL: f64 = 30.0;

/// Logs a periodic summary of the world at the end of a tick.
#[derive(Debug, Default)]
pub struct TelemetrySystem {
    cooldowns: Cooldowns,
}

impl TelemetrySystem {
    /// Creates a telemetry system that has not reported yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for TelemetrySystem {
    fn name(&self) -> &str {
        "telemetry"
    }

    fn phases(&self) -> &[Phase] {
        &[Phase::End]
    }

    fn exec(&mut self, _phase: Phase, ctx: &mut SystemContext<'_>) -> Result<(), SystemError> {
        if !self.cooldowns.ready(REPORT, REPORT_INTERVAL) {
            return Ok(());
        }
        let ships = ctx.world.entities().filter(|e| e.has_tag(tags::SHIP)).count();
        let facilities = ctx.world.entities().filter(|e| e.has_tag(tags::FACILITY)).count();
        tracing::info!(
            tick_id = ctx.tick_id,
            elapsed = ctx.elapsed + ctx.dt,
            entities = ctx.world.len(),
            ships,
            facilities,
            "world summary"
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
