//! The gameplay systems and the order they run in.
//!
//! Within a phase systems run in registration order, so anything consuming
//! another system's output in the same tick is listed after it.

mod combat;
mod cooldowns;
mod destroy;
mod mining;
mod navigation;
mod orders;
mod path_planning;
mod spotting;
mod telemetry;

pub use combat::CombatSystem;
pub use cooldowns::CooldownSystem;
pub use destroy::DestroySystem;
pub use mining::MiningSystem;
pub use navigation::NavigationSystem;
pub use orders::OrderSystem;
pub use path_planning::PathPlanningSystem;
pub use spotting::SpottingSystem;
pub use telemetry::TelemetrySystem;

use sim_system::System;

/// Every gameplay system in run order.
#[must_use]
pub fn default_systems() -> Vec<Box<dyn System>> {
    vec![
        Box::new(CooldownSystem::new()),
        Box::new(PathPlanningSystem::new()),
        Box::new(SpottingSystem::new()),
        Box::new(OrderSystem::new()),
        Box::new(NavigationSystem::new()),
        Box::new(MiningSystem::new()),
        Box::new(CombatSystem::new()),
        Box::new(DestroySystem::new()),
        Box::new(TelemetrySystem::new()),
    ]
}
