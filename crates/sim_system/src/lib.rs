//! # sim_system
//!
//! System runtime for the sector simulation.
//!
//! A system is anything implementing [`System`]: it names the phases it
//! runs in and receives a [`SystemContext`] giving it the world, the shared
//! [`Resources`] and a queue for adding or removing systems at the next tick
//! boundary.
//!
//! ```rust
//! use sim_system::{FnSystem, Phase, System};
//!
//! let telemetry = FnSystem::new("telemetry", |ctx| {
//!     tracing::debug!(tick_id = ctx.tick_id, entities = ctx.world.len(), "tick");
//!     Ok(())
//! })
//! .in_phase(Phase::End);
//! assert_eq!(telemetry.name(), "telemetry");
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod paths;
pub mod resources;
pub mod system;

pub use config::SimConfig;
pub use context::{SystemContext, SystemQueue};
pub use error::{ConfigError, SystemError};
pub use paths::PathTable;
pub use resources::Resources;
pub use sim_ecs::Phase;
pub use system::{FnSystem, System};
