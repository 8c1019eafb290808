//! Entity store for the sector simulation.
//!
//! - [`World`] owns entities and performs every structural change.
//! - [`ChangeBus`] carries those changes, synchronously, to named observers.
//! - Cached indices (see [`World::register_index`]) stay in step with the bus.
//! - [`Cooldowns`] are the named timers entities and systems carry.

pub mod bus;
pub mod cooldown;
pub mod entity;
pub mod error;
pub mod index;
mod relations;
pub mod snapshot;
pub mod world;

pub use bus::{ChangeBus, ChangeEvent, Observer, Phase, SubscriberId};
pub use cooldown::Cooldowns;
pub use entity::Entity;
pub use error::{EcsError, Result};
pub use index::IndexHandle;
pub use snapshot::{EntitySnapshot, WorldSnapshot};
pub use world::World;
