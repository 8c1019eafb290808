//! # sim_app
//!
//! Runs the sector simulation.
//!
//! - [`Sim`] owns the world, the shared resources and the running systems,
//!   and advances them one fixed-timestep tick at a time.
//! - [`orders`] is the per-entity order machine: planning orders into
//!   actions and driving those actions tick by tick.
//! - [`systems`] holds the gameplay systems, [`default_systems`] lists them
//!   in run order.
//! - [`factory`] builds sectors, ships and stations on an empty world.
//! - [`savefile`] reads and writes save documents.
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use sim_app::{Sim, factory};
//! use sim_ecs::World;
//! use sim_system::SimConfig;
//!
//! let config = SimConfig::default().with_seed(7);
//! let mut world = World::new();
//! factory::demo_universe(&mut world, &mut ChaCha8Rng::seed_from_u64(config.seed)).unwrap();
//!
//! let mut sim = Sim::with_default_systems(world, config);
//! for _ in 0..10 {
//!     sim.next(0.1).unwrap();
//! }
//! assert_eq!(sim.tick_id(), 10);
//! ```

pub mod factory;
pub mod orders;
pub mod registry;
pub mod savefile;
pub mod scheduler;
pub mod systems;
pub mod tick;

pub use registry::SystemRegistry;
pub use systems::default_systems;
pub use tick::{Sim, SimError, TickConfig};
