//! Per-tick execution context handed to systems.

use sim_ecs::World;

use crate::resources::Resources;
use crate::system::System;

/// Deferred changes to the set of running systems.
///
/// Systems queue additions and removals here mid-tick; the scheduler
/// applies removals, then additions, once every phase has run.
#[derive(Default)]
pub struct SystemQueue {
    additions: Vec<Box<dyn System>>,
    removals: Vec<String>,
}

impl SystemQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a system to start running from the next tick.
    pub fn add(&mut self, system: Box<dyn System>) {
        self.additions.push(system);
    }

    /// Queue the system named `name` for removal after this tick.
    pub fn remove(&mut self, name: impl Into<String>) {
        self.removals.push(name.into());
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    pub fn take_removals(&mut self) -> Vec<String> {
        std::mem::take(&mut self.removals)
    }

    pub fn take_additions(&mut self) -> Vec<Box<dyn System>> {
        std::mem::take(&mut self.additions)
    }
}

impl std::fmt::Debug for SystemQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemQueue")
            .field(
                "additions",
                &self.additions.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("removals", &self.removals)
            .finish()
    }
}

/// Context provided to a system on each phase of a tick.
pub struct SystemContext<'a> {
    /// The current tick id.
    pub tick_id: u64,
    /// Seconds simulated by this tick.
    pub dt: f64,
    /// Simulated seconds since the start of the run, before this tick.
    pub elapsed: f64,
    pub world: &'a mut World,
    pub resources: &'a mut Resources,
    pub queue: &'a mut SystemQueue,
}

impl<'a> SystemContext<'a> {
    pub fn new(
        tick_id: u64,
        dt: f64,
        elapsed: f64,
        world: &'a mut World,
        resources: &'a mut Resources,
        queue: &'a mut SystemQueue,
    ) -> Self {
        Self {
            tick_id,
            dt,
            elapsed,
            world,
            resources,
            queue,
        }
    }
}
