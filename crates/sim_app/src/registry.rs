//! System registry: the running systems, in registration order.
//!
//! Registration order is execution order within a phase. A system joins
//! through [`SystemRegistry::add`], which calls its `apply`, and leaves
//! through [`SystemRegistry::remove`], which calls its `destroy`.

use std::collections::BTreeMap;

use sim_ecs::{Cooldowns, World};
use sim_system::System;

/// The systems of one simulation.
#[derive(Default)]
pub struct SystemRegistry {
    systems: Vec<Box<dyn System>>,
}

impl SystemRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    /// Add a system behind the existing ones and let it hook into `world`.
    ///
    /// Returns `false`, leaving the registry unchanged, if a system with the
    /// same name is already running.
    pub fn add(&mut self, mut system: Box<dyn System>, world: &mut World) -> bool {
        if self.get(system.name()).is_some() {
            tracing::warn!(system = system.name(), "system already registered");
            return false;
        }
        system.apply(world);
        tracing::info!(system = system.name(), position = self.systems.len(), "system added");
        self.systems.push(system);
        true
    }

    /// Remove the system named `name`.
    ///
    /// Returns `true` if the system was found and removed.
    pub fn remove(&mut self, name: &str, world: &mut World) -> bool {
        let Some(pos) = self.systems.iter().position(|s| s.name() == name) else {
            return false;
        };
        let mut system = self.systems.remove(pos);
        system.destroy(world);
        tracing::info!(system = name, "system removed");
        true
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn System> {
        self.systems
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }

    /// System names in execution order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.systems.iter().map(|s| s.name())
    }

    pub(crate) fn systems(&self) -> &[Box<dyn System>] {
        &self.systems
    }

    pub(crate) fn system_mut(&mut self, index: usize) -> Option<&mut Box<dyn System>> {
        self.systems.get_mut(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Run every system's own timers down by `delta` seconds.
    pub fn update_cooldowns(&mut self, delta: f64) {
        for system in &mut self.systems {
            if let Some(cooldowns) = system.cooldowns_mut() {
                cooldowns.update(delta);
            }
        }
    }

    /// Timers of every system that keeps any, by system name.
    #[must_use]
    pub fn export_cooldowns(&self) -> BTreeMap<String, Cooldowns> {
        self.systems
            .iter()
            .filter_map(|s| Some((s.name().to_string(), s.cooldowns()?.clone())))
            .collect()
    }

    /// Put saved timers back onto the systems they belong to. Timers of
    /// systems that are not running are ignored.
    pub fn import_cooldowns(&mut self, saved: &BTreeMap<String, Cooldowns>) {
        for system in &mut self.systems {
            let Some(timers) = saved.get(system.name()) else {
                continue;
            };
            if let Some(cooldowns) = system.cooldowns_mut() {
                *cooldowns = timers.clone();
            }
        }
    }
}

impl std::fmt::Debug for SystemRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
