//! The simulation and its fixed-timestep tick loop.
//!
//! One call to [`Sim::next`] is one tick:
//!
//! 1. Advance the tick counter and run system timers down.
//! 2. For each phase (`start`, `update`, `cleanup`, `end`): announce the
//!    phase on the change bus, then run that phase's systems in
//!    registration order.
//! 3. Apply queued system removals, then queued additions.
//! 4. Advance the simulation clock.
//!
//! Nothing in a tick reads the wall clock; with the same starting state and
//! the same sequence of deltas two runs end in identical states.

use std::time::{Duration, Instant};

use sim_ecs::{EcsError, World};
use sim_save::{SaveDocument, SaveError};
use sim_system::{PathTable, Resources, SimConfig, System, SystemContext, SystemError, SystemQueue};
use tracing::{debug, info, warn};

use crate::registry::SystemRegistry;
use crate::scheduler::{self, Stage};
use crate::systems;

/// Errors that end a simulation session.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    System(#[from] SystemError),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error(transparent)]
    Ecs(#[from] EcsError),

    #[error("save file: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration for the tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target ticks per second; each tick simulates `1 / tick_rate` seconds.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
    /// Pace ticks against the wall clock instead of running flat out.
    pub realtime: bool,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 10.0,
            max_ticks: 0,
            realtime: false,
        }
    }
}

/// A running simulation: the world, shared resources and the systems
/// acting on them.
#[derive(Debug)]
pub struct Sim {
    /// Id of the last completed tick.
    tick_id: u64,
    /// Simulated seconds so far.
    elapsed: f64,
    world: World,
    resources: Resources,
    registry: SystemRegistry,
    queue: SystemQueue,
    /// Phase plan (recomputed when the system set changes).
    stages: Vec<Stage>,
    stages_dirty: bool,
}

impl Sim {
    /// A simulation over `world` with no systems.
    #[must_use]
    pub fn new(world: World, config: SimConfig) -> Self {
        Self::with_resources(world, Resources::new(config))
    }

    /// A simulation over `world` running every gameplay system.
    #[must_use]
    pub fn with_default_systems(world: World, config: SimConfig) -> Self {
        let mut sim = Self::new(world, config);
        for system in systems::default_systems() {
            sim.add_system(system);
        }
        sim
    }

    fn with_resources(world: World, resources: Resources) -> Self {
        Self {
            tick_id: 0,
            elapsed: 0.0,
            world,
            resources,
            registry: SystemRegistry::new(),
            queue: SystemQueue::new(),
            stages: Vec::new(),
            stages_dirty: true,
        }
    }

    /// Add a system right away. From inside a tick, systems use the
    /// [`SystemQueue`] instead.
    pub fn add_system(&mut self, system: Box<dyn System>) -> bool {
        let added = self.registry.add(system, &mut self.world);
        self.stages_dirty |= added;
        added
    }

    pub fn remove_system(&mut self, name: &str) -> bool {
        let removed = self.registry.remove(name, &mut self.world);
        self.stages_dirty |= removed;
        removed
    }

    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[must_use]
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    #[must_use]
    pub fn registry(&self) -> &SystemRegistry {
        &self.registry
    }

    /// The phase plan, recomputing if necessary.
    pub fn stages(&mut self) -> &[Stage] {
        if self.stages_dirty {
            self.recompute_stages();
        }
        &self.stages
    }

    fn recompute_stages(&mut self) {
        self.stages = scheduler::compute_stages(self.registry.systems());
        self.stages_dirty = false;
        debug!(
            tick_id = self.tick_id,
            system_count = self.registry.len(),
            "recomputed phase plan"
        );
    }

    /// Run one tick simulating `delta` seconds.
    ///
    /// # Errors
    ///
    /// Any system error. The world may be partway through the tick and the
    /// session should not continue.
    pub fn next(&mut self, delta: f64) -> Result<(), SimError> {
        self.tick_id += 1;
        self.registry.update_cooldowns(delta);
        if self.stages_dirty {
            self.recompute_stages();
        }

        for stage in &self.stages {
            self.world.publish_phase(stage.phase, self.tick_id);
            for &index in &stage.system_indices {
                let Some(system) = self.registry.system_mut(index) else {
                    continue;
                };
                let mut ctx = SystemContext::new(
                    self.tick_id,
                    delta,
                    self.elapsed,
                    &mut self.world,
                    &mut self.resources,
                    &mut self.queue,
                );
                system.exec(stage.phase, &mut ctx)?;
            }
        }

        for name in self.queue.take_removals() {
            self.stages_dirty |= self.registry.remove(&name, &mut self.world);
        }
        for system in self.queue.take_additions() {
            self.stages_dirty |= self.registry.add(system, &mut self.world);
        }

        self.elapsed += delta;
        Ok(())
    }

    /// Run ticks of `1 / tick_rate` seconds until `max_ticks` have run.
    /// Returns the number of ticks run.
    ///
    /// # Errors
    ///
    /// The first tick error; the loop stops there.
    pub fn run(&mut self, config: &TickConfig) -> Result<u64, SimError> {
        let tick_duration = Duration::from_secs_f64(1.0 / config.tick_rate);
        let delta = tick_duration.as_secs_f64();
        let mut tick_count = 0u64;

        info!(
            tick_rate = config.tick_rate,
            max_ticks = config.max_ticks,
            realtime = config.realtime,
            "starting tick loop"
        );

        loop {
            let start = Instant::now();
            self.next(delta)?;

            tick_count += 1;
            if config.max_ticks > 0 && tick_count >= config.max_ticks {
                info!(ticks = tick_count, tick_id = self.tick_id, "tick loop complete");
                return Ok(tick_count);
            }

            if !config.realtime {
                continue;
            }
            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
    }

    /// Capture the state between two ticks.
    #[must_use]
    pub fn save(&self) -> SaveDocument {
        let mut doc = SaveDocument::new(
            self.tick_id,
            self.elapsed,
            self.resources.rng.clone(),
            self.world.snapshot(),
        );
        doc.systems = self.registry.export_cooldowns();
        doc
    }

    /// Resume from a save with every gameplay system running.
    ///
    /// # Errors
    ///
    /// [`SaveError::UnsupportedVersion`] for documents from another version,
    /// [`EcsError`] if the stored entities are inconsistent.
    pub fn load(doc: SaveDocument, config: SimConfig) -> Result<Self, SimError> {
        Self::load_with(doc, config, systems::default_systems())
    }

    /// Resume from a save running `systems`.
    ///
    /// # Errors
    ///
    /// As [`Sim::load`].
    pub fn load_with(
        doc: SaveDocument,
        config: SimConfig,
        systems: Vec<Box<dyn System>>,
    ) -> Result<Self, SimError> {
        doc.check_version()?;
        let world = World::restore(doc.world)?;
        let mut resources = Resources::with_rng(config, doc.rng);
        resources.paths = PathTable::from_world(&world);

        let mut sim = Self::with_resources(world, resources);
        sim.tick_id = doc.tick_id;
        sim.elapsed = doc.elapsed;
        for system in systems {
            sim.add_system(system);
        }
        sim.registry.import_cooldowns(&doc.systems);
        info!(tick_id = sim.tick_id, entities = sim.world.len(), "simulation resumed");
        Ok(sim)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use sim_ecs::{ChangeEvent, Phase, SubscriberId};
    use sim_system::FnSystem;

    use super::*;

    fn recorder(log: &Rc<RefCell<Vec<String>>>, name: &'static str, phase: Phase) -> Box<dyn System> {
        let log = Rc::clone(log);
        Box::new(
            FnSystem::new(name, move |ctx| {
                log.borrow_mut().push(format!("{name}@{}", ctx.tick_id));
                Ok(())
            })
            .in_phase(phase),
        )
    }

    #[test]
    fn test_tick_advances_counter_and_clock() {
        let mut sim = Sim::new(World::new(), SimConfig::default());
        assert_eq!(sim.tick_id(), 0);
        sim.next(0.5).unwrap();
        sim.next(0.25).unwrap();
        assert_eq!(sim.tick_id(), 2);
        assert!((sim.elapsed() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_phases_run_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sim = Sim::new(World::new(), SimConfig::default());
        sim.add_system(recorder(&log, "end", Phase::End));
        sim.add_system(recorder(&log, "update", Phase::Update));
        sim.add_system(recorder(&log, "start", Phase::Start));
        sim.add_system(recorder(&log, "cleanup", Phase::Cleanup));

        sim.next(0.1).unwrap();
        assert_eq!(*log.borrow(), vec!["start@1", "update@1", "cleanup@1", "end@1"]);
    }

    #[test]
    fn test_phase_events_published() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut sim = Sim::new(World::new(), SimConfig::default());
        let sink = Rc::clone(&seen);
        sim.world_mut().subscribe(
            SubscriberId("phases"),
            Box::new(move |event| {
                if let ChangeEvent::Phase { phase, tick_id } = event {
                    sink.borrow_mut().push((*phase, *tick_id));
                }
            }),
        );
        sim.next(0.1).unwrap();
        assert_eq!(
            *seen.borrow(),
            Phase::ALL.iter().map(|p| (*p, 1)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_queued_changes_apply_after_tick() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sim = Sim::new(World::new(), SimConfig::default());
        let late = Rc::clone(&log);
        sim.add_system(Box::new(FnSystem::new("spawner", move |ctx| {
            if ctx.tick_id == 1 {
                ctx.queue.add(recorder(&late, "late", Phase::Update));
                ctx.queue.remove("spawner");
            }
            Ok(())
        })));

        sim.next(0.1).unwrap();
        assert!(log.borrow().is_empty(), "added system waits for the next tick");
        assert_eq!(sim.registry().names().collect::<Vec<_>>(), vec!["late"]);

        sim.next(0.1).unwrap();
        assert_eq!(*log.borrow(), vec!["late@2"]);
    }

    #[test]
    fn test_system_error_propagates() {
        let mut sim = Sim::new(World::new(), SimConfig::default());
        sim.add_system(Box::new(FnSystem::new("broken", |_| {
            Err(SystemError::invalid("broken", "always fails"))
        })));
        assert!(matches!(sim.next(0.1), Err(SimError::System(_))));
    }

    #[test]
    fn test_run_limited_ticks() {
        let mut sim = Sim::new(World::new(), SimConfig::default());
        let config = TickConfig {
            tick_rate: 1000.0,
            max_ticks: 5,
            realtime: false,
        };
        assert_eq!(sim.run(&config).unwrap(), 5);
        assert_eq!(sim.tick_id(), 5);
    }

    #[test]
    fn test_load_rejects_unknown_version() {
        let sim = Sim::new(World::new(), SimConfig::default());
        let mut doc = sim.save();
        doc.version += 1;
        assert!(matches!(
            Sim::load(doc, SimConfig::default()),
            Err(SimError::Save(SaveError::UnsupportedVersion { .. }))
        ));
    }
}
