//! The system abstraction.

use sim_ecs::{Cooldowns, Phase, World};

use crate::context::SystemContext;
use crate::error::SystemError;

/// A unit of simulation logic run by the scheduler.
///
/// Lifecycle: [`apply`](System::apply) once when the system joins a running
/// simulation (register indices and observers there), then
/// [`exec`](System::exec) for each of its [`phases`](System::phases) every
/// tick, and finally [`destroy`](System::destroy) when it is removed.
pub trait System {
    /// Stable name, used for removal and for persisting cooldowns.
    fn name(&self) -> &str;

    /// Phases this system runs in.
    fn phases(&self) -> &[Phase] {
        &[Phase::Update]
    }

    fn apply(&mut self, _world: &mut World) {}

    /// Run one phase of one tick.
    ///
    /// # Errors
    ///
    /// Only for invariant violations; expected absence must be handled
    /// in place.
    fn exec(&mut self, phase: Phase, ctx: &mut SystemContext<'_>) -> Result<(), SystemError>;

    fn destroy(&mut self, _world: &mut World) {}

    /// This system's own timers, if it keeps any. The scheduler runs them
    /// down at the start of each tick and persists them in saves.
    fn cooldowns(&self) -> Option<&Cooldowns> {
        None
    }

    fn cooldowns_mut(&mut self) -> Option<&mut Cooldowns> {
        None
    }
}

type SystemFn = Box<dyn FnMut(&mut SystemContext<'_>) -> Result<(), SystemError>>;

/// A system made from a closure, run in a single phase.
pub struct FnSystem {
    name: String,
    phases: [Phase; 1],
    f: SystemFn,
}

impl FnSystem {
    /// Runs `f` in the update phase.
    pub fn new(
        name: impl Into<String>,
        f: impl FnMut(&mut SystemContext<'_>) -> Result<(), SystemError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            phases: [Phase::Update],
            f: Box::new(f),
        }
    }

    #[must_use]
    pub fn in_phase(mut self, phase: Phase) -> Self {
        self.phases = [phase];
        self
    }
}

impl System for FnSystem {
    fn name(&self) -> &str {
        &self.name
    }

    fn phases(&self) -> &[Phase] {
        &self.phases
    }

    fn exec(&mut self, _phase: Phase, ctx: &mut SystemContext<'_>) -> Result<(), SystemError> {
        (self.f)(ctx)
    }
}

impl std::fmt::Debug for FnSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSystem")
            .field("name", &self.name)
            .field("phases", &self.phases)
            .finish_non_exhaustive()
    }
}
