//! Phase plan: which systems run in which phase, in what order.
//!
//! Every tick passes through the phases `start → update → cleanup → end`.
//! A system runs in each phase it names, and within a phase systems run in
//! registration order. The plan is recomputed only when the set of systems
//! changes.

use sim_ecs::Phase;
use sim_system::System;

/// The systems that run in one phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub phase: Phase,
    /// Indices into the registry's system list.
    pub system_indices: Vec<usize>,
}

/// One stage per phase, in phase order. Phases nobody runs in still get an
/// (empty) stage, since the phase itself is announced on the change bus.
#[must_use]
pub fn compute_stages(systems: &[Box<dyn System>]) -> Vec<Stage> {
    Phase::ALL
        .iter()
        .map(|phase| Stage {
            phase: *phase,
            system_indices: systems
                .iter()
                .enumerate()
                .filter(|(_, system)| system.phases().contains(phase))
                .map(|(index, _)| index)
                .collect(),
        })
        .collect()
}
