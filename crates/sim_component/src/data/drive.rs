//! Propulsion and its small state machine.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Targets further away than this (world units) are worth warming up the
/// cruise engines for.
pub const CRUISE_DISTANCE: f32 = 5.0;

/// Engine state: `maneuver → warming → cruise`, back to `maneuver` on
/// approach or when the target is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DriveState {
    /// Short-range movement at maneuvering speed.
    #[default]
    Maneuver,
    /// Cruise engines spooling up; still moving at maneuvering speed.
    Warming,
    /// Long-range movement at cruise speed.
    Cruise,
}

/// How the drive treats its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DriveMode {
    /// Approach and stop within `minimal_distance`.
    #[default]
    Goto,
    /// Keep station within `minimal_distance`, never "arrive".
    Follow,
    /// Make attack passes: approach, overshoot, come around.
    Flyby,
}

/// Propulsion state for a movable entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drive {
    /// Maneuvering speed, world units per second.
    pub maneuver_speed: f32,
    /// Cruise speed, world units per second.
    pub cruise_speed: f32,
    /// Seconds needed to warm up from maneuver to cruise.
    pub ttc: f32,
    /// Current engine state.
    pub state: DriveState,
    /// Seconds of warm-up left while `Warming`.
    pub warm_up: f32,
    /// The entity being approached.
    pub target: Option<EntityId>,
    /// How the target is approached.
    pub mode: DriveMode,
    /// Arrival radius around the target.
    pub minimal_distance: f32,
    /// Seconds left on the current flyby overshoot.
    pub flyby_timer: f32,
}

impl Drive {
    /// Create an idle drive.
    #[must_use]
    pub fn new(maneuver_speed: f32, cruise_speed: f32, ttc: f32) -> Self {
        Self {
            maneuver_speed,
            cruise_speed,
            ttc,
            state: DriveState::Maneuver,
            warm_up: 0.0,
            target: None,
            mode: DriveMode::Goto,
            minimal_distance: 0.1,
            flyby_timer: 0.0,
        }
    }

    /// Point the drive at `target`. Re-setting the same target and mode keeps
    /// the engine state so per-tick callers do not reset warm-up.
    pub fn set_target(&mut self, target: EntityId, mode: DriveMode, minimal_distance: f32) {
        if self.target != Some(target) || self.mode != mode {
            self.state = DriveState::Maneuver;
            self.warm_up = 0.0;
            self.flyby_timer = 0.0;
        }
        self.target = Some(target);
        self.mode = mode;
        self.minimal_distance = minimal_distance;
    }

    /// Stop and drop back to maneuvering.
    pub fn clear_target(&mut self) {
        self.target = None;
        self.mode = DriveMode::Goto;
        self.state = DriveState::Maneuver;
        self.warm_up = 0.0;
        self.flyby_timer = 0.0;
    }

    /// Current speed for the engine state.
    #[must_use]
    pub fn speed(&self) -> f32 {
        match self.state {
            DriveState::Cruise => self.cruise_speed,
            DriveState::Maneuver | DriveState::Warming => self.maneuver_speed,
        }
    }

    /// Advance the engine state machine for a target `distance` away.
    pub fn update_state(&mut self, distance: f32, dt: f32) {
        let far = distance > CRUISE_DISTANCE && self.mode != DriveMode::Flyby;
        self.state = match (self.state, far) {
            (_, false) => {
                self.warm_up = 0.0;
                DriveState::Maneuver
            }
            (DriveState::Maneuver, true) => {
                self.warm_up = self.ttc;
                DriveState::Warming
            }
            (DriveState::Warming, true) => {
                self.warm_up -= dt;
                if self.warm_up <= 0.0 {
                    self.warm_up = 0.0;
                    DriveState::Cruise
                } else {
                    DriveState::Warming
                }
            }
            (DriveState::Cruise, true) => DriveState::Cruise,
        };
    }
}
