//! The save document.

use std::collections::BTreeMap;

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sim_ecs::{Cooldowns, WorldSnapshot};

use crate::error::SaveError;

/// Version written by this build. Bump on any incompatible layout change.
pub const SAVE_VERSION: u32 = 1;

/// Everything needed to resume a simulation between two ticks.
///
/// Derived state (capability masks, index membership, the path table) is
/// deliberately absent; it is rebuilt on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveDocument {
    pub version: u32,
    /// Id of the last completed tick.
    pub tick_id: u64,
    /// Simulated seconds so far.
    pub elapsed: f64,
    pub rng: ChaCha8Rng,
    pub world: WorldSnapshot,
    /// System name -> that system's timers.
    #[serde(default)]
    pub systems: BTreeMap<String, Cooldowns>,
}

impl SaveDocument {
    pub fn new(tick_id: u64, elapsed: f64, rng: ChaCha8Rng, world: WorldSnapshot) -> Self {
        Self {
            version: SAVE_VERSION,
            tick_id,
            elapsed,
            rng,
            world,
            systems: BTreeMap::new(),
        }
    }

    /// Fails for documents from another version.
    pub fn check_version(&self) -> Result<(), SaveError> {
        check_version(self.version)
    }
}

/// Leading part of any document, read before committing to the full layout.
#[derive(Debug, Deserialize)]
pub(crate) struct VersionHeader {
    pub version: u32,
}

pub(crate) fn check_version(found: u32) -> Result<(), SaveError> {
    if found == SAVE_VERSION {
        Ok(())
    } else {
        Err(SaveError::UnsupportedVersion {
            found,
            expected: SAVE_VERSION,
        })
    }
}
