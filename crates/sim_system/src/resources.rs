//! State shared by all systems that is not attached to any entity.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::SimConfig;
use crate::paths::PathTable;

/// Global simulation state.
///
/// The random generator is the only source of randomness systems may use;
/// it is persisted with the save so a resumed run continues the same
/// sequence.
#[derive(Debug, Clone)]
pub struct Resources {
    pub config: SimConfig,
    pub rng: ChaCha8Rng,
    /// Rebuilt by the path-planning system; never persisted.
    pub paths: PathTable,
}

impl Resources {
    pub fn new(config: SimConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            rng,
            paths: PathTable::default(),
        }
    }

    /// Resume with a generator restored from a save.
    pub fn with_rng(config: SimConfig, rng: ChaCha8Rng) -> Self {
        Self {
            config,
            rng,
            paths: PathTable::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Resources::new(SimConfig::default().with_seed(9));
        let mut b = Resources::new(SimConfig::default().with_seed(9));
        let xs: Vec<u32> = (0..8).map(|_| a.rng.r#gen()).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.rng.r#gen()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_rng_survives_serialization() {
        let mut res = Resources::new(SimConfig::default());
        let _: u64 = res.rng.r#gen();
        let json = serde_json::to_string(&res.rng).unwrap();
        let mut restored: ChaCha8Rng = serde_json::from_str(&json).unwrap();
        assert_eq!(res.rng.r#gen::<u64>(), restored.r#gen::<u64>());
    }
}
