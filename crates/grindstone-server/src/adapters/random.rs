//! rand-backed random source

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use grindstone::RandomSource;

/// Uniform draws from a `StdRng`
pub struct RngSource {
    rng: Mutex<StdRng>,
}

impl RngSource {
    /// Seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence for tests and replays
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = match self.rng.lock() {
            Ok(rng) => rng,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut rng)
    }
}

impl Default for RngSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for RngSource {
    fn range_inclusive(&self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        self.with_rng(|rng| rng.gen_range(low..=high))
    }

    fn chance(&self, p: f64) -> bool {
        let p = p.clamp(0.0, 1.0);
        self.with_rng(|rng| rng.gen_bool(p))
    }
}
