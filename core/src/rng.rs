//! Deterministic random number generation.
//!
//! RULE: nothing in the library may call a platform RNG. All
//! randomness flows through `DetRng` streams derived from the
//! config's model seed, so a refit on the same corpus always builds
//! the same forest.
//!
//! Streams are derived from (seed, stream index) with a golden-ratio
//! multiply, so adding a new consumer never perturbs existing streams.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct DetRng {
    inner: Pcg64Mcg,
}

impl DetRng {
    /// Create a stream from the master seed and a stable stream index.
    /// The index must never change once assigned.
    pub fn new(seed: u64, stream: u64) -> Self {
        let derived = seed ^ stream.wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample from a simplified Pareto distribution.
    /// x_min: minimum value, alpha: shape (higher = less skewed).
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }
}
