//! Injectable random sources for Monte Carlo sampling

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform draws. Normal draws are derived with Box-Muller.
pub trait RandomSource {
    /// Uniform draw in (0, 1]
    fn next_uniform(&mut self) -> f64;

    /// Standard normal draw from two uniforms (Box-Muller, cosine branch)
    fn next_standard_normal(&mut self) -> f64 {
        let u1 = self.next_uniform();
        let u2 = self.next_uniform();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    fn next_normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        mean + std_dev * self.next_standard_normal()
    }
}

/// ChaCha-backed source; the same seed always yields the same sequence
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: ChaCha8Rng::from_entropy() }
    }

    /// Seeded when `seed` is set, entropy otherwise
    pub fn from_option(seed: Option<u64>) -> Self {
        seed.map(Self::new).unwrap_or_else(Self::from_entropy)
    }
}

impl RandomSource for SeededRandom {
    fn next_uniform(&mut self) -> f64 {
        // gen() is [0, 1); flip it so ln(u) is always finite
        1.0 - self.rng.gen::<f64>()
    }
}
