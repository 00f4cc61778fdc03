//! Random source capability
//!
//! The simulation only needs one operation from its randomness provider: a uniform
//! draw in `[low, high)`. Any `rand::Rng` satisfies it, and tests can substitute a
//! scripted sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform random values
pub trait RandomSource {
    /// Uniform value in `[low, high)`. Returns `low` when the range is empty.
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    #[inline]
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high > low {
            self.random_range(low..high)
        } else {
            low
        }
    }
}

/// Default seedable generator used by [`crate::Simulation`]
pub type SeededRandom = StdRng;

/// Create a deterministic generator from a 64-bit seed
pub fn seeded(seed: u64) -> SeededRandom {
    StdRng::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_within_range() {
        let mut rng = seeded(7);
        for _ in 0..1000 {
            let v = rng.uniform(-0.5, 0.5);
            assert!((-0.5..0.5).contains(&v), "{v} out of range");
        }
    }

    #[test]
    fn test_empty_range_returns_low() {
        let mut rng = seeded(7);
        assert_eq!(rng.uniform(0.0, 0.0), 0.0);
        assert_eq!(rng.uniform(3.0, 1.0), 3.0);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        for _ in 0..32 {
            assert_eq!(a.uniform(0.0, 10.0).to_bits(), b.uniform(0.0, 10.0).to_bits());
        }
    }
}
