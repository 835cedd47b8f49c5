//! Deterministic PRNG used to scatter particles and pick their visual radii.
//!
//! A field built from the same seed always lands every particle in the same
//! place, which keeps snapshots and traces reproducible across runs and
//! platforms.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Xorshift64 deterministic PRNG. Same seed always produces the same sequence.
///
/// Uses the standard shift parameters (13, 7, 17). Seed of 0 is replaced
/// with a non-zero fallback to avoid the all-zeros fixed point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a new PRNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Advances the state and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Returns a uniformly distributed f64 in [0, 1) from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Returns a uniformly distributed f64 in [min, max).
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Returns a uniformly distributed f64 in [-half_extent, half_extent).
    pub fn next_signed(&mut self, half_extent: f64) -> f64 {
        (self.next_f64() * 2.0 - 1.0) * half_extent
    }

    /// Draws x, y and z independently from [-half_extent, half_extent).
    pub fn next_in_cube(&mut self, half_extent: f64) -> DVec3 {
        let x = self.next_signed(half_extent);
        let y = self.next_signed(half_extent);
        let z = self.next_signed(half_extent);
        DVec3::new(x, y, z)
    }
}
