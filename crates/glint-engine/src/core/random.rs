//! Random sources for variance, flicker, clustering and physics seeding.
//!
//! Everything that draws randomness takes a `&mut dyn RandomSource`, so tests
//! can pass a seeded [`Rng`] while hosts use [`SystemRandom`].

use glam::Vec3;

/// Anything that yields uniform floats in `[0, 1)`.
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    /// Uniform sample in `[min, max)`.
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }

    /// Uniform sample in `[-1, 1)`.
    fn signed(&mut self) -> f32 {
        self.next_f32() * 2.0 - 1.0
    }

    /// Uniform index in `[0, len)`. Returns 0 for an empty range.
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f32() * len as f32) as usize).min(len - 1)
    }

    /// Uniformly distributed direction on the unit sphere.
    fn unit_vector(&mut self) -> Vec3 {
        let z = self.signed();
        let theta = self.next_f32() * std::f32::consts::TAU;
        let r = (1.0 - z * z).max(0.0).sqrt();
        Vec3::new(r * theta.cos(), z, r * theta.sin())
    }
}

/// Seedable pseudo-random number generator (xorshift64).
/// Deterministic and fast; the same seed always replays the same batch.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Rng {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl RandomSource for Rng {
    fn next_f32(&mut self) -> f32 {
        // Top 24 bits give an exactly representable f32 in [0, 1).
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

/// Production random source backed by the thread-local `rand` generator.
pub struct SystemRandom(rand::rngs::ThreadRng);

impl std::fmt::Debug for SystemRandom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SystemRandom")
    }
}

impl SystemRandom {
    pub fn new() -> Self {
        Self(rand::rng())
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SystemRandom {
    fn next_f32(&mut self) -> f32 {
        use rand::Rng as _;
        self.0.random::<f32>()
    }
}

/// Always returns the same value. Handy for pinning variance in tests.
#[derive(Debug, Clone, Copy)]
pub struct ConstantRandom(pub f32);

impl RandomSource for ConstantRandom {
    fn next_f32(&mut self) -> f32 {
        self.0.clamp(0.0, 0.999_999)
    }
}
