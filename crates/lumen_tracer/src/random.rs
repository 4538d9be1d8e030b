//! Random sampling for ray tracing.
//!
//! A [`RandomSource`] is created once per render driver (or once per test) and
//! passed explicitly to every function that samples. Parallel renders fork one
//! child source per work item so no generator is ever shared between threads.

use lumen_math::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::f32::consts::TAU;

/// Vectors shorter than this are rejected by [`RandomSource::in_unit_sphere`]
/// so that normalizing the result is always well defined.
const MIN_SAMPLE_LENGTH_SQUARED: f32 = 1e-8;

/// Seedable uniform random source.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    /// Create a source with a fixed seed, for reproducible renders and tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a source seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Restart the stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Derive an independent child source.
    ///
    /// The child's seed is drawn from this source, so a sequence of forks is
    /// deterministic whenever the parent was seeded.
    pub fn fork(&mut self) -> RandomSource {
        RandomSource::seeded(self.rng.next_u64())
    }

    /// Uniform real in `[0, 1)`.
    #[inline]
    pub fn real(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Uniform real in `[min, max)`. An empty range yields `min`.
    #[inline]
    pub fn uniform_real(&mut self, min: f32, max: f32) -> f32 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Uniform integer in `[min, max]` (both inclusive). An empty range yields `min`.
    pub fn uniform_int(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Fair coin flip.
    pub fn bool(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    /// Vector with each component uniform in `[min, max)`.
    pub fn uniform_vec3(&mut self, min: Vec3, max: Vec3) -> Vec3 {
        Vec3::new(
            self.uniform_real(min.x, max.x),
            self.uniform_real(min.y, max.y),
            self.uniform_real(min.z, max.z),
        )
    }

    /// Point on the unit circle.
    pub fn on_unit_circle(&mut self) -> Vec2 {
        let angle = self.uniform_real(0.0, TAU);
        Vec2::new(angle.cos(), angle.sin())
    }

    /// Point inside the unit ball, by rejection sampling the enclosing cube.
    ///
    /// Each trial is accepted with probability pi/6, so about 1.9 trials are
    /// needed on average.
    pub fn in_unit_sphere(&mut self) -> Vec3 {
        loop {
            let v = self.uniform_vec3(Vec3::splat(-1.0), Vec3::ONE);
            let len_sq = v.length_squared();
            if len_sq > MIN_SAMPLE_LENGTH_SQUARED && len_sq <= 1.0 {
                return v;
            }
        }
    }

    /// Unit vector uniformly distributed over the sphere.
    pub fn on_unit_sphere(&mut self) -> Vec3 {
        self.in_unit_sphere().normalize()
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_real_range() {
        let mut rng = RandomSource::seeded(7);
        for _ in 0..10_000 {
            let x = rng.uniform_real(0.0, 1.0);
            assert!((0.0..1.0).contains(&x), "{x} outside [0, 1)");
        }
    }

    #[test]
    fn test_uniform_real_empty_range() {
        let mut rng = RandomSource::seeded(7);
        assert_eq!(rng.uniform_real(2.0, 2.0), 2.0);
    }

    #[test]
    fn test_uniform_int_inclusive() {
        let mut rng = RandomSource::seeded(11);
        let mut seen = [false; 3];
        for _ in 0..1_000 {
            let x = rng.uniform_int(-1, 1);
            assert!((-1..=1).contains(&x));
            seen[(x + 1) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s), "both endpoints should be drawn");
    }

    #[test]
    fn test_on_unit_sphere_length() {
        let mut rng = RandomSource::seeded(3);
        for _ in 0..10_000 {
            let v = rng.on_unit_sphere();
            assert!((v.length() - 1.0).abs() < 1e-4, "length {}", v.length());
        }
    }

    #[test]
    fn test_on_unit_sphere_is_centered() {
        // The mean of a uniform distribution over the sphere is the origin
        let mut rng = RandomSource::seeded(5);
        let n = 20_000;
        let mut sum = Vec3::ZERO;
        for _ in 0..n {
            sum += rng.on_unit_sphere();
        }
        let mean = sum / n as f32;
        assert!(mean.length() < 0.05, "mean {mean:?}");
    }

    #[test]
    fn test_in_unit_sphere_bounds() {
        let mut rng = RandomSource::seeded(9);
        for _ in 0..1_000 {
            assert!(rng.in_unit_sphere().length_squared() <= 1.0);
        }
    }

    #[test]
    fn test_uniform_vec3_componentwise() {
        let mut rng = RandomSource::seeded(13);
        let min = Vec3::new(-3.0, 0.0, 10.0);
        let max = Vec3::new(3.0, 1.0, 11.0);
        for _ in 0..1_000 {
            let v = rng.uniform_vec3(min, max);
            assert!(v.cmpge(min).all() && v.cmplt(max).all(), "{v:?}");
        }
    }

    #[test]
    fn test_on_unit_circle_length() {
        let mut rng = RandomSource::seeded(17);
        for _ in 0..1_000 {
            assert!((rng.on_unit_circle().length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = RandomSource::seeded(42);
        let mut b = RandomSource::seeded(42);
        for _ in 0..100 {
            assert_eq!(a.real(), b.real());
        }

        a.reseed(1);
        b.reseed(1);
        assert_eq!(a.on_unit_sphere(), b.on_unit_sphere());
    }

    #[test]
    fn test_fork_is_deterministic() {
        let mut parent_a = RandomSource::seeded(99);
        let mut parent_b = RandomSource::seeded(99);
        let mut child_a = parent_a.fork();
        let mut child_b = parent_b.fork();
        assert_eq!(child_a.real(), child_b.real());

        // A second fork draws a different seed
        let mut sibling = parent_a.fork();
        let mut child_c = RandomSource::seeded(99).fork();
        assert_ne!(sibling.real(), child_c.real());
    }

    #[test]
    fn test_bool_draws_both_sides() {
        let mut rng = RandomSource::seeded(21);
        let heads = (0..1_000).filter(|_| rng.bool()).count();
        // Fair coin: both outcomes show up, roughly evenly
        assert!((400..=600).contains(&heads), "{heads} heads in 1000 flips");
    }
}
