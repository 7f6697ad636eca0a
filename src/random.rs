//! Random number generation, on top of the "rand" crate

use crate::numeric::{floats::consts::PI, Float};
use nalgebra::Vector3;
use prefix_num_ops::real::*;
use rand::{Rng, SeedableRng};

// Select random number generation engine in use
#[cfg(feature = "f32")]
type Engine = rand_xoshiro::Xoshiro128Plus;
#[cfg(not(feature = "f32"))]
type Engine = rand_xoshiro::Xoshiro256Plus;

/// Seeded random number generator, so that event samples are reproducible
#[derive(Clone)]
pub struct RandomGenerator {
    rng: Engine,
}
//
impl RandomGenerator {
    /// Spawn a new random number generator
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Engine::seed_from_u64(seed),
        }
    }

    /// Generate a random floating-point number between 0 and 1
    pub fn random(&mut self) -> Float {
        self.rng.gen()
    }

    /// Generate a unit vector with uniformly distributed direction
    pub fn direction(&mut self) -> Vector3<Float> {
        let cos_theta = 2. * self.random() - 1.;
        let phi = 2. * PI * self.random();
        let sin_theta = sqrt((1. - cos_theta * cos_theta).max(0.));
        Vector3::new(sin_theta * cos(phi), sin_theta * sin(phi), cos_theta)
    }
}
