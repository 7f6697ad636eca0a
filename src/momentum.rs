//! This module implements some domain-specific 4-momentum handling logic.

use crate::numeric::Float;
use nalgebra::{SVector, Vector3};
use num_traits::Zero;
use prefix_num_ops::real::*;
use std::{
    fmt::{self, Display},
    iter::Sum,
    ops::{Add, AddAssign, Sub},
};

/// 4-momentum dimension
pub const MOMENTUM_DIM: usize = 4;

/// Raw storage of a relativistic 4-momentum
type Momentum = SVector<Float, MOMENTUM_DIM>;

/// Convenience const for accessing the X coordinate of a 4-vector
pub const X: usize = 0;

/// Convenience const for accessing the Y coordinate of a 4-vector
pub const Y: usize = 1;

/// Convenience const for accessing the Z coordinate of a 4-vector
pub const Z: usize = 2;

/// Convenience const for accessing the E coordinate of a 4-vector
pub const E: usize = 3;

/// Relativistic 4-momentum (px, py, pz, E), in GeV
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FourMomentum(Momentum);
//
impl FourMomentum {
    /// Build a 4-momentum from its components
    pub fn new(px: Float, py: Float, pz: Float, e: Float) -> Self {
        Self(Momentum::new(px, py, pz, e))
    }

    /// 4-momentum of something at rest with energy `e`
    ///
    /// This is how the total 4-momentum of a symmetric collider is described.
    ///
    pub fn at_rest(e: Float) -> Self {
        Self::new(0., 0., 0., e)
    }

    /// Build a 4-momentum from a 3-momentum and a mass hypothesis
    pub fn from_mass(p: [Float; 3], mass: Float) -> Self {
        let p = Vector3::from(p);
        let e = sqrt(p.norm_squared() + mass * mass);
        Self::new(p[X], p[Y], p[Z], e)
    }

    /// x component of the momentum
    pub fn px(&self) -> Float {
        self.0[X]
    }

    /// y component of the momentum
    pub fn py(&self) -> Float {
        self.0[Y]
    }

    /// z component of the momentum
    pub fn pz(&self) -> Float {
        self.0[Z]
    }

    /// Energy
    pub fn e(&self) -> Float {
        self.0[E]
    }

    /// Spatial part of the 4-momentum
    pub fn p3(&self) -> Vector3<Float> {
        self.0.fixed_rows::<3>(X).into_owned()
    }

    /// Norm of the 3-momentum
    pub fn p(&self) -> Float {
        self.p3().norm()
    }

    /// Transverse momentum with respect to the beam (z) axis
    pub fn pt(&self) -> Float {
        sqrt(self.px() * self.px() + self.py() * self.py())
    }

    /// Minkowski square E² - |p|²
    pub fn mass_squared(&self) -> Float {
        self.e() * self.e() - self.p3().norm_squared()
    }

    /// Invariant mass √(E² - |p|²)
    ///
    /// Space-like vectors get a negative mass -√(|p|² - E²), following the
    /// ROOT convention, so that resolution effects stay visible in histograms
    /// instead of being folded into NaN.
    ///
    pub fn mass(&self) -> Float {
        let m2 = self.mass_squared();
        if m2 < 0. {
            -sqrt(-m2)
        } else {
            sqrt(m2)
        }
    }

    /// Velocity of the frame in which this 4-momentum is at rest
    pub fn beta(&self) -> Vector3<Float> {
        self.p3() / self.e()
    }

    /// Apply a Lorentz boost of velocity `beta`
    pub fn boost(&self, beta: &Vector3<Float>) -> Self {
        let b2 = beta.norm_squared();
        debug_assert!(b2 < 1., "Boost velocity must be smaller than c");
        let gamma = 1. / sqrt(1. - b2);
        let bp = beta.dot(&self.p3());
        let gamma2 = if b2 > 0. { (gamma - 1.) / b2 } else { 0. };
        let p = self.p3() + beta * (gamma2 * bp + gamma * self.e());
        Self::new(p[X], p[Y], p[Z], gamma * (self.e() + bp))
    }
}

impl Add for FourMomentum {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for FourMomentum {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for FourMomentum {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Zero for FourMomentum {
    fn zero() -> Self {
        Self(Momentum::zeros())
    }

    fn is_zero(&self) -> bool {
        self.0.iter().all(Zero::is_zero)
    }
}

impl Sum for FourMomentum {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, p| acc + p)
    }
}

impl Display for FourMomentum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(px={}, py={}, pz={}, E={})",
            self.px(),
            self.py(),
            self.pz(),
            self.e()
        )
    }
}

/// Invariant mass of a composite made of the given 4-momenta
pub fn invariant_mass(constituents: impl IntoIterator<Item = FourMomentum>) -> Float {
    constituents.into_iter().sum::<FourMomentum>().mass()
}

/// Mass of whatever recoils against `composite` given the `total` 4-momentum
pub fn recoil_mass(total: FourMomentum, composite: FourMomentum) -> Float {
    (total - composite).mass()
}
