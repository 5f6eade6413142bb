//! This module implements some domain-specific 4-momentum handling logic.
//!
//! Columnar record arrays live in the `record` module; the types here
//! describe a single record, as extracted by point lookups or produced by
//! scalar-side computations in tests and client code.

use crate::numeric::{functions::*, Float};
use nalgebra::SVector;
use std::ops::Add;

/// 4-momentum dimension
pub const MOMENTUM_DIM: usize = 4;

/// Relativistic 4-momentum
pub type Momentum = SVector<Float, MOMENTUM_DIM>;

/// Convenience const for accessing the X coordinate of a 4-vector
pub const X: usize = 0;

/// Convenience const for accessing the Y coordinate of a 4-vector
pub const Y: usize = 1;

/// Convenience const for accessing the Z coordinate of a 4-vector
pub const Z: usize = 2;

/// Convenience const for accessing the T coordinate of a 4-vector
pub const T: usize = 3;

/// A single reconstructed candidate: a 4-momentum plus an electric charge
///
/// Combining two candidates sums the momenta relativistically and the
/// charges arithmetically.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChargedMomentum {
    /// Relativistic 4-momentum
    pub momentum: Momentum,

    /// Electric charge, in units of the elementary charge
    pub charge: Float,
}
//
impl ChargedMomentum {
    /// Build a candidate from Cartesian momentum components and a charge
    pub fn new(x: Float, y: Float, z: Float, t: Float, charge: Float) -> Self {
        Self {
            momentum: Momentum::new(x, y, z, t),
            charge,
        }
    }

    /// Squared invariant mass, from the Minkowski metric
    pub fn mass2(&self) -> Float {
        let p = &self.momentum;
        sqr(p[T]) - sqr(p[X]) - sqr(p[Y]) - sqr(p[Z])
    }

    /// Invariant mass (NaN for space-like momenta)
    pub fn mass(&self) -> Float {
        sqrt(self.mass2())
    }

    /// Momentum component transverse to the beam axis
    pub fn pt(&self) -> Float {
        hypot(self.momentum[X], self.momentum[Y])
    }
}

impl Add for ChargedMomentum {
    type Output = Self;

    /// Compose two candidates, summing momenta and charges
    fn add(self, other: Self) -> Self {
        Self {
            momentum: self.momentum + other.momentum,
            charge: self.charge + other.charge,
        }
    }
}
