//! Basic numerical concepts used throughout the crate

#![allow(missing_docs)]

// Floating-point precision is configured here
#[cfg(feature = "f32")]
pub type Float = f32;
#[cfg(feature = "f32")]
pub use std::f32 as reals;
#[cfg(not(feature = "f32"))]
pub type Float = f64;
#[cfg(not(feature = "f32"))]
pub use std::f64 as reals;

/// Mathematical functions
pub mod functions {
    /// Prefix versions of the real-number operations
    pub use prefix_num_ops::real::*;

    /// Compute the square of a number
    pub fn sqr(x: super::Float) -> super::Float {
        x * x
    }
}
