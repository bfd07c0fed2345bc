//! Type definitions and aliases for matrix factorization.
//!
//! This module provides the numeric trait shared by every model component
//! together with the dense matrix and vector aliases used for ratings,
//! biases and latent factors.

use nalgebra::{Dyn, OMatrix, OVector, RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Trait for scalar types used in factorization (f32 or f64).
///
/// This trait combines all the necessary numeric traits required by
/// the training loop, the prediction formula and the RMSE metric.
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Tolerance used when comparing predictions in tests and diagnostics.
    const PREDICTION_TOLERANCE: Self;

    /// Convert from f64 (for constants and random draws).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("Failed to convert from f64")
    }

    /// Convert to f64 (for logging/display).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn to_f64(self) -> f64 {
        num_traits::cast(self).expect("Failed to convert to f64")
    }

    /// Convert from usize (for sample counts).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn from_usize(v: usize) -> Self {
        <Self as FromPrimitive>::from_usize(v).expect("Failed to convert from usize")
    }
}

impl Scalar for f32 {
    const PREDICTION_TOLERANCE: Self = 1e-5;
}

impl Scalar for f64 {
    const PREDICTION_TOLERANCE: Self = 1e-12;
}

/// Type alias for a dynamically-sized matrix.
pub type DMatrix<T> = OMatrix<T, Dyn, Dyn>;

/// Type alias for a dynamically-sized vector.
pub type DVector<T> = OVector<T, Dyn>;
