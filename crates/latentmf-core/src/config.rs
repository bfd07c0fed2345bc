//! Hyperparameter configuration for the factorization model.
//!
//! Hyperparameters are fixed for the lifetime of a model. They are built with
//! the usual `Default` + `with_*` pattern and checked once by
//! [`Hyperparameters::validate`] before any training state exists.
//!
//! # Example
//!
//! ```rust
//! use latentmf_core::config::Hyperparameters;
//!
//! let params = Hyperparameters::<f64>::new()
//!     .with_latent_factors(3)
//!     .with_learning_rate(0.01)
//!     .with_max_iterations(500);
//! assert!(params.validate().is_ok());
//! ```

use crate::{
    error::{ModelError, Result},
    types::Scalar,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Hyperparameters of biased matrix factorization trained by SGD.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Hyperparameters<T>
where
    T: Scalar,
{
    /// Number of latent dimensions K
    pub latent_factors: usize,

    /// Learning rate alpha applied to every SGD update
    pub learning_rate: T,

    /// L2 regularization strength beta (gradient updates only)
    pub regularization: T,

    /// Training stops once RMSE < 1 - target_accuracy
    pub target_accuracy: T,

    /// Maximum number of epochs
    pub max_iterations: usize,

    /// Training stops once RMSE improved by less than this over the last 10 epochs
    pub tolerance: T,
}

impl<T> Default for Hyperparameters<T>
where
    T: Scalar,
{
    fn default() -> Self {
        Self {
            latent_factors: 2,
            learning_rate: <T as Scalar>::from_f64(0.05),
            regularization: <T as Scalar>::from_f64(0.01),
            target_accuracy: <T as Scalar>::from_f64(0.99),
            max_iterations: 1000,
            tolerance: <T as Scalar>::from_f64(1e-4),
        }
    }
}

impl<T> Hyperparameters<T>
where
    T: Scalar,
{
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of latent dimensions.
    pub fn with_latent_factors(mut self, k: usize) -> Self {
        self.latent_factors = k;
        self
    }

    /// Sets the learning rate.
    pub fn with_learning_rate(mut self, alpha: T) -> Self {
        self.learning_rate = alpha;
        self
    }

    /// Sets the regularization strength.
    pub fn with_regularization(mut self, beta: T) -> Self {
        self.regularization = beta;
        self
    }

    /// Sets the target accuracy.
    pub fn with_target_accuracy(mut self, target: T) -> Self {
        self.target_accuracy = target;
        self
    }

    /// Sets the maximum number of epochs.
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self {
        self.max_iterations = max_iter;
        self
    }

    /// Sets the plateau tolerance.
    pub fn with_tolerance(mut self, tol: T) -> Self {
        self.tolerance = tol;
        self
    }

    /// Checks every hyperparameter against its admissible range.
    pub fn validate(&self) -> Result<()> {
        if self.latent_factors < 1 {
            return Err(ModelError::invalid_configuration(
                "must be at least 1",
                "K",
                self.latent_factors.to_string(),
            ));
        }

        if !num_traits::Float::is_finite(self.learning_rate) || self.learning_rate <= T::zero() {
            return Err(ModelError::invalid_configuration(
                "must be positive and finite",
                "alpha",
                self.learning_rate.to_string(),
            ));
        }

        if !num_traits::Float::is_finite(self.regularization) || self.regularization < T::zero() {
            return Err(ModelError::invalid_configuration(
                "must be non-negative and finite",
                "beta",
                self.regularization.to_string(),
            ));
        }

        if !(self.target_accuracy > T::zero() && self.target_accuracy <= T::one()) {
            return Err(ModelError::invalid_configuration(
                "must lie in (0, 1]",
                "target_accuracy",
                self.target_accuracy.to_string(),
            ));
        }

        if self.max_iterations < 1 {
            return Err(ModelError::invalid_configuration(
                "must be at least 1",
                "max_iterations",
                self.max_iterations.to_string(),
            ));
        }

        if !num_traits::Float::is_finite(self.tolerance) || self.tolerance < T::zero() {
            return Err(ModelError::invalid_configuration(
                "must be non-negative and finite",
                "tol",
                self.tolerance.to_string(),
            ));
        }

        Ok(())
    }

    /// Standard deviation of the normal draw for the latent factors (1/K).
    pub fn init_std(&self) -> T {
        T::one() / <T as Scalar>::from_usize(self.latent_factors)
    }

    /// RMSE threshold below which the accuracy check fires.
    pub fn error_threshold(&self) -> T {
        T::one() - self.target_accuracy
    }

    /// Human-readable dump, one line per hyperparameter.
    pub fn describe(&self) -> Vec<String> {
        vec![
            String::new(),
            format!("K: {}", self.latent_factors),
            format!("alpha (learning rate): {}", self.learning_rate),
            format!("beta (regularization): {}", self.regularization),
            format!("target_accuracy: {}", self.target_accuracy),
            format!("max_iterations: {}", self.max_iterations),
            format!("tol: {}", self.tolerance),
        ]
    }
}
