//! Error types for matrix factorization.
//!
//! Every fallible operation in the workspace reports a [`ModelError`].
//! Structural problems (bad hyperparameters, unusable rating matrices,
//! lifecycle misuse) are detected before any numeric work starts; numeric
//! divergence is detected while training and aborts the run.

use thiserror::Error;

/// Errors that can occur while building or training a factorization model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Invalid hyperparameter configuration.
    ///
    /// This error occurs when the model is configured with invalid
    /// parameters (e.g., zero latent dimensions, non-positive learning rate).
    #[error("Invalid model configuration: {reason} ({parameter} = {value})")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
        /// Name of the invalid parameter
        parameter: String,
        /// Value that was invalid
        value: String,
    },

    /// A rating cell holds a value that cannot be used for training.
    #[error("Invalid rating {value} at (user {user}, item {item}): ratings must be finite and non-negative")]
    InvalidRating {
        /// Row of the offending cell
        user: usize,
        /// Column of the offending cell
        item: usize,
        /// Offending value, rendered for display
        value: String,
    },

    /// Dimension mismatch between inputs.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: String,
        /// Actual dimensions
        actual: String,
    },

    /// The rating matrix has no non-zero cell.
    ///
    /// The global bias is the mean of the observed ratings, which is
    /// undefined for an empty set.
    #[error("Rating matrix contains no observed ratings")]
    NoObservedRatings,

    /// A prediction, update or error metric became NaN or infinite.
    #[error("Numerical divergence at epoch {epoch}: {reason}")]
    NumericalDivergence {
        /// 1-based epoch in which the divergence was detected
        epoch: usize,
        /// Description of the non-finite quantity
        reason: String,
    },

    /// A prediction was requested outside the rating grid.
    #[error("Index (user {user}, item {item}) out of bounds for a {users}x{items} rating matrix")]
    IndexOutOfBounds {
        /// Requested user index
        user: usize,
        /// Requested item index
        item: usize,
        /// Number of users in the model
        users: usize,
        /// Number of items in the model
        items: usize,
    },

    /// The operation needs trained parameters.
    #[error("Model has not been trained")]
    NotTrained,

    /// `train` was called on a model that already holds trained parameters.
    #[error("Model is already trained; call reset() before training again")]
    AlreadyTrained,
}

impl ModelError {
    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration<S1, S2, S3>(reason: S1, parameter: S2, value: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self::InvalidConfiguration {
            reason: reason.into(),
            parameter: parameter.into(),
            value: value.into(),
        }
    }

    /// Create an InvalidRating error.
    pub fn invalid_rating<V: std::fmt::Display>(user: usize, item: usize, value: V) -> Self {
        Self::InvalidRating {
            user,
            item,
            value: value.to_string(),
        }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a NumericalDivergence error for the given epoch.
    pub fn numerical_divergence<S: Into<String>>(epoch: usize, reason: S) -> Self {
        Self::NumericalDivergence {
            epoch,
            reason: reason.into(),
        }
    }

    /// Returns true for errors raised by the numeric core rather than by
    /// input validation or lifecycle checks.
    pub fn is_numerical(&self) -> bool {
        matches!(self, Self::NumericalDivergence { .. })
    }
}

/// Result type alias for factorization operations.
pub type Result<T> = std::result::Result<T, ModelError>;
