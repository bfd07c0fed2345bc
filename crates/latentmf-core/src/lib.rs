//! Core types for biased matrix factorization.
//!
//! This crate provides the building blocks of a low-rank rating model
//! trained by stochastic gradient descent: the rating matrix and its observed
//! samples, the trainable parameters with their prediction and update rules,
//! the stopping rules, and the logging and callback seams used by the
//! training loop in `latentmf-optim`.
//!
//! # Key Concepts
//!
//! - **Rating matrix**: dense users × items grid where zero means "unrated"
//! - **Biases**: global, per-user and per-item additive corrections
//! - **Latent factors**: K-dimensional user and item vectors whose dot
//!   product models the interaction
//! - **RMSE**: training error driving the stopping rules
//!
//! # Modules
//!
//! - [`callback`]: Epoch-boundary observers
//! - [`config`]: Hyperparameters and their validation
//! - [`error`]: Error types
//! - [`logging`]: Line-oriented progress sinks
//! - [`parameters`]: Biases, latent factors, prediction and SGD update
//! - [`ratings`]: Rating matrix and observed samples
//! - [`stopping`]: RMSE window, stopping criterion and convergence checks
//! - [`types`]: Scalar trait and matrix aliases

pub mod callback;
pub mod config;
pub mod error;
pub mod logging;
pub mod parameters;
pub mod ratings;
pub mod stopping;
pub mod types;

// Re-export commonly used items at the crate root
pub use error::{ModelError, Result};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use latentmf_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::callback::{EpochInfo, EpochLimit, EpochObserver, NoOpObserver, RmseRecorder};
    pub use crate::config::Hyperparameters;
    pub use crate::error::{ModelError, Result};
    pub use crate::logging::{LogSink, MemorySink, NullSink, TracingSink};
    pub use crate::parameters::FactorParameters;
    pub use crate::ratings::{ObservedSamples, RatingMatrix, Sample};
    pub use crate::stopping::{
        ConvergenceChecker, RmseWindow, StoppingCriterion, TerminationReason, PLATEAU_LAG,
    };
    pub use crate::types::{DMatrix, DVector, Scalar};
}
