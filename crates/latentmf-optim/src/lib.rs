//! latentmf Optimization - SGD training for biased matrix factorization.
//!
//! This crate provides the training loop on top of the types in
//! `latentmf-core`: parameter initialization, shuffled per-sample SGD
//! sweeps, RMSE-driven stopping and read-back of the learned model.
//!
//! # Examples
//!
//! ```rust
//! use latentmf_core::prelude::*;
//! use latentmf_optim::MatrixFactorization;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let ratings = RatingMatrix::from_rows(&[
//!     [5.0, 3.0, 0.0, 1.0],
//!     [4.0, 0.0, 0.0, 1.0],
//!     [1.0, 1.0, 0.0, 5.0],
//! ])?;
//! let hyperparameters = Hyperparameters::new()
//!     .with_latent_factors(2)
//!     .with_learning_rate(0.05)
//!     .with_max_iterations(200);
//!
//! let mut model = MatrixFactorization::new(ratings, hyperparameters, NullSink)?;
//! let report = model.train(&mut StdRng::seed_from_u64(42))?;
//! println!("stopped after {} epochs: {:?}", report.epochs, report.termination_reason);
//! # Ok::<(), ModelError>(())
//! ```

pub mod factorization;
pub mod report;

pub use factorization::{MatrixFactorization, TrainingState};
pub use report::TrainingReport;

// Re-export commonly used items from core
pub use latentmf_core::{
    callback::{EpochInfo, EpochObserver},
    config::Hyperparameters,
    logging::LogSink,
    stopping::TerminationReason,
};
