//! # latentmf
//!
//! Biased matrix factorization of sparse rating matrices, trained with
//! stochastic gradient descent.
//!
//! Given a users × items matrix where zero marks a missing rating, the model
//! learns a global bias, per-user and per-item biases and K-dimensional
//! latent factors, and predicts every cell as
//! `b + b_u[i] + b_i[j] + P[i] · Q[j]`.
//!
//! ## Quick Start
//!
//! ```rust
//! use latentmf::prelude::*;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let ratings = RatingMatrix::from_rows(&[
//!     [5.0, 3.0, 0.0, 1.0],
//!     [4.0, 0.0, 0.0, 1.0],
//!     [1.0, 1.0, 0.0, 5.0],
//!     [1.0, 0.0, 0.0, 4.0],
//!     [0.0, 1.0, 5.0, 4.0],
//! ])?;
//!
//! let mut model = MatrixFactorization::new(ratings, Hyperparameters::new(), MemorySink::new())?;
//! let report = model.train(&mut StdRng::seed_from_u64(42))?;
//!
//! let completed = model.full_matrix()?;
//! println!("{} epochs, RMSE {:.4}", report.epochs, report.final_rmse);
//! println!("{completed}");
//! # Ok::<(), ModelError>(())
//! ```
//!
//! ## Crate Organization
//!
//! - `latentmf-core`: ratings, parameters, stopping rules, logging and callbacks
//! - `latentmf-optim`: the SGD training loop

pub use latentmf_core;
pub use latentmf_optim;

// Re-export key dependencies
pub use nalgebra;
pub use rand;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use latentmf_core::prelude::*;
    pub use latentmf_optim::{MatrixFactorization, TrainingReport, TrainingState};
}
