//! Outcome of a training run.

use latentmf_core::{stopping::TerminationReason, types::Scalar};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Summary returned by [`MatrixFactorization::train`](crate::MatrixFactorization::train).
///
/// The learned parameters stay on the model; this only describes the run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrainingReport<T>
where
    T: Scalar,
{
    /// Number of completed epochs
    pub epochs: usize,

    /// Training RMSE after the last epoch
    pub final_rmse: T,

    /// Which rule ended training
    pub termination_reason: TerminationReason,

    /// Wall-clock training time
    pub duration: Duration,

    /// True if a plateau or accuracy check ended training
    pub converged: bool,
}

impl<T> TrainingReport<T>
where
    T: Scalar,
{
    /// Creates a report; `converged` follows from the termination reason.
    pub fn new(
        epochs: usize,
        final_rmse: T,
        termination_reason: TerminationReason,
        duration: Duration,
    ) -> Self {
        Self {
            epochs,
            final_rmse,
            termination_reason,
            duration,
            converged: termination_reason.is_converged(),
        }
    }
}
