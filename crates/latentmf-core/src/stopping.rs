//! Stopping rules for epoch-based training.
//!
//! After every epoch the training loop records the training RMSE in an
//! [`RmseWindow`] and asks the [`ConvergenceChecker`] whether to stop.
//! The checks run in a fixed order and the first one that fires wins:
//!
//! 1. **Plateau**: at least 11 RMSE values are known and the RMSE improved by
//!    less than `tol` over the last 10 epochs (`rmse[-11] - rmse[-1] < tol`).
//! 2. **Target accuracy**: `rmse < 1 - target_accuracy`.
//! 3. **Iteration budget**: the epoch counter reached `max_iterations`.
//!
//! The window keeps only the last 11 values, so the plateau comparison always
//! looks exactly 10 epochs back regardless of how long training has run.

use crate::{config::Hyperparameters, types::Scalar};
use std::collections::VecDeque;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of epochs the plateau check looks back.
pub const PLATEAU_LAG: usize = 10;

/// Why training stopped.
///
/// Every variant is a normal terminal state; failures are reported as
/// errors instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TerminationReason {
    /// RMSE improved by less than `tol` over the last 10 epochs
    Plateau,
    /// RMSE dropped below `1 - target_accuracy`
    TargetAccuracy,
    /// The epoch budget was exhausted
    MaxIterations,
    /// An epoch observer asked to stop
    ObserverRequest,
}

impl TerminationReason {
    /// True when a convergence check fired (as opposed to running out of
    /// epochs or being stopped from outside).
    pub fn is_converged(self) -> bool {
        matches!(self, Self::Plateau | Self::TargetAccuracy)
    }
}

/// Fixed-capacity window over the most recent RMSE values.
#[derive(Debug, Clone)]
pub struct RmseWindow<T> {
    values: VecDeque<T>,
    capacity: usize,
}

impl<T> RmseWindow<T>
where
    T: Scalar,
{
    /// Creates a window able to compare the newest value with the one
    /// `lag` epochs earlier.
    pub fn new(lag: usize) -> Self {
        let capacity = lag + 1;
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records a new RMSE, evicting the oldest one when full.
    pub fn push(&mut self, rmse: T) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(rmse);
    }

    /// Number of values currently held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True before the first epoch has been recorded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True once the window holds `lag + 1` values.
    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// Most recent RMSE.
    pub fn latest(&self) -> Option<T> {
        self.values.back().copied()
    }

    /// RMSE improvement over the full lag, once enough epochs are known.
    pub fn improvement(&self) -> Option<T> {
        if !self.is_full() {
            return None;
        }
        match (self.values.front(), self.values.back()) {
            (Some(&oldest), Some(&newest)) => Some(oldest - newest),
            _ => None,
        }
    }

    /// Forgets every recorded value.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Thresholds that end training.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StoppingCriterion<T>
where
    T: Scalar,
{
    /// Maximum number of epochs
    pub max_iterations: usize,

    /// Minimum RMSE improvement over `PLATEAU_LAG` epochs
    pub tolerance: T,

    /// Stop once RMSE falls strictly below this value
    pub error_threshold: T,
}

impl<T> StoppingCriterion<T>
where
    T: Scalar,
{
    /// Derives the criterion from validated hyperparameters.
    pub fn from_hyperparameters(hyperparameters: &Hyperparameters<T>) -> Self {
        Self {
            max_iterations: hyperparameters.max_iterations,
            tolerance: hyperparameters.tolerance,
            error_threshold: hyperparameters.error_threshold(),
        }
    }
}

/// Convergence checker for the training loop.
pub struct ConvergenceChecker;

impl ConvergenceChecker {
    /// Checks the stopping rules after `epoch` (1-based) has been recorded.
    ///
    /// # Returns
    ///
    /// The termination reason if any rule fires, otherwise None.
    pub fn check<T>(
        window: &RmseWindow<T>,
        epoch: usize,
        criterion: &StoppingCriterion<T>,
    ) -> Option<TerminationReason>
    where
        T: Scalar,
    {
        if let Some(improvement) = window.improvement() {
            if improvement < criterion.tolerance {
                return Some(TerminationReason::Plateau);
            }
        }

        if let Some(rmse) = window.latest() {
            if rmse < criterion.error_threshold {
                return Some(TerminationReason::TargetAccuracy);
            }
        }

        if epoch >= criterion.max_iterations {
            return Some(TerminationReason::MaxIterations);
        }

        None
    }
}
