//! Epoch-boundary callbacks for the training loop.
//!
//! The epoch boundary is the only point where training can be observed or
//! stopped from outside: parameters are consistent and the epoch's RMSE is
//! known. Observers can record metrics or end training early.

use crate::{error::Result, stopping::TerminationReason, types::Scalar};
use std::time::Duration;

/// Information passed to observers after each epoch.
#[derive(Clone, Debug)]
pub struct EpochInfo<T: Scalar> {
    /// 1-based epoch index
    pub epoch: usize,

    /// Training RMSE after this epoch's sweep
    pub rmse: T,

    /// Elapsed time since training started
    pub elapsed: Duration,

    /// Stopping rule that fired in this epoch, if any
    pub termination: Option<TerminationReason>,
}

/// Trait for training observers.
pub trait EpochObserver<T: Scalar> {
    /// Called once parameters are initialized, before the first epoch.
    fn on_training_start(&mut self, num_samples: usize) -> Result<()> {
        let _ = num_samples;
        Ok(())
    }

    /// Called at the end of each epoch.
    ///
    /// Returns `true` to continue training, `false` to stop early.
    fn on_epoch_end(&mut self, info: &EpochInfo<T>) -> Result<bool> {
        let _ = info;
        Ok(true)
    }

    /// Called once training has stopped.
    fn on_training_end(&mut self, info: &EpochInfo<T>) -> Result<()> {
        let _ = info;
        Ok(())
    }
}

impl<T: Scalar, O: EpochObserver<T> + ?Sized> EpochObserver<T> for &mut O {
    fn on_training_start(&mut self, num_samples: usize) -> Result<()> {
        (**self).on_training_start(num_samples)
    }

    fn on_epoch_end(&mut self, info: &EpochInfo<T>) -> Result<bool> {
        (**self).on_epoch_end(info)
    }

    fn on_training_end(&mut self, info: &EpochInfo<T>) -> Result<()> {
        (**self).on_training_end(info)
    }
}

/// An observer that does nothing.
pub struct NoOpObserver;

impl<T: Scalar> EpochObserver<T> for NoOpObserver {}

/// Records the RMSE of every epoch.
#[derive(Debug, Clone, Default)]
pub struct RmseRecorder<T> {
    history: Vec<T>,
}

impl<T: Scalar> RmseRecorder<T> {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self { history: Vec::new() }
    }

    /// RMSE per epoch; index 0 is epoch 1.
    pub fn history(&self) -> &[T] {
        &self.history
    }
}

impl<T: Scalar> EpochObserver<T> for RmseRecorder<T> {
    fn on_training_start(&mut self, _num_samples: usize) -> Result<()> {
        self.history.clear();
        Ok(())
    }

    fn on_epoch_end(&mut self, info: &EpochInfo<T>) -> Result<bool> {
        self.history.push(info.rmse);
        Ok(true)
    }
}

/// Stops training after a fixed number of epochs.
#[derive(Debug, Clone, Copy)]
pub struct EpochLimit {
    limit: usize,
}

impl EpochLimit {
    /// Stops once `limit` epochs have completed.
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl<T: Scalar> EpochObserver<T> for EpochLimit {
    fn on_epoch_end(&mut self, info: &EpochInfo<T>) -> Result<bool> {
        Ok(info.epoch < self.limit)
    }
}
