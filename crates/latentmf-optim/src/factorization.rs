//! Biased matrix factorization trained by stochastic gradient descent.
//!
//! # Algorithm Overview
//!
//! Each training run:
//! 1. Sets the global bias to the mean observed rating, zeroes the user and
//!    item biases and draws both latent matrices from N(0, (1/K)²)
//! 2. Repeats, for at most `max_iterations` epochs:
//!    - shuffles the observed samples
//!    - applies one SGD update per sample
//!    - computes the training RMSE over all observed samples
//!    - checks the plateau rule, then the accuracy rule
//! 3. Leaves the learned parameters on the model for read-back
//!
//! The sweep is strictly sequential: every update reads and writes the same
//! bias and factor arrays. The only place training can be stopped from
//! outside is the epoch boundary, through an [`EpochObserver`].
//!
//! # Example
//!
//! ```rust
//! use latentmf_core::prelude::*;
//! use latentmf_optim::MatrixFactorization;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let ratings = RatingMatrix::from_rows(&[[5.0, 3.0, 0.0], [4.0, 0.0, 1.0]])?;
//! let mut model = MatrixFactorization::new(ratings, Hyperparameters::new(), MemorySink::new())?;
//!
//! let report = model.train(&mut StdRng::seed_from_u64(7))?;
//! let completed = model.full_matrix()?;
//! assert_eq!(completed.shape(), (2, 3));
//! assert!(report.epochs >= 1);
//! # Ok::<(), latentmf_core::ModelError>(())
//! ```

use crate::report::TrainingReport;
use latentmf_core::{
    callback::{EpochInfo, EpochObserver, NoOpObserver},
    config::Hyperparameters,
    error::{ModelError, Result},
    logging::{LogSink, TracingSink},
    parameters::FactorParameters,
    ratings::{ObservedSamples, RatingMatrix},
    stopping::{ConvergenceChecker, RmseWindow, StoppingCriterion, TerminationReason, PLATEAU_LAG},
    types::{DMatrix, Scalar},
};
use num_traits::Float;
use rand::Rng;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Epochs between periodic progress lines.
const LOG_EVERY: usize = 10;

/// Lifecycle of a model instance.
///
/// Training runs synchronously inside [`MatrixFactorization::train`], so only
/// the two resting states are observable from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    /// No parameters yet (fresh model, or after `reset`)
    Untrained,
    /// Parameters are frozen after a completed run
    Trained {
        /// Epochs completed by the run
        epochs: usize,
        /// Rule that ended the run
        reason: TerminationReason,
    },
}

/// A biased matrix factorization model over a fixed rating matrix.
#[derive(Debug)]
pub struct MatrixFactorization<T, L = TracingSink>
where
    T: Scalar,
    L: LogSink,
{
    ratings: RatingMatrix<T>,
    samples: ObservedSamples<T>,
    hyperparameters: Hyperparameters<T>,
    criterion: StoppingCriterion<T>,
    sink: L,
    state: TrainingState,
    parameters: Option<FactorParameters<T>>,
}

impl<T> MatrixFactorization<T, TracingSink>
where
    T: Scalar,
{
    /// Creates a model that narrates progress through `tracing`.
    pub fn with_tracing(ratings: RatingMatrix<T>, hyperparameters: Hyperparameters<T>) -> Result<Self> {
        Self::new(ratings, hyperparameters, TracingSink)
    }
}

impl<T, L> MatrixFactorization<T, L>
where
    T: Scalar,
    L: LogSink,
{
    /// Creates an untrained model.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for out-of-range hyperparameters and
    /// `NoObservedRatings` when the matrix has no non-zero cell.
    pub fn new(ratings: RatingMatrix<T>, hyperparameters: Hyperparameters<T>, sink: L) -> Result<Self> {
        hyperparameters.validate()?;

        let samples = ratings.observed_samples();
        if samples.is_empty() {
            return Err(ModelError::NoObservedRatings);
        }

        let criterion = StoppingCriterion::from_hyperparameters(&hyperparameters);
        Ok(Self {
            ratings,
            samples,
            hyperparameters,
            criterion,
            sink,
            state: TrainingState::Untrained,
            parameters: None,
        })
    }

    /// The rating matrix the model was built from.
    pub fn ratings(&self) -> &RatingMatrix<T> {
        &self.ratings
    }

    /// Observed samples, in the order left by the last shuffle.
    pub fn samples(&self) -> &ObservedSamples<T> {
        &self.samples
    }

    /// The model's hyperparameters.
    pub fn hyperparameters(&self) -> &Hyperparameters<T> {
        &self.hyperparameters
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TrainingState {
        self.state
    }

    /// Learned parameters, once trained.
    pub fn parameters(&self) -> Option<&FactorParameters<T>> {
        self.parameters.as_ref()
    }

    /// The progress sink.
    pub fn sink(&self) -> &L {
        &self.sink
    }

    /// Mutable access to the progress sink.
    pub fn sink_mut(&mut self) -> &mut L {
        &mut self.sink
    }

    /// Consumes the model and returns its sink.
    pub fn into_sink(self) -> L {
        self.sink
    }

    /// Writes the hyperparameters to the sink, one per line.
    pub fn log_hyperparameters(&mut self) {
        for line in self.hyperparameters.describe() {
            self.sink.log(&line);
        }
    }

    /// Discards trained parameters so the model can be trained again.
    pub fn reset(&mut self) {
        self.parameters = None;
        self.state = TrainingState::Untrained;
    }

    /// Trains the model until a stopping rule fires.
    ///
    /// `rng` drives both the factor initialization and the per-epoch shuffles,
    /// so a seeded generator makes the run reproducible.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyTrained` if the model holds parameters from an earlier
    /// run, and `NumericalDivergence` if a prediction error or the RMSE stops
    /// being finite.
    pub fn train<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<TrainingReport<T>> {
        self.train_with_observer(rng, NoOpObserver)
    }

    /// Trains the model, reporting every epoch to `observer`.
    ///
    /// The observer sees each epoch after the stopping rules ran; returning
    /// `false` ends training with [`TerminationReason::ObserverRequest`].
    pub fn train_with_observer<R, O>(&mut self, rng: &mut R, mut observer: O) -> Result<TrainingReport<T>>
    where
        R: Rng + ?Sized,
        O: EpochObserver<T>,
    {
        if matches!(self.state, TrainingState::Trained { .. }) {
            return Err(ModelError::AlreadyTrained);
        }

        let start_time = Instant::now();
        let global_bias = self.samples.mean_rating()?;
        let mut params = FactorParameters::initialize(
            self.ratings.num_users(),
            self.ratings.num_items(),
            &self.hyperparameters,
            global_bias,
            rng,
        );

        self.sink
            .log(&format!("Number of training samples: {}", self.samples.len()));
        self.sink.log("");
        observer.on_training_start(self.samples.len())?;

        let mut window = RmseWindow::new(PLATEAU_LAG);
        let mut epoch = 0;

        let last = loop {
            epoch += 1;

            self.samples.shuffle(rng);
            self.sweep(&mut params, epoch)?;
            if !params.is_finite() {
                warn!(epoch, "parameters are not finite after sweep");
                return Err(ModelError::numerical_divergence(epoch, "parameters are not finite after sweep"));
            }

            let rmse = params.rmse(&self.samples);
            if !Float::is_finite(rmse) {
                warn!(epoch, "training RMSE is not finite");
                return Err(ModelError::numerical_divergence(epoch, "training RMSE is not finite"));
            }
            window.push(rmse);

            let termination = ConvergenceChecker::check(&window, epoch, &self.criterion);
            self.narrate(epoch, rmse, termination);
            debug!(epoch, rmse = <T as Scalar>::to_f64(rmse), "epoch completed");

            let mut info = EpochInfo {
                epoch,
                rmse,
                elapsed: start_time.elapsed(),
                termination,
            };
            let keep_going = observer.on_epoch_end(&info)?;

            if termination.is_some() {
                break info;
            }
            if !keep_going {
                if epoch % LOG_EVERY != 0 {
                    self.sink.log(&Self::iteration_line(epoch, rmse));
                }
                info.termination = Some(TerminationReason::ObserverRequest);
                break info;
            }
        };

        let duration = start_time.elapsed();
        self.sink
            .log(&format!("Training time: {:.4}s", duration.as_secs_f64()));
        observer.on_training_end(&last)?;

        let reason = last.termination.unwrap_or(TerminationReason::MaxIterations);
        info!(
            epochs = last.epoch,
            rmse = <T as Scalar>::to_f64(last.rmse),
            reason = ?reason,
            "training finished"
        );

        self.parameters = Some(params);
        self.state = TrainingState::Trained {
            epochs: last.epoch,
            reason,
        };

        Ok(TrainingReport::new(last.epoch, last.rmse, reason, duration))
    }

    /// One SGD pass over the samples in their current order.
    fn sweep(&self, params: &mut FactorParameters<T>, epoch: usize) -> Result<()> {
        let alpha = self.hyperparameters.learning_rate;
        let beta = self.hyperparameters.regularization;

        for sample in &self.samples {
            let error = params.sgd_update(sample, alpha, beta);
            if !Float::is_finite(error) {
                warn!(epoch, user = sample.user, item = sample.item, "prediction error is not finite");
                return Err(ModelError::numerical_divergence(
                    epoch,
                    format!(
                        "non-finite prediction error for user {} and item {}",
                        sample.user, sample.item
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Writes the per-epoch progress lines.
    fn narrate(&mut self, epoch: usize, rmse: T, termination: Option<TerminationReason>) {
        let iteration_line = Self::iteration_line(epoch, rmse);
        match termination {
            Some(TerminationReason::Plateau) => {
                self.sink.log(&iteration_line);
                self.sink.log(&format!(
                    "Target error difference (tol) {} reached.",
                    self.hyperparameters.tolerance
                ));
            }
            Some(TerminationReason::TargetAccuracy) => {
                self.sink.log(&iteration_line);
                self.sink.log(&format!(
                    "Target accuracy of {} reached.",
                    self.hyperparameters.target_accuracy
                ));
            }
            _ if epoch % LOG_EVERY == 0 => self.sink.log(&iteration_line),
            _ => {}
        }
    }

    fn iteration_line(epoch: usize, rmse: T) -> String {
        format!("Iteration: {epoch} ; error = {rmse:.4}")
    }

    fn trained_parameters(&self) -> Result<&FactorParameters<T>> {
        self.parameters.as_ref().ok_or(ModelError::NotTrained)
    }

    /// Predicted rating for one cell.
    pub fn predict(&self, user: usize, item: usize) -> Result<T> {
        let params = self.trained_parameters()?;
        let (users, items) = (self.ratings.num_users(), self.ratings.num_items());
        if user >= users || item >= items {
            return Err(ModelError::IndexOutOfBounds {
                user,
                item,
                users,
                items,
            });
        }
        Ok(params.predict(user, item))
    }

    /// Dense users × items grid of predictions, observed or not.
    pub fn full_matrix(&self) -> Result<DMatrix<T>> {
        Ok(self.trained_parameters()?.full_matrix())
    }

    /// Training RMSE of the learned parameters.
    pub fn rmse(&self) -> Result<T> {
        Ok(self.trained_parameters()?.rmse(&self.samples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latentmf_core::logging::MemorySink;
    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn ratings() -> RatingMatrix<f64> {
        RatingMatrix::from_rows(&[
            [5.0, 3.0, 0.0, 1.0],
            [4.0, 0.0, 0.0, 1.0],
            [1.0, 1.0, 0.0, 5.0],
            [1.0, 0.0, 0.0, 4.0],
            [0.0, 1.0, 5.0, 4.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_construction_validates() {
        let bad = Hyperparameters::new().with_latent_factors(0);
        assert!(matches!(
            MatrixFactorization::new(ratings(), bad, MemorySink::new()),
            Err(ModelError::InvalidConfiguration { .. })
        ));

        let empty = RatingMatrix::<f64>::from_matrix(DMatrix::zeros(3, 3)).unwrap();
        assert!(matches!(
            MatrixFactorization::new(empty, Hyperparameters::new(), MemorySink::new()),
            Err(ModelError::NoObservedRatings)
        ));
    }

    #[test]
    fn test_untrained_accessors() {
        let model = MatrixFactorization::new(ratings(), Hyperparameters::new(), MemorySink::new()).unwrap();
        assert_eq!(model.state(), TrainingState::Untrained);
        assert!(model.parameters().is_none());
        assert_eq!(model.samples().len(), 13);
        assert!(matches!(model.full_matrix(), Err(ModelError::NotTrained)));
        assert!(matches!(model.predict(0, 0), Err(ModelError::NotTrained)));
        assert!(matches!(model.rmse(), Err(ModelError::NotTrained)));
        assert!(model.sink().lines().is_empty());
    }

    #[test]
    fn test_log_hyperparameters() {
        let mut model = MatrixFactorization::new(ratings(), Hyperparameters::new(), MemorySink::new()).unwrap();
        model.log_hyperparameters();
        assert_eq!(
            model.sink().lines(),
            &[
                "",
                "K: 2",
                "alpha (learning rate): 0.05",
                "beta (regularization): 0.01",
                "target_accuracy: 0.99",
                "max_iterations: 1000",
                "tol: 0.0001",
            ]
        );
    }

    #[test]
    fn test_retraining_requires_reset() {
        let hyper = Hyperparameters::new().with_max_iterations(5);
        let mut model = MatrixFactorization::new(ratings(), hyper, MemorySink::new()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        model.train(&mut rng).unwrap();
        assert!(matches!(model.state(), TrainingState::Trained { epochs: 5, .. }));
        assert_eq!(model.train(&mut rng), Err(ModelError::AlreadyTrained));

        model.reset();
        assert_eq!(model.state(), TrainingState::Untrained);
        assert!(model.parameters().is_none());
        assert!(model.train(&mut rng).is_ok());
    }

    #[test]
    fn test_predict_bounds() {
        let hyper = Hyperparameters::new().with_max_iterations(3);
        let mut model = MatrixFactorization::new(ratings(), hyper, MemorySink::new()).unwrap();
        model.train(&mut StdRng::seed_from_u64(2)).unwrap();

        assert!(model.predict(4, 3).is_ok());
        assert_eq!(
            model.predict(5, 0),
            Err(ModelError::IndexOutOfBounds {
                user: 5,
                item: 0,
                users: 5,
                items: 4,
            })
        );
    }

    #[test]
    fn test_periodic_iteration_lines() {
        let hyper = Hyperparameters::new()
            .with_max_iterations(30)
            .with_tolerance(0.0)
            .with_target_accuracy(1.0);
        let mut model = MatrixFactorization::new(ratings(), hyper, MemorySink::new()).unwrap();
        let report = model.train(&mut StdRng::seed_from_u64(3)).unwrap();

        assert_eq!(report.termination_reason, TerminationReason::MaxIterations);
        assert_eq!(report.epochs, 30);

        let lines = model.sink().lines();
        assert_eq!(lines[0], "Number of training samples: 13");
        assert_eq!(lines[1], "");
        let iterations: Vec<&str> = lines
            .iter()
            .filter(|l| l.starts_with("Iteration: "))
            .map(|l| l.split(" ;").next().unwrap_or(""))
            .collect();
        assert_eq!(iterations, vec!["Iteration: 10", "Iteration: 20", "Iteration: 30"]);
        assert!(lines.last().unwrap().starts_with("Training time: "));
        assert!(lines.last().unwrap().ends_with('s'));
    }

    #[test]
    fn test_divergence_is_reported() {
        let hyper = Hyperparameters::new()
            .with_learning_rate(1e6)
            .with_max_iterations(50)
            .with_tolerance(0.0);
        let mut model = MatrixFactorization::new(ratings(), hyper, MemorySink::new()).unwrap();
        let err = model.train(&mut StdRng::seed_from_u64(4)).unwrap_err();

        assert!(err.is_numerical());
        assert_eq!(model.state(), TrainingState::Untrained);
        assert!(model.parameters().is_none());
    }

    #[test]
    fn test_overflowing_factors_stop_training() {
        // the first update overflows the latent factors while its error is still finite
        let ratings = RatingMatrix::from_rows(&[[4.0]]).unwrap();
        let hyper = Hyperparameters::new()
            .with_latent_factors(1)
            .with_learning_rate(1e200)
            .with_regularization(1e200);
        let mut model = MatrixFactorization::new(ratings, hyper, MemorySink::new()).unwrap();
        let err = model.train(&mut StdRng::seed_from_u64(9)).unwrap_err();

        match err {
            ModelError::NumericalDivergence { epoch, reason } => {
                assert_eq!(epoch, 1);
                assert_eq!(reason, "parameters are not finite after sweep");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(model.state(), TrainingState::Untrained);
    }
}
