//! Long, slow training on a sparse 4×5 matrix.
//!
//! A tiny learning rate with a strict tolerance makes training run for many
//! thousands of epochs; progress lines go through `tracing`.

use latentmf::prelude::*;
use latentmf::rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let ratings = RatingMatrix::from_rows(&[
        [0.0, 0.0, 1.0, 3.0, 2.0],
        [4.0, 0.0, 1.0, 5.0, 3.0],
        [3.0, 0.0, 1.0, 0.0, 0.0],
        [0.0, 2.0, 0.0, 2.0, 0.0],
    ])?;
    println!("{}", ratings.values());

    let hyperparameters = Hyperparameters::new()
        .with_latent_factors(2)
        .with_learning_rate(0.0001)
        .with_regularization(0.001)
        .with_target_accuracy(0.9999)
        .with_max_iterations(50_000)
        .with_tolerance(0.000_001);

    let mut model = MatrixFactorization::with_tracing(ratings, hyperparameters)?;
    model.log_hyperparameters();

    let mut recorder = RmseRecorder::new();
    let report = model.train_with_observer(&mut StdRng::seed_from_u64(7), &mut recorder)?;

    if let (Some(first), Some(last)) = (recorder.history().first(), recorder.history().last()) {
        println!("RMSE {first:.4} -> {last:.4} over {} epochs", report.epochs);
    }
    println!("{}", model.full_matrix()?);

    Ok(())
}
