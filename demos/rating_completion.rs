//! Rating completion on a small user × item matrix.
//!
//! Trains a rank-2 biased factorization on a 5×4 rating matrix with four
//! unrated cells and prints the completed matrix and the learned parameters.
//!
//! Run with `RUST_LOG=latentmf=debug` to see per-epoch diagnostics.

use latentmf::prelude::*;
use latentmf::rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let ratings = RatingMatrix::from_rows(&[
        [5.0, 3.0, 0.0, 1.0],
        [4.0, 0.0, 0.0, 1.0],
        [1.0, 1.0, 0.0, 5.0],
        [1.0, 0.0, 0.0, 4.0],
        [0.0, 1.0, 5.0, 4.0],
    ])?;

    println!("\n------------------- INPUT --------------------");
    println!("{}", ratings.values());

    let hyperparameters = Hyperparameters::new()
        .with_latent_factors(2)
        .with_learning_rate(0.05)
        .with_regularization(0.01)
        .with_target_accuracy(0.99)
        .with_max_iterations(1000)
        .with_tolerance(0.0001);

    let mut model = MatrixFactorization::new(ratings, hyperparameters, MemorySink::echoing())?;

    println!("\n--------------- HYPERPARAMETERS ----------------");
    model.log_hyperparameters();

    println!("\n------------------ TRAINING --------------------");
    let report = model.train(&mut StdRng::seed_from_u64(42))?;
    println!("stopped by {:?} after {} epochs", report.termination_reason, report.epochs);

    println!("\n------------------ RESULTS ---------------------");
    println!("\nFull matrix:");
    println!("{}", model.full_matrix()?);

    let params = model.parameters().ok_or(ModelError::NotTrained)?;
    println!("\n-------------- TRAINED PARAMETERS --------------");
    println!("\nBias:\n{}", params.global_bias);
    println!("\nItem bias:{}", params.item_bias);
    println!("\nUser bias:{}", params.user_bias);
    println!("\nUser latent matrix:{}", params.user_factors);
    println!("\nItem latent matrix:{}", params.item_factors);

    Ok(())
}
