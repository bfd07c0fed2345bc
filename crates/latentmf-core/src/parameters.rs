//! Trainable state of the biased factorization model.
//!
//! The prediction for user `i` and item `j` is
//!
//! ```text
//! r̂(i, j) = b + b_u[i] + b_i[j] + P[i] · Q[j]
//! ```
//!
//! The same [`FactorParameters::predict`] is used for the per-sample SGD
//! update, the RMSE metric and the full-matrix reconstruction, and the dot
//! product always accumulates in ascending latent index order, so all three
//! agree exactly.

use crate::{
    config::Hyperparameters,
    ratings::{ObservedSamples, Sample},
    types::{DMatrix, DVector, Scalar},
};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Biases and latent factors of a factorization model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FactorParameters<T>
where
    T: Scalar,
{
    /// Global bias b; fixed at the mean observed rating, never trained
    pub global_bias: T,

    /// Per-user bias b_u (length = number of users)
    pub user_bias: DVector<T>,

    /// Per-item bias b_i (length = number of items)
    pub item_bias: DVector<T>,

    /// User-latent matrix P (users × K)
    pub user_factors: DMatrix<T>,

    /// Item-latent matrix Q (items × K)
    pub item_factors: DMatrix<T>,
}

impl<T> FactorParameters<T>
where
    T: Scalar,
{
    /// All-zero parameters, including the global bias.
    pub fn zeros(num_users: usize, num_items: usize, latent_factors: usize) -> Self {
        Self {
            global_bias: T::zero(),
            user_bias: DVector::zeros(num_users),
            item_bias: DVector::zeros(num_items),
            user_factors: DMatrix::zeros(num_users, latent_factors),
            item_factors: DMatrix::zeros(num_items, latent_factors),
        }
    }

    /// Fresh training state: zero biases, `b` set to `global_bias`, and
    /// latent factors drawn from N(0, (1/K)²). P is drawn before Q.
    pub fn initialize<R: Rng + ?Sized>(
        num_users: usize,
        num_items: usize,
        hyperparameters: &Hyperparameters<T>,
        global_bias: T,
        rng: &mut R,
    ) -> Self {
        let k = hyperparameters.latent_factors;
        let std = hyperparameters.init_std();

        let mut draw = |_: usize, _: usize| {
            let z: f64 = StandardNormal.sample(&mut *rng);
            <T as Scalar>::from_f64(z) * std
        };
        let user_factors = DMatrix::from_fn(num_users, k, &mut draw);
        let item_factors = DMatrix::from_fn(num_items, k, &mut draw);

        Self {
            global_bias,
            user_bias: DVector::zeros(num_users),
            item_bias: DVector::zeros(num_items),
            user_factors,
            item_factors,
        }
    }

    /// Number of users covered by these parameters.
    pub fn num_users(&self) -> usize {
        self.user_bias.len()
    }

    /// Number of items covered by these parameters.
    pub fn num_items(&self) -> usize {
        self.item_bias.len()
    }

    /// Latent dimensionality K.
    pub fn latent_factors(&self) -> usize {
        self.user_factors.ncols()
    }

    /// P[user] · Q[item], accumulated in ascending latent index order.
    pub fn latent_dot(&self, user: usize, item: usize) -> T {
        let mut acc = T::zero();
        for k in 0..self.latent_factors() {
            acc += self.user_factors[(user, k)] * self.item_factors[(item, k)];
        }
        acc
    }

    /// Predicted rating for (user, item).
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn predict(&self, user: usize, item: usize) -> T {
        self.global_bias + self.user_bias[user] + self.item_bias[item] + self.latent_dot(user, item)
    }

    /// Root-mean-square error over the observed samples (no regularization term).
    pub fn rmse(&self, samples: &ObservedSamples<T>) -> T {
        if samples.is_empty() {
            return T::zero();
        }
        let sse = samples.iter().fold(T::zero(), |acc, s| {
            let e = s.rating - self.predict(s.user, s.item);
            acc + e * e
        });
        num_traits::Float::sqrt(sse / <T as Scalar>::from_usize(samples.len()))
    }

    /// Applies one SGD step for a single sample and returns its prediction error.
    ///
    /// Biases move first; the latent rows then move simultaneously, i.e.
    /// `Q[j]`'s delta uses the pre-update `P[i]` and vice versa.
    pub fn sgd_update(&mut self, sample: &Sample<T>, learning_rate: T, regularization: T) -> T {
        let (i, j) = (sample.user, sample.item);
        let e = sample.rating - self.predict(i, j);

        let (bu, bi) = (self.user_bias[i], self.item_bias[j]);
        self.user_bias[i] = bu + learning_rate * (e - regularization * bu);
        self.item_bias[j] = bi + learning_rate * (e - regularization * bi);

        // Each component's delta depends only on the old values at index k.
        for k in 0..self.latent_factors() {
            let p = self.user_factors[(i, k)];
            let q = self.item_factors[(j, k)];
            let dp = learning_rate * (e * q - regularization * p);
            let dq = learning_rate * (e * p - regularization * q);
            self.user_factors[(i, k)] = p + dp;
            self.item_factors[(j, k)] = q + dq;
        }

        e
    }

    /// Dense users × items grid of predictions, observed or not.
    pub fn full_matrix(&self) -> DMatrix<T> {
        DMatrix::from_fn(self.num_users(), self.num_items(), |i, j| self.predict(i, j))
    }

    /// True when every bias and latent factor is finite.
    pub fn is_finite(&self) -> bool {
        num_traits::Float::is_finite(self.global_bias)
            && self.user_bias.iter().all(|v| num_traits::Float::is_finite(*v))
            && self.item_bias.iter().all(|v| num_traits::Float::is_finite(*v))
            && self.user_factors.iter().all(|v| num_traits::Float::is_finite(*v))
            && self.item_factors.iter().all(|v| num_traits::Float::is_finite(*v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratings::RatingMatrix;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn small_ratings() -> RatingMatrix<f64> {
        RatingMatrix::from_rows(&[[5.0, 3.0, 0.0], [4.0, 0.0, 1.0]]).unwrap()
    }

    #[test]
    fn test_initialize_shapes_and_biases() {
        let hyper = Hyperparameters::<f64>::new().with_latent_factors(3);
        let mut rng = StdRng::seed_from_u64(42);
        let params = FactorParameters::initialize(4, 5, &hyper, 2.5, &mut rng);

        assert_eq!(params.user_factors.shape(), (4, 3));
        assert_eq!(params.item_factors.shape(), (5, 3));
        assert_eq!(params.global_bias, 2.5);
        assert!(params.user_bias.iter().all(|&b| b == 0.0));
        assert!(params.item_bias.iter().all(|&b| b == 0.0));
        assert!(params.is_finite());
    }

    #[test]
    fn test_initialize_is_seed_deterministic() {
        let hyper = Hyperparameters::<f64>::default();
        let a = FactorParameters::initialize(3, 3, &hyper, 1.0, &mut StdRng::seed_from_u64(9));
        let b = FactorParameters::initialize(3, 3, &hyper, 1.0, &mut StdRng::seed_from_u64(9));
        let c = FactorParameters::initialize(3, 3, &hyper, 1.0, &mut StdRng::seed_from_u64(10));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_initial_spread_follows_latent_dimension() {
        let hyper = Hyperparameters::<f64>::new().with_latent_factors(4);
        let mut rng = StdRng::seed_from_u64(3);
        let params = FactorParameters::initialize(400, 400, &hyper, 0.0, &mut rng);

        let values: Vec<f64> = params.user_factors.iter().copied().collect();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        assert_relative_eq!(mean, 0.0, epsilon = 0.02);
        assert_relative_eq!(var.sqrt(), 0.25, epsilon = 0.02);
    }

    #[test]
    fn test_zero_parameters_rmse() {
        let samples = small_ratings().observed_samples();
        let params = FactorParameters::<f64>::zeros(2, 3, 2);

        let expected = ((25.0 + 9.0 + 16.0 + 1.0) / 4.0_f64).sqrt();
        assert_relative_eq!(params.rmse(&samples), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_full_matrix_matches_predict() {
        let hyper = Hyperparameters::<f64>::new().with_latent_factors(3);
        let mut params =
            FactorParameters::initialize(2, 3, &hyper, 3.25, &mut StdRng::seed_from_u64(1));
        params.user_bias[1] = 0.4;
        params.item_bias[2] = -0.7;

        let full = params.full_matrix();
        for i in 0..2 {
            for j in 0..3 {
                let mut dot = 0.0;
                for k in 0..3 {
                    dot += params.user_factors[(i, k)] * params.item_factors[(j, k)];
                }
                let expected = params.global_bias + params.user_bias[i] + params.item_bias[j] + dot;
                assert_eq!(full[(i, j)], expected);
            }
        }
    }

    #[test]
    fn test_sgd_update_is_simultaneous() {
        let mut params = FactorParameters::<f64>::zeros(1, 1, 2);
        params.global_bias = 1.0;
        params.user_factors[(0, 0)] = 0.3;
        params.user_factors[(0, 1)] = -0.2;
        params.item_factors[(0, 0)] = 0.5;
        params.item_factors[(0, 1)] = 0.1;

        let (alpha, beta) = (0.1, 0.02);
        let sample = Sample { user: 0, item: 0, rating: 4.0 };
        let p0 = [0.3, -0.2];
        let q0 = [0.5, 0.1];
        let e = 4.0 - (1.0 + (0.3 * 0.5 + -0.2 * 0.1));

        let returned = params.sgd_update(&sample, alpha, beta);
        assert_eq!(returned, e);

        for k in 0..2 {
            let expected_p = p0[k] + alpha * (e * q0[k] - beta * p0[k]);
            let expected_q = q0[k] + alpha * (e * p0[k] - beta * q0[k]);
            assert_eq!(params.user_factors[(0, k)], expected_p);
            assert_eq!(params.item_factors[(0, k)], expected_q);
        }
        assert_eq!(params.user_bias[0], alpha * e);
        assert_eq!(params.item_bias[0], alpha * e);
        assert_eq!(params.global_bias, 1.0);
    }

    #[test]
    fn test_is_finite_detects_overflow() {
        let mut params = FactorParameters::<f64>::zeros(2, 2, 1);
        assert!(params.is_finite());
        params.item_factors[(1, 0)] = f64::INFINITY;
        assert!(!params.is_finite());
    }

    #[test]
    fn test_works_in_single_precision() {
        let samples = RatingMatrix::from_rows(&[[2.0_f32, 0.0], [0.0, 4.0]])
            .unwrap()
            .observed_samples();
        let mut params = FactorParameters::<f32>::zeros(2, 2, 1);
        params.global_bias = samples.mean_rating().unwrap();
        assert_relative_eq!(params.rmse(&samples), 1.0, epsilon = f32::PREDICTION_TOLERANCE);
    }
}
