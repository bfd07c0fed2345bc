//! Rating matrices and the observed training samples derived from them.
//!
//! A [`RatingMatrix`] is a dense users × items grid. A cell holding exactly
//! zero means "not rated": zero is a sentinel, not a rating value, so a true
//! rating of zero cannot be represented. Every non-zero cell becomes one
//! [`Sample`] in the [`ObservedSamples`] list, in row-major scan order.

use crate::{
    error::{ModelError, Result},
    types::{DMatrix, Scalar},
};
use rand::{seq::SliceRandom, Rng};

/// A dense, immutable user × item rating matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingMatrix<T>
where
    T: Scalar,
{
    values: DMatrix<T>,
}

impl<T> RatingMatrix<T>
where
    T: Scalar,
{
    /// Wraps a dense matrix, rejecting empty shapes and negative or
    /// non-finite cells.
    pub fn from_matrix(values: DMatrix<T>) -> Result<Self> {
        let (users, items) = values.shape();
        if users == 0 || items == 0 {
            return Err(ModelError::dimension_mismatch(
                "at least one user and one item",
                format!("{users}x{items}"),
            ));
        }

        for i in 0..users {
            for j in 0..items {
                let value = values[(i, j)];
                if !num_traits::Float::is_finite(value) || value < T::zero() {
                    return Err(ModelError::invalid_rating(i, j, value));
                }
            }
        }

        Ok(Self { values })
    }

    /// Builds a matrix from row slices; every row must have the same length.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self> {
        let items = rows.first().map_or(0, |row| row.as_ref().len());
        for row in rows {
            let len = row.as_ref().len();
            if len != items {
                return Err(ModelError::dimension_mismatch(
                    format!("{items} columns"),
                    format!("{len} columns"),
                ));
            }
        }

        let values = DMatrix::from_fn(rows.len(), items, |i, j| rows[i].as_ref()[j]);
        Self::from_matrix(values)
    }

    /// Number of users (rows).
    pub fn num_users(&self) -> usize {
        self.values.nrows()
    }

    /// Number of items (columns).
    pub fn num_items(&self) -> usize {
        self.values.ncols()
    }

    /// Read-only view of the raw grid.
    pub fn values(&self) -> &DMatrix<T> {
        &self.values
    }

    /// Whether cell (user, item) holds an observed rating.
    pub fn is_observed(&self, user: usize, item: usize) -> bool {
        self.values[(user, item)] != T::zero()
    }

    /// Derives the observed samples in row-major order.
    pub fn observed_samples(&self) -> ObservedSamples<T> {
        let mut samples = Vec::new();
        for user in 0..self.num_users() {
            for item in 0..self.num_items() {
                let rating = self.values[(user, item)];
                if rating != T::zero() {
                    samples.push(Sample { user, item, rating });
                }
            }
        }
        ObservedSamples { samples }
    }
}

/// One observed (user, item, rating) triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<T> {
    /// Row index in the rating matrix
    pub user: usize,
    /// Column index in the rating matrix
    pub item: usize,
    /// Observed (non-zero) rating
    pub rating: T,
}

/// The ordered list of observed samples used for training.
///
/// The list is derived once and then only permuted in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedSamples<T> {
    samples: Vec<Sample<T>>,
}

impl<T> ObservedSamples<T>
where
    T: Scalar,
{
    /// Number of observed samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the rating matrix had no observed cell.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in their current order.
    pub fn as_slice(&self) -> &[Sample<T>] {
        &self.samples
    }

    /// Iterates over the samples in their current order.
    pub fn iter(&self) -> std::slice::Iter<'_, Sample<T>> {
        self.samples.iter()
    }

    /// Applies a uniformly random permutation.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.samples.shuffle(rng);
    }

    /// Mean of the observed ratings.
    pub fn mean_rating(&self) -> Result<T> {
        if self.samples.is_empty() {
            return Err(ModelError::NoObservedRatings);
        }
        let sum = self
            .samples
            .iter()
            .fold(T::zero(), |acc, sample| acc + sample.rating);
        Ok(sum / <T as Scalar>::from_usize(self.samples.len()))
    }
}

impl<'a, T> IntoIterator for &'a ObservedSamples<T> {
    type Item = &'a Sample<T>;
    type IntoIter = std::slice::Iter<'a, Sample<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_zero_cells_are_not_observed() {
        let ratings = RatingMatrix::from_rows(&[[0.0, 2.0], [3.0, 0.0]]).unwrap();
        let samples = ratings.observed_samples();

        assert_eq!(samples.len(), 2);
        assert_eq!(
            samples.as_slice(),
            &[
                Sample { user: 0, item: 1, rating: 2.0 },
                Sample { user: 1, item: 0, rating: 3.0 },
            ]
        );
        assert!(!ratings.is_observed(0, 0));
        assert!(ratings.is_observed(1, 0));
    }

    #[test]
    fn test_row_major_order() {
        let ratings = RatingMatrix::from_rows(&[vec![1.0, 2.0, 0.0], vec![4.0, 0.0, 6.0]]).unwrap();
        let order: Vec<(usize, usize)> = ratings
            .observed_samples()
            .iter()
            .map(|s| (s.user, s.item))
            .collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 0), (1, 2)]);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(matches!(
            RatingMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]),
            Err(ModelError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            RatingMatrix::<f64>::from_matrix(DMatrix::zeros(0, 3)),
            Err(ModelError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            RatingMatrix::from_rows(&[[1.0, -2.0]]),
            Err(ModelError::InvalidRating { user: 0, item: 1, .. })
        ));
        assert!(matches!(
            RatingMatrix::from_rows(&[[f64::NAN, 2.0]]),
            Err(ModelError::InvalidRating { user: 0, item: 0, .. })
        ));
    }

    #[test]
    fn test_mean_rating() {
        let ratings = RatingMatrix::from_rows(&[[0.0, 2.0], [3.0, 0.0]]).unwrap();
        assert_relative_eq!(ratings.observed_samples().mean_rating().unwrap(), 2.5);

        let empty = RatingMatrix::<f64>::from_matrix(DMatrix::zeros(2, 2)).unwrap();
        assert_eq!(
            empty.observed_samples().mean_rating(),
            Err(ModelError::NoObservedRatings)
        );
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let ratings = RatingMatrix::from_rows(&[[5.0, 3.0, 0.0, 1.0], [4.0, 0.0, 0.0, 1.0]]).unwrap();
        let original = ratings.observed_samples();
        let mut shuffled = original.clone();
        shuffled.shuffle(&mut StdRng::seed_from_u64(7));

        let mut a: Vec<_> = original.iter().map(|s| (s.user, s.item)).collect();
        let mut b: Vec<_> = shuffled.iter().map(|s| (s.user, s.item)).collect();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_sample_count_matches_nonzero_cells(
            cells in proptest::collection::vec(0u8..4, 1..40),
            cols in 1usize..6,
        ) {
            let rows: Vec<Vec<f64>> = cells
                .chunks(cols)
                .filter(|chunk| chunk.len() == cols)
                .map(|chunk| chunk.iter().map(|&c| f64::from(c)).collect())
                .collect();
            prop_assume!(!rows.is_empty());

            let ratings = RatingMatrix::from_rows(&rows).unwrap();
            let expected = rows.iter().flatten().filter(|&&v| v != 0.0).count();
            let samples = ratings.observed_samples();

            prop_assert_eq!(samples.len(), expected);
            prop_assert!(samples.iter().all(|s| s.rating != 0.0));
        }
    }
}
