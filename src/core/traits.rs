//! Core traits for the elastic-net optimizer

use crate::core::SparseView;

/// Read-only feature storage for a fixed dataset
///
/// The optimizer reads rows to initialize scores and columns to run the
/// per-feature updates, so implementations are expected to offer both
/// orientations without densifying.
pub trait FeatureStore: Send + Sync {
    /// Number of data points
    fn n_samples(&self) -> usize;

    /// Number of features (dimensionality)
    fn n_features(&self) -> usize;

    /// Non-zero entries of data point `i`, keyed by feature index
    ///
    /// # Panics
    /// Panics if `i >= n_samples()`
    fn row(&self, i: usize) -> SparseView<'_>;

    /// Non-zero entries of feature `j`, keyed by data point index
    ///
    /// # Panics
    /// Panics if `j >= n_features()`
    fn column(&self, j: usize) -> SparseView<'_>;

    /// Check if the store holds no data points
    fn is_empty(&self) -> bool {
        self.n_samples() == 0
    }
}

/// A linear model `bias + Σ coefficient_j * x_j` that can be fitted in place
pub trait LinearModel {
    /// Number of coefficients, excluding the bias
    fn n_features(&self) -> usize;

    fn bias(&self) -> f64;

    fn set_bias(&mut self, bias: f64);

    /// Coefficient of `feature` (0 when absent)
    fn coefficient(&self, feature: usize) -> f64;

    fn set_coefficient(&mut self, feature: usize, value: f64);

    /// Non-zero coefficients in ascending feature order
    fn nonzero_coefficients(&self) -> Vec<(usize, f64)>;

    /// Predict the response for one data point
    fn predict(&self, row: SparseView<'_>) -> f64 {
        self.bias()
            + row
                .iter()
                .map(|(feature, x)| self.coefficient(feature) * x)
                .sum::<f64>()
    }

    /// Number of non-zero coefficients
    fn n_nonzero(&self) -> usize {
        self.nonzero_coefficients().len()
    }
}
