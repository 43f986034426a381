//! Linear regression weight vectors
//!
//! Two storage layouts implement [`LinearModel`]: a dense coefficient vector
//! for moderate dimensionality, and a sparse map for very wide models where
//! most coefficients are expected to stay at exactly zero.

use crate::core::LinearModel;
use std::collections::BTreeMap;

/// Linear regression with a dense coefficient vector
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    bias: f64,
    coefficients: Vec<f64>,
}

impl LinearRegression {
    /// All-zero model with `n_features` coefficients
    pub fn new(n_features: usize) -> Self {
        Self {
            bias: 0.0,
            coefficients: vec![0.0; n_features],
        }
    }

    /// Model with explicit starting values, typically a warm start
    pub fn with_weights(bias: f64, coefficients: Vec<f64>) -> Self {
        Self { bias, coefficients }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// L1 norm of the coefficients (bias excluded)
    pub fn l1_norm(&self) -> f64 {
        self.coefficients.iter().map(|c| c.abs()).sum()
    }
}

impl LinearModel for LinearRegression {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn bias(&self) -> f64 {
        self.bias
    }

    fn set_bias(&mut self, bias: f64) {
        self.bias = bias;
    }

    fn coefficient(&self, feature: usize) -> f64 {
        self.coefficients[feature]
    }

    fn set_coefficient(&mut self, feature: usize, value: f64) {
        self.coefficients[feature] = value;
    }

    fn nonzero_coefficients(&self) -> Vec<(usize, f64)> {
        self.coefficients
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c != 0.0)
            .map(|(j, &c)| (j, c))
            .collect()
    }
}

/// Linear regression storing only non-zero coefficients
///
/// Setting a coefficient to exactly `0.0` removes its entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseLinearRegression {
    bias: f64,
    n_features: usize,
    coefficients: BTreeMap<usize, f64>,
}

impl SparseLinearRegression {
    pub fn new(n_features: usize) -> Self {
        Self {
            bias: 0.0,
            n_features,
            coefficients: BTreeMap::new(),
        }
    }

    /// Expand into a dense model
    pub fn to_dense(&self) -> LinearRegression {
        let mut dense = LinearRegression::new(self.n_features);
        dense.set_bias(self.bias);
        for (&j, &c) in &self.coefficients {
            dense.set_coefficient(j, c);
        }
        dense
    }
}

impl LinearModel for SparseLinearRegression {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn bias(&self) -> f64 {
        self.bias
    }

    fn set_bias(&mut self, bias: f64) {
        self.bias = bias;
    }

    fn coefficient(&self, feature: usize) -> f64 {
        self.coefficients.get(&feature).copied().unwrap_or(0.0)
    }

    fn set_coefficient(&mut self, feature: usize, value: f64) {
        assert!(
            feature < self.n_features,
            "feature {feature} out of range for {} features",
            self.n_features
        );
        if value == 0.0 {
            self.coefficients.remove(&feature);
        } else {
            self.coefficients.insert(feature, value);
        }
    }

    fn nonzero_coefficients(&self) -> Vec<(usize, f64)> {
        self.coefficients.iter().map(|(&j, &c)| (j, c)).collect()
    }

    fn n_nonzero(&self) -> usize {
        self.coefficients.len()
    }
}
