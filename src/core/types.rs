//! Core type definitions for the elastic-net optimizer

use crate::core::{ElasticNetError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::iter::{Copied, Zip};
use std::path::Path;
use std::slice::Iter;

/// Sparse vector representation with sorted indices
#[derive(Clone, Debug, PartialEq)]
pub struct SparseVector {
    /// Sorted indices of non-zero elements
    pub indices: Vec<usize>,
    /// Values corresponding to indices
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Create a new sparse vector, ensuring indices are sorted
    pub fn new(indices: Vec<usize>, values: Vec<f64>) -> Self {
        assert_eq!(
            indices.len(),
            values.len(),
            "Indices and values must have same length"
        );

        // Sort by indices
        let mut pairs: Vec<_> = indices.into_iter().zip(values).collect();
        pairs.sort_by_key(|&(idx, _)| idx);

        let (indices, values): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        Self { indices, values }
    }

    /// Create an empty sparse vector
    pub fn empty() -> Self {
        Self {
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build from a dense slice, keeping only entries that are not exactly zero
    pub fn from_dense(dense: &[f64]) -> Self {
        let (indices, values) = dense
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v != 0.0)
            .map(|(i, &v)| (i, v))
            .unzip();
        Self { indices, values }
    }

    /// Get the value at a specific index (0 if not present)
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Borrow this vector as a [`SparseView`]
    pub fn view(&self) -> SparseView<'_> {
        SparseView {
            indices: &self.indices,
            values: &self.values,
        }
    }

    /// Compute squared L2 norm
    pub fn norm_squared(&self) -> f64 {
        self.values.iter().map(|&v| v * v).sum()
    }

    /// Number of non-zero elements
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Check if vector is empty
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Borrowed view over the non-zero entries of a row or a column.
///
/// Iterating a view is lazy and can be restarted any number of times, which
/// is what the coordinate update needs: one pass to accumulate the partial
/// residual and a second pass to patch the scores.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SparseView<'a> {
    pub indices: &'a [usize],
    pub values: &'a [f64],
}

impl<'a> SparseView<'a> {
    pub fn new(indices: &'a [usize], values: &'a [f64]) -> Self {
        debug_assert_eq!(indices.len(), values.len());
        Self { indices, values }
    }

    /// Iterate `(index, value)` pairs in ascending index order
    pub fn iter(&self) -> Zip<Copied<Iter<'a, usize>>, Copied<Iter<'a, f64>>> {
        self.indices
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// Dot product with a dense vector indexed by the same coordinates
    pub fn dot_dense(&self, dense: &[f64]) -> f64 {
        self.iter().map(|(i, x)| dense[i] * x).sum()
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl<'a> IntoIterator for SparseView<'a> {
    type Item = (usize, f64);
    type IntoIter = Zip<Copied<Iter<'a, usize>>, Copied<Iter<'a, f64>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Configuration for the elastic-net optimizer
///
/// Every field has a default, so a JSON configuration file only needs to name
/// the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Overall penalty strength (lambda), must be >= 0
    pub regularization: f64,
    /// Share of the penalty given to the L1 term (alpha), in [0, 1]
    pub l1_ratio: f64,
    /// Restrict most sweeps to the currently non-zero coefficients
    pub active_set: bool,
    /// Maximum number of signals the termination policy accepts
    pub max_iterations: usize,
    /// Minimum number of signals before convergence may be declared
    pub min_iterations: usize,
    /// Absolute loss change regarded as stable
    pub absolute_epsilon: f64,
    /// Relative loss change regarded as stable
    pub relative_epsilon: f64,
    /// Consecutive stable signals required to declare convergence
    pub max_stable_iterations: usize,
    /// Curvature cache capacity in entries (0 disables the cache)
    pub cache_size: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            regularization: 0.0,
            l1_ratio: 0.0,
            active_set: false,
            max_iterations: 500,
            min_iterations: 0,
            absolute_epsilon: 1e-9,
            relative_epsilon: 1e-4,
            max_stable_iterations: 5,
            cache_size: 65_536,
        }
    }
}

impl OptimizerConfig {
    /// Parse a configuration from a JSON string and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file and validate it
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check every field, failing on the first invalid one
    pub fn validate(&self) -> Result<()> {
        validate_regularization(self.regularization)?;
        validate_l1_ratio(self.l1_ratio)?;

        if self.max_iterations == 0 {
            return Err(ElasticNetError::InvalidParameter(
                "max_iterations must be positive".to_string(),
            ));
        }
        if self.max_stable_iterations == 0 {
            return Err(ElasticNetError::InvalidParameter(
                "max_stable_iterations must be positive".to_string(),
            ));
        }
        for (name, value) in [
            ("absolute_epsilon", self.absolute_epsilon),
            ("relative_epsilon", self.relative_epsilon),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ElasticNetError::InvalidParameter(format!(
                    "{name} must be a non-negative finite number, got {value}"
                )));
            }
        }

        Ok(())
    }
}

/// Regularization strength must be finite and non-negative
pub fn validate_regularization(regularization: f64) -> Result<()> {
    if !regularization.is_finite() || regularization < 0.0 {
        return Err(ElasticNetError::InvalidParameter(format!(
            "regularization must be a non-negative finite number, got {regularization}"
        )));
    }
    Ok(())
}

/// L1 ratio must lie in [0, 1]
pub fn validate_l1_ratio(l1_ratio: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&l1_ratio) {
        return Err(ElasticNetError::InvalidParameter(format!(
            "l1_ratio must be in [0, 1], got {l1_ratio}"
        )));
    }
    Ok(())
}
