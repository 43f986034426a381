//! Active-set tracking
//!
//! The active set is the set of features whose coefficient is currently
//! non-zero. When a strong L1 penalty keeps most coefficients at exactly zero,
//! sweeping only the active features skips work that would leave those zeros
//! in place; periodic full sweeps catch features that should re-enter.
//!
//! The set is always rebuilt from the model after a full sweep, never patched.

use crate::core::LinearModel;
use std::iter::Copied;
use std::slice::Iter;

/// Sorted set of feature indices with a non-zero coefficient
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveSet {
    features: Vec<usize>,
}

impl ActiveSet {
    /// Collect the non-zero coefficients of `model`
    pub fn from_model<M: LinearModel + ?Sized>(model: &M) -> Self {
        Self {
            features: model
                .nonzero_coefficients()
                .into_iter()
                .map(|(feature, _)| feature)
                .collect(),
        }
    }

    /// Build from arbitrary indices; duplicates are merged
    pub fn from_features<I: IntoIterator<Item = usize>>(features: I) -> Self {
        let mut features: Vec<usize> = features.into_iter().collect();
        features.sort_unstable();
        features.dedup();
        Self { features }
    }

    /// Number of active features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Check if no feature is active
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Check if `feature` is active
    pub fn contains(&self, feature: usize) -> bool {
        self.features.binary_search(&feature).is_ok()
    }

    /// Active features in ascending order
    pub fn iter(&self) -> Copied<Iter<'_, usize>> {
        self.features.iter().copied()
    }

    /// Get the active features as a sorted slice
    pub fn as_slice(&self) -> &[usize] {
        &self.features
    }

    /// Whether `latest` contains exactly the same features as `self`
    ///
    /// Sets of different size are changed. Sets of the same size must still
    /// agree member by member: one feature leaving while another enters keeps
    /// the size but is not a stable active set.
    pub fn is_unchanged(&self, latest: &ActiveSet) -> bool {
        if self.len() != latest.len() {
            return false;
        }
        self.features
            .iter()
            .zip(&latest.features)
            .all(|(a, b)| a == b)
    }
}
