//! Weighted elastic-net objective
//!
//! `loss = Σ_i w_i (y_i - score_i)² / (2 ΣW) + λ [(1-α)/2 ‖β‖₂² + α ‖β‖₁]`
//!
//! where `λ` is the regularization strength, `α` the L1 ratio and `β` the
//! coefficients without the bias.

use crate::core::{LinearModel, Result};
use crate::core::{validate_l1_ratio, validate_regularization};

/// Elastic-net penalty with its two per-term strengths precomputed
///
/// The coordinate update needs `λα` (soft-threshold level) and `λ(1-α)`
/// (ridge curvature) for every feature of every sweep; they are computed once
/// here instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticNetPenalty {
    regularization: f64,
    l1_ratio: f64,
    l1_strength: f64,
    l2_strength: f64,
}

impl ElasticNetPenalty {
    /// Validated penalty; fails on negative strength or a ratio outside [0, 1]
    pub fn new(regularization: f64, l1_ratio: f64) -> Result<Self> {
        validate_regularization(regularization)?;
        validate_l1_ratio(l1_ratio)?;
        Ok(Self {
            regularization,
            l1_ratio,
            l1_strength: regularization * l1_ratio,
            l2_strength: regularization * (1.0 - l1_ratio),
        })
    }

    /// No penalty at all (ordinary weighted least squares)
    pub fn none() -> Self {
        Self {
            regularization: 0.0,
            l1_ratio: 0.0,
            l1_strength: 0.0,
            l2_strength: 0.0,
        }
    }

    pub fn regularization(&self) -> f64 {
        self.regularization
    }

    pub fn l1_ratio(&self) -> f64 {
        self.l1_ratio
    }

    /// `λα`, the soft-threshold level
    pub fn l1_strength(&self) -> f64 {
        self.l1_strength
    }

    /// `λ(1-α)`, added to every feature's curvature
    pub fn l2_strength(&self) -> f64 {
        self.l2_strength
    }

    /// Penalty value for the model's coefficients (bias excluded)
    pub fn value<M: LinearModel + ?Sized>(&self, model: &M) -> f64 {
        let (l2_squared, l1) = model
            .nonzero_coefficients()
            .iter()
            .fold((0.0, 0.0), |(l2, l1), &(_, c)| (l2 + c * c, l1 + c.abs()));
        self.regularization * ((1.0 - self.l1_ratio) * 0.5 * l2_squared + self.l1_ratio * l1)
    }
}

/// Weighted squared error term `Σ w (y - s)² / (2 ΣW)`
///
/// With a total weight of zero the data carry no information and the term is
/// defined as zero rather than `0 / 0`.
pub fn weighted_squared_error(scores: &[f64], labels: &[f64], weights: &[f64], sum_weights: f64) -> f64 {
    if sum_weights == 0.0 {
        return 0.0;
    }
    let sse: f64 = scores
        .iter()
        .zip(labels)
        .zip(weights)
        .map(|((&s, &y), &w)| w * (y - s).powi(2))
        .sum();
    sse / (2.0 * sum_weights)
}

/// Full objective for a model whose predictions are `scores`
pub fn loss<M: LinearModel + ?Sized>(
    model: &M,
    penalty: &ElasticNetPenalty,
    scores: &[f64],
    labels: &[f64],
    weights: &[f64],
    sum_weights: f64,
) -> f64 {
    weighted_squared_error(scores, labels, weights, sum_weights) + penalty.value(model)
}
