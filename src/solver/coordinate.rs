//! Weighted elastic-net coordinate descent
//!
//! Implements the per-coordinate updates of Friedman, Hastie and Tibshirani,
//! "Regularization paths for generalized linear models via coordinate
//! descent" (2010), for a weighted squared-error loss with an unpenalized bias.
//!
//! The state of one optimization run lives in [`CoordinateDescent`]: the model
//! being fitted and the score cache `score_i = bias + Σ_j β_j x_ij`, which is
//! patched after every coefficient or bias change and never recomputed.

use crate::cache::CurvatureCache;
use crate::core::{ElasticNetError, FeatureStore, LinearModel, Result};
use crate::solver::active_set::ActiveSet;
use crate::solver::objective::{self, ElasticNetPenalty};
use log::trace;

/// Soft-threshold operator `S(z, γ)`
///
/// Returns `z - γ` when `z > 0` and `γ < |z|`, `z + γ` when `z < 0` and
/// `γ < |z|`, and `0` otherwise; in particular `S(±γ, γ) == 0`.
pub fn soft_threshold(z: f64, gamma: f64) -> f64 {
    if z > 0.0 && gamma < z.abs() {
        return z - gamma;
    }
    if z < 0.0 && gamma < z.abs() {
        return z + gamma;
    }
    0.0
}

/// Mutable state of a single coordinate-descent run
///
/// Holds exclusive access to the model for the duration of the run. Every
/// update leaves `scores()` equal to the model's predictions on the training
/// rows, up to floating point rounding.
pub struct CoordinateDescent<'a, M, F>
where
    M: LinearModel + ?Sized,
    F: FeatureStore + ?Sized,
{
    model: &'a mut M,
    data: &'a F,
    labels: &'a [f64],
    weights: &'a [f64],
    sum_weights: f64,
    penalty: ElasticNetPenalty,
    curvature: &'a mut CurvatureCache,
    scores: Vec<f64>,
}

impl<'a, M, F> CoordinateDescent<'a, M, F>
where
    M: LinearModel + ?Sized,
    F: FeatureStore + ?Sized,
{
    /// Start a run, computing the score cache from the model's current weights
    ///
    /// `labels` and `weights` must have one entry per data point; the caller
    /// is responsible for that check.
    pub fn new(
        model: &'a mut M,
        data: &'a F,
        labels: &'a [f64],
        weights: &'a [f64],
        sum_weights: f64,
        penalty: ElasticNetPenalty,
        curvature: &'a mut CurvatureCache,
    ) -> Self {
        debug_assert_eq!(labels.len(), data.n_samples());
        debug_assert_eq!(weights.len(), data.n_samples());

        let scores = (0..data.n_samples())
            .map(|i| model.predict(data.row(i)))
            .collect();

        Self {
            model,
            data,
            labels,
            weights,
            sum_weights,
            penalty,
            curvature,
            scores,
        }
    }

    /// Current score cache
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn model(&self) -> &M {
        &*self.model
    }

    /// Objective value at the current weights
    pub fn loss(&self) -> f64 {
        objective::loss(
            &*self.model,
            &self.penalty,
            &self.scores,
            self.labels,
            self.weights,
            self.sum_weights,
        )
    }

    /// Scores recomputed from scratch, bypassing the cache
    pub fn recomputed_scores(&self) -> Vec<f64> {
        (0..self.data.n_samples())
            .map(|i| self.model.predict(self.data.row(i)))
            .collect()
    }

    /// Bias update followed by one update of every feature in index order
    pub fn full_sweep(&mut self) -> Result<()> {
        let n_features = self.data.n_features();
        self.sweep(0..n_features)
    }

    /// Bias update followed by updates of the active features only
    pub fn active_sweep(&mut self, active: &ActiveSet) -> Result<()> {
        self.sweep(active.iter())
    }

    fn sweep<I>(&mut self, features: I) -> Result<()>
    where
        I: IntoIterator<Item = usize>,
    {
        if self.sum_weights == 0.0 {
            self.zero_weight_sweep();
            return Ok(());
        }

        self.update_bias();
        for feature in features {
            self.update_feature(feature);
        }

        self.check_finite()
    }

    /// Without any weight only the penalty can be minimized. With a penalty
    /// that minimizer is the zero vector; without one nothing can be learned
    /// and the coefficients stay as they are.
    fn zero_weight_sweep(&mut self) {
        if self.penalty.regularization() > 0.0 {
            for (feature, _) in self.model.nonzero_coefficients() {
                self.model.set_coefficient(feature, 0.0);
            }
            let bias = self.model.bias();
            self.scores.iter_mut().for_each(|s| *s = bias);
            trace!("zero total weight: all coefficients forced to zero");
        }
    }

    /// Closed-form bias update: weighted mean of the residuals plus the old bias
    pub fn update_bias(&mut self) {
        let old_bias = self.model.bias();
        let new_bias = self
            .weights
            .iter()
            .zip(self.labels)
            .zip(&self.scores)
            .map(|((&w, &y), &s)| w * (y - s + old_bias))
            .sum::<f64>()
            / self.sum_weights;
        self.model.set_bias(new_bias);

        let difference = new_bias - old_bias;
        if difference != 0.0 {
            self.scores.iter_mut().for_each(|s| *s += difference);
        }
    }

    /// Minimize the objective exactly along one coordinate
    ///
    /// The partial residual is formed as if the feature were removed from the
    /// model, then soft-thresholded, then rescaled by the penalized curvature.
    pub fn update_feature(&mut self, feature: usize) {
        let data = self.data;
        let column = data.column(feature);
        let old_coeff = self.model.coefficient(feature);

        let mut fit = 0.0;
        let curvature = match self.curvature.get(feature) {
            Some(curvature) => {
                for (i, x) in column.iter() {
                    let partial_residual = self.labels[i] - self.scores[i] + x * old_coeff;
                    fit += self.weights[i] * x * partial_residual;
                }
                curvature
            }
            None => {
                let mut curvature = 0.0;
                for (i, x) in column.iter() {
                    let partial_residual = self.labels[i] - self.scores[i] + x * old_coeff;
                    let wx = self.weights[i] * x;
                    fit += wx * partial_residual;
                    curvature += x * wx;
                }
                self.curvature.put(feature, curvature);
                curvature
            }
        };

        let fit = fit / self.sum_weights;
        let numerator = soft_threshold(fit, self.penalty.l1_strength());
        let denominator = curvature / self.sum_weights + self.penalty.l2_strength();
        // A zero denominator means the feature never meets any weight
        let new_coeff = if denominator != 0.0 {
            numerator / denominator
        } else {
            0.0
        };

        self.model.set_coefficient(feature, new_coeff);

        let difference = new_coeff - old_coeff;
        if difference != 0.0 {
            for (i, x) in column.iter() {
                self.scores[i] += difference * x;
            }
        }
    }

    /// Surface NaN or infinite state instead of letting it spread
    pub fn check_finite(&self) -> Result<()> {
        let bias = self.model.bias();
        if !bias.is_finite() {
            return Err(ElasticNetError::NumericalInstability(format!(
                "bias became {bias}"
            )));
        }
        if let Some((i, score)) = self.scores.iter().enumerate().find(|(_, s)| !s.is_finite()) {
            return Err(ElasticNetError::NumericalInstability(format!(
                "score of data point {i} became {score}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SparseDataset;
    use crate::model::{LinearRegression, SparseLinearRegression};
    use approx::assert_relative_eq;

    fn correlated_dataset() -> (SparseDataset, Vec<f64>, Vec<f64>) {
        let rows = vec![
            vec![1.0, 0.5, 0.0, 0.0],
            vec![2.0, 0.0, 1.0, 0.0],
            vec![0.0, 1.5, 2.0, 0.0],
            vec![3.0, 1.0, 0.0, 0.0],
            vec![1.0, 0.0, -1.0, 0.0],
            vec![0.5, 2.0, 1.0, 0.0],
        ];
        let labels = vec![2.0, 3.5, 1.0, 5.0, 0.5, 2.5];
        let weights = vec![1.0, 2.0, 0.5, 1.0, 1.5, 1.0];
        (SparseDataset::from_dense(&rows).unwrap(), labels, weights)
    }

    #[test]
    fn test_soft_threshold_branches() {
        assert_eq!(soft_threshold(3.0, 1.0), 2.0);
        assert_eq!(soft_threshold(-3.0, 1.0), -2.0);
        assert_eq!(soft_threshold(0.5, 1.0), 0.0);
        assert_eq!(soft_threshold(-0.5, 1.0), 0.0);
        assert_eq!(soft_threshold(0.0, 0.0), 0.0);
        assert_eq!(soft_threshold(2.5, 0.0), 2.5);
    }

    #[test]
    fn test_soft_threshold_boundaries() {
        let gamma = 0.75;
        assert_eq!(soft_threshold(gamma, gamma), 0.0);
        assert_eq!(soft_threshold(-gamma, gamma), 0.0);
    }

    #[test]
    fn test_scores_initialized_from_warm_start() {
        let (data, labels, weights) = correlated_dataset();
        let mut model = LinearRegression::with_weights(0.5, vec![1.0, -1.0, 0.0, 2.0]);
        let mut cache = CurvatureCache::new(16);

        let state = CoordinateDescent::new(
            &mut model,
            &data,
            &labels,
            &weights,
            7.0,
            ElasticNetPenalty::none(),
            &mut cache,
        );

        // Row 0: 0.5 + 1.0 * 1.0 - 1.0 * 0.5
        assert_relative_eq!(state.scores()[0], 1.0, epsilon = 1e-12);
        assert_eq!(state.scores(), state.recomputed_scores().as_slice());
    }

    #[test]
    fn test_score_cache_matches_recomputation() {
        let (data, labels, weights) = correlated_dataset();
        let sum_weights = weights.iter().sum();
        let mut model = LinearRegression::with_weights(-1.0, vec![0.3, 0.0, -0.7, 5.0]);
        let mut cache = CurvatureCache::new(16);
        let penalty = ElasticNetPenalty::new(0.1, 0.5).unwrap();

        let mut state = CoordinateDescent::new(
            &mut model,
            &data,
            &labels,
            &weights,
            sum_weights,
            penalty,
            &mut cache,
        );

        for _ in 0..4 {
            state.full_sweep().unwrap();
            let active = ActiveSet::from_model(state.model());
            state.active_sweep(&active).unwrap();
        }

        let recomputed = state.recomputed_scores();
        for (cached, fresh) in state.scores().iter().zip(&recomputed) {
            assert_relative_eq!(*cached, *fresh, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_all_zero_column_gets_zero_coefficient() {
        let (data, labels, weights) = correlated_dataset();
        let sum_weights = weights.iter().sum();
        // Feature 3 never appears, but starts with a non-zero coefficient
        let mut model = LinearRegression::with_weights(0.0, vec![0.0, 0.0, 0.0, 4.0]);
        let mut cache = CurvatureCache::new(16);

        let mut state = CoordinateDescent::new(
            &mut model,
            &data,
            &labels,
            &weights,
            sum_weights,
            ElasticNetPenalty::none(),
            &mut cache,
        );
        state.full_sweep().unwrap();

        assert_eq!(state.model().coefficient(3), 0.0);
    }

    #[test]
    fn test_single_feature_update_is_weighted_least_squares() {
        let data = SparseDataset::from_dense(&[vec![1.0], vec![2.0], vec![-1.0]]).unwrap();
        let labels = vec![1.0, 3.0, -2.0];
        let weights = vec![1.0, 2.0, 1.0];
        let mut model = LinearRegression::new(1);
        let mut cache = CurvatureCache::new(4);

        let mut state = CoordinateDescent::new(
            &mut model,
            &data,
            &labels,
            &weights,
            4.0,
            ElasticNetPenalty::none(),
            &mut cache,
        );
        state.update_feature(0);

        // Σwxy / Σwx² with the bias held at zero
        let expected = (1.0 + 12.0 + 2.0) / (1.0 + 8.0 + 1.0);
        assert_relative_eq!(state.model().coefficient(0), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_single_feature_update_applies_threshold_then_ridge() {
        let data = SparseDataset::from_dense(&[vec![1.0], vec![-1.0]]).unwrap();
        let labels = vec![2.0, -2.0];
        let weights = vec![1.0, 1.0];
        let mut model = LinearRegression::new(1);
        let mut cache = CurvatureCache::new(4);
        // λ = 1, α = 0.5: fit = 2, S(2, 0.5) = 1.5, denominator = 1 + 0.5
        let penalty = ElasticNetPenalty::new(1.0, 0.5).unwrap();

        let mut state =
            CoordinateDescent::new(&mut model, &data, &labels, &weights, 2.0, penalty, &mut cache);
        state.update_feature(0);

        assert_relative_eq!(state.model().coefficient(0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(state.scores()[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(state.scores()[1], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bias_update_is_weighted_mean_residual() {
        let data = SparseDataset::from_dense(&[vec![0.0], vec![0.0]]).unwrap();
        let labels = vec![1.0, 4.0];
        let weights = vec![2.0, 1.0];
        let mut model = LinearRegression::new(1);
        let mut cache = CurvatureCache::new(4);

        let mut state = CoordinateDescent::new(
            &mut model,
            &data,
            &labels,
            &weights,
            3.0,
            ElasticNetPenalty::none(),
            &mut cache,
        );
        state.update_bias();

        assert_relative_eq!(state.model().bias(), 2.0, epsilon = 1e-12);
        assert_eq!(state.scores(), &[2.0, 2.0]);
    }

    #[test]
    fn test_curvature_is_cached_across_sweeps() {
        let (data, labels, weights) = correlated_dataset();
        let sum_weights = weights.iter().sum();
        let mut model = LinearRegression::new(4);
        let mut cache = CurvatureCache::new(16);

        {
            let mut state = CoordinateDescent::new(
                &mut model,
                &data,
                &labels,
                &weights,
                sum_weights,
                ElasticNetPenalty::none(),
                &mut cache,
            );
            state.full_sweep().unwrap();
            state.full_sweep().unwrap();
        }

        let stats = cache.stats();
        assert_eq!(stats.misses, 4);
        assert_eq!(stats.hits, 4);
    }

    #[test]
    fn test_cached_curvature_gives_identical_fit() {
        let (data, labels, weights) = correlated_dataset();
        let sum_weights = weights.iter().sum();
        let penalty = ElasticNetPenalty::new(0.05, 0.3).unwrap();

        let mut cached_model = LinearRegression::new(4);
        let mut uncached_model = LinearRegression::new(4);
        let mut cache = CurvatureCache::new(16);
        let mut no_cache = CurvatureCache::new(0);

        let mut cached = CoordinateDescent::new(
            &mut cached_model,
            &data,
            &labels,
            &weights,
            sum_weights,
            penalty,
            &mut cache,
        );
        let mut uncached = CoordinateDescent::new(
            &mut uncached_model,
            &data,
            &labels,
            &weights,
            sum_weights,
            penalty,
            &mut no_cache,
        );
        for _ in 0..3 {
            cached.full_sweep().unwrap();
            uncached.full_sweep().unwrap();
        }

        assert_eq!(cached.model(), uncached.model());
    }

    #[test]
    fn test_zero_weight_sweep_with_penalty_zeroes_coefficients() {
        let (data, labels, _) = correlated_dataset();
        let weights = vec![0.0; 6];
        let mut model = SparseLinearRegression::new(4);
        model.set_coefficient(0, 1.0);
        model.set_coefficient(2, -3.0);
        model.set_bias(0.25);
        let mut cache = CurvatureCache::new(16);
        let penalty = ElasticNetPenalty::new(0.1, 1.0).unwrap();

        let mut state =
            CoordinateDescent::new(&mut model, &data, &labels, &weights, 0.0, penalty, &mut cache);
        state.full_sweep().unwrap();

        assert_eq!(state.model().n_nonzero(), 0);
        assert_eq!(state.model().bias(), 0.25);
        assert_eq!(state.scores(), state.recomputed_scores().as_slice());
    }

    #[test]
    fn test_zero_weight_sweep_without_penalty_leaves_model() {
        let (data, labels, _) = correlated_dataset();
        let weights = vec![0.0; 6];
        let mut model = LinearRegression::with_weights(0.25, vec![1.0, 0.0, -3.0, 0.0]);
        let before = model.clone();
        let mut cache = CurvatureCache::new(16);

        {
            let mut state = CoordinateDescent::new(
                &mut model,
                &data,
                &labels,
                &weights,
                0.0,
                ElasticNetPenalty::none(),
                &mut cache,
            );
            state.full_sweep().unwrap();
        }

        assert_eq!(model, before);
    }

    #[test]
    fn test_non_finite_labels_are_reported() {
        let data = SparseDataset::from_dense(&[vec![1.0], vec![2.0]]).unwrap();
        let labels = vec![f64::NAN, 1.0];
        let weights = vec![1.0, 1.0];
        let mut model = LinearRegression::new(1);
        let mut cache = CurvatureCache::new(4);

        let mut state = CoordinateDescent::new(
            &mut model,
            &data,
            &labels,
            &weights,
            2.0,
            ElasticNetPenalty::none(),
            &mut cache,
        );

        assert!(matches!(
            state.full_sweep(),
            Err(ElasticNetError::NumericalInstability(_))
        ));
    }
}
