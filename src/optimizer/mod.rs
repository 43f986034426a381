//! Elastic-net optimizer
//!
//! [`ElasticNetOptimizer`] fits a [`LinearModel`] in place by minimizing
//!
//! `Σ_i w_i (y_i - score_i)² / (2 ΣW) + λ [(1-α)/2 ‖β‖₂² + α ‖β‖₁]`
//!
//! with cyclic coordinate descent. Two drivers are available:
//!
//! * normal mode: bias update plus a sweep over every feature, repeated until
//!   the [`Terminator`] sees the loss converge;
//! * active-set mode: after one full sweep, up to [`ACTIVE_SET_SWEEPS`] sweeps
//!   restricted to the non-zero coefficients, then a full sweep, repeated until
//!   the active set is the same on both sides of a full sweep.
//!
//! The termination signal differs by mode. Normal mode reports the loss after
//! every sweep. Active-set mode reports a constant `1.0` per sweep and switches
//! the terminator to [`TerminationMode::FinishMaxIter`], so the terminator acts
//! as a sweep budget while convergence is decided by active-set stability.

pub mod terminator;

pub use self::terminator::*;

use crate::cache::{CacheStats, CurvatureCache};
use crate::core::{
    ElasticNetError, FeatureStore, LinearModel, OptimizerConfig, Result,
};
use crate::solver::{ActiveSet, CoordinateDescent, ElasticNetPenalty};
use log::debug;
use std::borrow::Cow;

/// Maximum number of active-set-only sweeps between two full sweeps
pub const ACTIVE_SET_SWEEPS: usize = 5;

/// Weighted elastic-net linear regression optimizer
///
/// Borrows the model mutably for its whole lifetime, so nothing else can read
/// or write the weights while an optimization is configured or running.
///
/// ```rust
/// use elasticnet::{ElasticNetOptimizer, LinearModel, LinearRegression, SparseDataset};
///
/// # fn main() -> elasticnet::Result<()> {
/// let data = SparseDataset::from_dense(&[vec![1.0, 0.0], vec![0.0, 2.0], vec![1.0, 1.0]])?;
/// let labels = [1.0, 4.0, 3.0];
/// let mut model = LinearRegression::new(2);
///
/// let mut optimizer = ElasticNetOptimizer::new(&mut model, &data, &labels)?;
/// optimizer.set_regularization(0.01)?;
/// optimizer.set_l1_ratio(0.5)?;
/// optimizer.optimize()?;
///
/// assert!(model.coefficient(1) > 0.0);
/// # Ok(())
/// # }
/// ```
pub struct ElasticNetOptimizer<'a, M, F>
where
    M: LinearModel + ?Sized,
    F: FeatureStore + ?Sized,
{
    model: &'a mut M,
    data: &'a F,
    labels: &'a [f64],
    instance_weights: Cow<'a, [f64]>,
    sum_weights: f64,
    penalty: ElasticNetPenalty,
    active_set: bool,
    terminator: Terminator,
    curvature: CurvatureCache,
    last_loss: Option<f64>,
}

impl<'a, M, F> ElasticNetOptimizer<'a, M, F>
where
    M: LinearModel + ?Sized,
    F: FeatureStore + ?Sized,
{
    /// Create an optimizer with unit instance weights and no penalty
    pub fn new(model: &'a mut M, data: &'a F, labels: &'a [f64]) -> Result<Self> {
        let n_samples = data.n_samples();
        if labels.len() != n_samples {
            return Err(ElasticNetError::DimensionMismatch {
                expected: n_samples,
                actual: labels.len(),
            });
        }
        if model.n_features() != data.n_features() {
            return Err(ElasticNetError::DimensionMismatch {
                expected: data.n_features(),
                actual: model.n_features(),
            });
        }

        let config = OptimizerConfig::default();
        Ok(Self {
            model,
            data,
            labels,
            instance_weights: Cow::Owned(vec![1.0; n_samples]),
            sum_weights: n_samples as f64,
            penalty: ElasticNetPenalty::none(),
            active_set: config.active_set,
            terminator: Terminator::from_config(&config),
            curvature: CurvatureCache::new(config.cache_size),
            last_loss: None,
        })
    }

    /// Use per-point instance weights; the total weight is recomputed
    pub fn with_instance_weights(mut self, weights: &'a [f64]) -> Result<Self> {
        if weights.len() != self.labels.len() {
            return Err(ElasticNetError::DimensionMismatch {
                expected: self.labels.len(),
                actual: weights.len(),
            });
        }
        self.sum_weights = weights.iter().sum();
        self.instance_weights = Cow::Borrowed(weights);
        self.curvature.clear();
        Ok(self)
    }

    /// Use a precomputed total weight instead of summing the instance weights
    pub fn with_sum_weights(mut self, sum_weights: f64) -> Self {
        self.sum_weights = sum_weights;
        self
    }

    /// Apply hyperparameters, mode, termination policy and cache size
    pub fn with_config(mut self, config: &OptimizerConfig) -> Result<Self> {
        config.validate()?;
        self.penalty = ElasticNetPenalty::new(config.regularization, config.l1_ratio)?;
        self.active_set = config.active_set;
        self.terminator = Terminator::from_config(config);
        self.curvature = CurvatureCache::new(config.cache_size);
        Ok(self)
    }

    /// Set the penalty strength; negative or non-finite values are rejected
    pub fn set_regularization(&mut self, regularization: f64) -> Result<()> {
        self.penalty = ElasticNetPenalty::new(regularization, self.penalty.l1_ratio())?;
        Ok(())
    }

    /// Set the L1 share of the penalty; values outside [0, 1] are rejected
    pub fn set_l1_ratio(&mut self, l1_ratio: f64) -> Result<()> {
        self.penalty = ElasticNetPenalty::new(self.penalty.regularization(), l1_ratio)?;
        Ok(())
    }

    /// Enable or disable active-set sweeps
    pub fn set_active_set(&mut self, active_set: bool) {
        self.active_set = active_set;
    }

    /// Replace the termination policy
    pub fn set_terminator(&mut self, terminator: Terminator) {
        self.terminator = terminator;
    }

    /// Get the penalty strength
    pub fn regularization(&self) -> f64 {
        self.penalty.regularization()
    }

    /// Get the L1 share of the penalty
    pub fn l1_ratio(&self) -> f64 {
        self.penalty.l1_ratio()
    }

    /// Check if active-set sweeps are enabled
    pub fn is_active_set(&self) -> bool {
        self.active_set
    }

    /// Get the total instance weight
    pub fn sum_weights(&self) -> f64 {
        self.sum_weights
    }

    /// Termination policy, including the signals of the last run
    pub fn terminator(&self) -> &Terminator {
        &self.terminator
    }

    /// Objective value when the last [`optimize`](Self::optimize) call returned
    pub fn last_loss(&self) -> Option<f64> {
        self.last_loss
    }

    /// Get hit and miss counts of the curvature cache
    pub fn curvature_stats(&self) -> CacheStats {
        self.curvature.stats()
    }

    /// Fit the model in place
    ///
    /// Each call starts a fresh termination count from the model's current
    /// weights, so repeated calls continue from a warm start. Active-set runs
    /// use the policy as a sweep budget and restore its mode on return.
    pub fn optimize(&mut self) -> Result<()> {
        debug!(
            "optimizing {} data points x {} features: regularization = {}, l1 ratio = {}, active set = {}",
            self.data.n_samples(),
            self.data.n_features(),
            self.penalty.regularization(),
            self.penalty.l1_ratio(),
            self.active_set
        );

        self.terminator.reset();
        self.last_loss = None;
        if self.active_set {
            let mode = self.terminator.mode();
            self.terminator.set_mode(TerminationMode::FinishMaxIter);
            let result = self.active_set_optimize();
            self.terminator.set_mode(mode);
            result
        } else {
            self.normal_optimize()
        }
    }

    fn normal_optimize(&mut self) -> Result<()> {
        let mut state = CoordinateDescent::new(
            &mut *self.model,
            self.data,
            self.labels,
            &self.instance_weights,
            self.sum_weights,
            self.penalty,
            &mut self.curvature,
        );
        state.check_finite()?;
        let terminator = &mut self.terminator;

        debug!("initial loss = {}", state.loss());

        loop {
            state.full_sweep()?;
            let loss = state.loss();
            debug!("loss = {loss}");
            terminator.add(loss);
            if terminator.should_terminate() {
                debug!("final loss = {loss}");
                self.last_loss = Some(loss);
                break;
            }
        }

        Ok(())
    }

    fn active_set_optimize(&mut self) -> Result<()> {
        let mut state = CoordinateDescent::new(
            &mut *self.model,
            self.data,
            self.labels,
            &self.instance_weights,
            self.sum_weights,
            self.penalty,
            &mut self.curvature,
        );
        state.check_finite()?;
        let terminator = &mut self.terminator;

        state.full_sweep()?;
        terminator.add(1.0);
        let mut active = ActiveSet::from_model(state.model());
        debug!("initial active set has {} features", active.len());

        loop {
            for _ in 0..ACTIVE_SET_SWEEPS {
                state.active_sweep(&active)?;
                terminator.add(1.0);
                if terminator.should_terminate() {
                    break;
                }
            }

            state.full_sweep()?;
            terminator.add(1.0);
            if terminator.should_terminate() {
                debug!(
                    "sweep budget of {} exhausted before the active set settled",
                    terminator.max_iterations()
                );
                break;
            }

            let latest = ActiveSet::from_model(state.model());
            let unchanged = active.is_unchanged(&latest);
            debug!(
                "active set: {} -> {} features ({})",
                active.len(),
                latest.len(),
                if unchanged { "stable" } else { "changed" }
            );
            active = latest;
            if unchanged {
                break;
            }
        }

        let loss = state.loss();
        debug!(
            "final loss = {} after {} sweeps",
            loss,
            terminator.iterations()
        );
        self.last_loss = Some(loss);
        Ok(())
    }
}
