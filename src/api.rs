//! High-level API for elastic-net regression
//!
//! This module wraps [`ElasticNetOptimizer`] for the common tasks: fitting a
//! model, predicting, evaluating, and tracing a regularization path.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use elasticnet::api::ElasticNet;
//! use elasticnet::LibSVMDataset;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (data, labels) = LibSVMDataset::from_file("train.libsvm")?.into_parts()?;
//!
//! let fitted = ElasticNet::new()
//!     .with_regularization(0.1)
//!     .with_l1_ratio(0.5)
//!     .fit(&data, &labels)?;
//!
//! println!("R²: {:.4}", fitted.evaluate(&data, &labels)?.r2);
//! # Ok(())
//! # }
//! ```

use crate::core::{
    validate_l1_ratio, ElasticNetError, FeatureStore, LinearModel, OptimizerConfig, Result,
    SparseView,
};
use crate::model::LinearRegression;
use crate::optimizer::ElasticNetOptimizer;
use log::{debug, info};
use serde::Serialize;

/// Elastic-net regression with builder-style configuration
#[derive(Debug, Clone, Default)]
pub struct ElasticNet {
    config: OptimizerConfig,
    instance_weights: Option<Vec<f64>>,
}

impl ElasticNet {
    /// Unpenalized least squares with the default termination policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the penalty strength λ
    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.config.regularization = regularization;
        self
    }

    /// Set the L1 share α of the penalty
    pub fn with_l1_ratio(mut self, l1_ratio: f64) -> Self {
        self.config.l1_ratio = l1_ratio;
        self
    }

    pub fn with_active_set(mut self, active_set: bool) -> Self {
        self.config.active_set = active_set;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set both the absolute and the relative convergence tolerance
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.config.absolute_epsilon = epsilon;
        self.config.relative_epsilon = epsilon;
        self
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: OptimizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Weight each data point; defaults to unit weights
    pub fn with_instance_weights(mut self, weights: Vec<f64>) -> Self {
        self.instance_weights = Some(weights);
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Fit a model starting from all-zero weights
    pub fn fit<F>(&self, data: &F, labels: &[f64]) -> Result<FittedModel>
    where
        F: FeatureStore + ?Sized,
    {
        self.fit_warm(data, labels, LinearRegression::new(data.n_features()))
    }

    /// Fit a model starting from `initial`
    pub fn fit_warm<F>(
        &self,
        data: &F,
        labels: &[f64],
        initial: LinearRegression,
    ) -> Result<FittedModel>
    where
        F: FeatureStore + ?Sized,
    {
        if data.is_empty() {
            return Err(ElasticNetError::EmptyDataset);
        }

        let mut model = initial;
        let (loss, iterations) = {
            let mut optimizer =
                ElasticNetOptimizer::new(&mut model, data, labels)?.with_config(&self.config)?;
            if let Some(weights) = &self.instance_weights {
                optimizer = optimizer.with_instance_weights(weights)?;
            }
            optimizer.optimize()?;

            let stats = optimizer.curvature_stats();
            debug!(
                "curvature cache: {} hits, {} misses",
                stats.hits, stats.misses
            );
            (
                optimizer.last_loss().unwrap_or(f64::NAN),
                optimizer.terminator().iterations(),
            )
        };

        info!(
            "fitted {} of {} coefficients in {} iterations, loss = {:.6}",
            model.n_nonzero(),
            model.n_features(),
            iterations,
            loss
        );

        Ok(FittedModel {
            model,
            loss,
            iterations,
        })
    }
}

/// Fitted linear model with its training summary
#[derive(Debug, Clone)]
pub struct FittedModel {
    model: LinearRegression,
    loss: f64,
    iterations: usize,
}

impl FittedModel {
    /// Predict the target of a single row
    ///
    /// # Panics
    /// Panics if the row holds a feature index >= the model's `n_features()`;
    /// use [`predict_dataset`](Self::predict_dataset) for checked input.
    pub fn predict_row(&self, row: SparseView<'_>) -> f64 {
        self.model.predict(row)
    }

    /// Predict every row of a dataset
    pub fn predict_dataset<F>(&self, data: &F) -> Result<Vec<f64>>
    where
        F: FeatureStore + ?Sized,
    {
        if data.n_features() > self.model.n_features() {
            return Err(ElasticNetError::DimensionMismatch {
                expected: self.model.n_features(),
                actual: data.n_features(),
            });
        }
        Ok((0..data.n_samples())
            .map(|i| self.predict_row(data.row(i)))
            .collect())
    }

    /// Regression metrics against `labels`
    pub fn evaluate<F>(&self, data: &F, labels: &[f64]) -> Result<RegressionMetrics>
    where
        F: FeatureStore + ?Sized,
    {
        if labels.len() != data.n_samples() {
            return Err(ElasticNetError::DimensionMismatch {
                expected: data.n_samples(),
                actual: labels.len(),
            });
        }
        if labels.is_empty() {
            return Err(ElasticNetError::EmptyDataset);
        }
        let predictions = self.predict_dataset(data)?;
        Ok(RegressionMetrics::new(&predictions, labels))
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            bias: self.model.bias(),
            n_features: self.model.n_features(),
            n_nonzero: self.model.n_nonzero(),
            loss: self.loss,
            iterations: self.iterations,
        }
    }

    /// Objective value at the fitted weights
    pub fn loss(&self) -> f64 {
        self.loss
    }

    pub fn model(&self) -> &LinearRegression {
        &self.model
    }

    pub fn into_model(self) -> LinearRegression {
        self.model
    }
}

/// Regression quality of a set of predictions
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    /// Coefficient of determination; 0 when the labels are constant
    pub r2: f64,
}

impl RegressionMetrics {
    fn new(predictions: &[f64], labels: &[f64]) -> Self {
        let n = labels.len() as f64;
        let mean = labels.iter().sum::<f64>() / n;

        let mut squared = 0.0;
        let mut absolute = 0.0;
        let mut total = 0.0;
        for (&prediction, &label) in predictions.iter().zip(labels) {
            let residual = label - prediction;
            squared += residual * residual;
            absolute += residual.abs();
            total += (label - mean).powi(2);
        }

        let mse = squared / n;
        Self {
            mse,
            rmse: mse.sqrt(),
            mae: absolute / n,
            r2: if total > 0.0 { 1.0 - squared / total } else { 0.0 },
        }
    }
}

/// Model information
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub bias: f64,
    pub n_features: usize,
    pub n_nonzero: usize,
    pub loss: f64,
    pub iterations: usize,
}

/// Smallest λ at which every coefficient stays at zero
///
/// With all coefficients at zero the bias settles at the weighted label mean
/// `ȳ`, and feature `j` stays at zero while `|Σ_i w_i x_ij (y_i - ȳ)| / ΣW <= λα`.
/// Undefined for a pure ridge penalty, so `l1_ratio` must be positive.
pub fn lambda_max<F>(
    data: &F,
    labels: &[f64],
    weights: Option<&[f64]>,
    l1_ratio: f64,
) -> Result<f64>
where
    F: FeatureStore + ?Sized,
{
    validate_l1_ratio(l1_ratio)?;
    if l1_ratio == 0.0 {
        return Err(ElasticNetError::InvalidParameter(
            "lambda max is unbounded for a pure L2 penalty".to_string(),
        ));
    }
    if labels.len() != data.n_samples() {
        return Err(ElasticNetError::DimensionMismatch {
            expected: data.n_samples(),
            actual: labels.len(),
        });
    }
    if let Some(weights) = weights {
        if weights.len() != labels.len() {
            return Err(ElasticNetError::DimensionMismatch {
                expected: labels.len(),
                actual: weights.len(),
            });
        }
    }

    let weight = |i: usize| weights.map_or(1.0, |w| w[i]);
    let sum_weights: f64 = (0..labels.len()).map(weight).sum();
    if sum_weights == 0.0 {
        return Ok(0.0);
    }
    let mean = (0..labels.len()).map(|i| weight(i) * labels[i]).sum::<f64>() / sum_weights;

    let max_correlation = (0..data.n_features())
        .map(|j| {
            data.column(j)
                .iter()
                .map(|(i, x)| weight(i) * x * (labels[i] - mean))
                .sum::<f64>()
                .abs()
        })
        .fold(0.0, f64::max);

    Ok(max_correlation / (sum_weights * l1_ratio))
}

/// One fitted point of a regularization path
#[derive(Debug, Clone)]
pub struct PathPoint {
    pub regularization: f64,
    pub n_nonzero: usize,
    pub loss: f64,
    pub model: LinearRegression,
}

/// Fits a descending grid of λ values, each warm-started from the previous fit
///
/// The grid is geometric from [`lambda_max`] down to `ratio * lambda_max`.
#[derive(Debug, Clone)]
pub struct RegularizationPath {
    estimator: ElasticNet,
    n_lambdas: usize,
    ratio: f64,
}

impl RegularizationPath {
    /// `estimator` supplies every setting except λ
    pub fn new(estimator: ElasticNet, n_lambdas: usize, ratio: f64) -> Result<Self> {
        if n_lambdas == 0 {
            return Err(ElasticNetError::InvalidParameter(
                "a regularization path needs at least one lambda".to_string(),
            ));
        }
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(ElasticNetError::InvalidParameter(format!(
                "path ratio must be in (0, 1], got: {ratio}"
            )));
        }
        Ok(Self {
            estimator,
            n_lambdas,
            ratio,
        })
    }

    /// λ values of the grid, largest first
    pub fn lambdas<F>(&self, data: &F, labels: &[f64]) -> Result<Vec<f64>>
    where
        F: FeatureStore + ?Sized,
    {
        let top = lambda_max(
            data,
            labels,
            self.estimator.instance_weights.as_deref(),
            self.estimator.config.l1_ratio,
        )?;
        if self.n_lambdas == 1 {
            return Ok(vec![top]);
        }
        let steps = (self.n_lambdas - 1) as f64;
        Ok((0..self.n_lambdas)
            .map(|k| top * self.ratio.powf(k as f64 / steps))
            .collect())
    }

    pub fn fit<F>(&self, data: &F, labels: &[f64]) -> Result<Vec<PathPoint>>
    where
        F: FeatureStore + ?Sized,
    {
        let lambdas = self.lambdas(data, labels)?;
        let mut points = Vec::with_capacity(lambdas.len());
        let mut model = LinearRegression::new(data.n_features());

        for regularization in lambdas {
            let fitted = self
                .estimator
                .clone()
                .with_regularization(regularization)
                .fit_warm(data, labels, model)?;
            debug!(
                "lambda = {:.6e}: {} nonzero, loss = {:.6}",
                regularization,
                fitted.info().n_nonzero,
                fitted.loss()
            );

            let loss = fitted.loss();
            model = fitted.into_model();
            points.push(PathPoint {
                regularization,
                n_nonzero: model.n_nonzero(),
                loss,
                model: model.clone(),
            });
        }

        Ok(points)
    }
}
