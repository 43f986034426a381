//! Weighted elastic-net linear regression by coordinate descent
//!
//! Based on "Regularization paths for generalized linear models via coordinate
//! descent" by Jerome Friedman, Trevor Hastie and Rob Tibshirani

pub mod api;
pub mod cache;
pub mod core;
pub mod data;
pub mod model;
pub mod optimizer;
pub mod solver;

// Re-export main types for convenience
pub use crate::api::{
    lambda_max, ElasticNet, FittedModel, ModelInfo, PathPoint, RegressionMetrics,
    RegularizationPath,
};
pub use crate::cache::{CacheStats, CurvatureCache};
pub use crate::core::error::{ElasticNetError, Result};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::data::{LibSVMDataset, SparseDataset};
pub use crate::model::{LinearRegression, SparseLinearRegression};
pub use crate::optimizer::{ElasticNetOptimizer, TerminationMode, Terminator};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
