//! Error types for the elastic-net optimizer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ElasticNetError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ElasticNetError>;
