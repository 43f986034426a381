//! LibSVM format reader
//!
//! Supports loading regression data in the libsvm format:
//! label index:value index:value ...
//!
//! Example:
//! 1.25 1:0.5 3:1.2 7:0.8
//! -0.3 2:0.3 5:2.1

use crate::core::{ElasticNetError, Result, SparseVector};
use crate::data::SparseDataset;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Rows and real-valued labels read from a LibSVM format source
#[derive(Debug, Clone)]
pub struct LibSVMDataset {
    rows: Vec<SparseVector>,
    labels: Vec<f64>,
    dimensions: usize,
}

impl LibSVMDataset {
    /// Load a dataset from a LibSVM format file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(ElasticNetError::IoError)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Load a dataset from a reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        let mut dimensions = 0;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(ElasticNetError::IoError)?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (row, label) = Self::parse_line(line).map_err(|e| {
                ElasticNetError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
            })?;
            if let Some(&last) = row.indices.last() {
                dimensions = dimensions.max(last + 1);
            }
            rows.push(row);
            labels.push(label);
        }

        if rows.is_empty() {
            return Err(ElasticNetError::EmptyDataset);
        }

        Ok(Self {
            rows,
            labels,
            dimensions,
        })
    }

    /// Parse a single line in libsvm format
    fn parse_line(line: &str) -> Result<(SparseVector, f64)> {
        let mut parts = line.split_whitespace();

        let label_str = parts
            .next()
            .ok_or_else(|| ElasticNetError::ParseError("Empty line".to_string()))?;
        let label = label_str
            .parse::<f64>()
            .map_err(|_| ElasticNetError::ParseError(format!("Invalid label: {label_str}")))?;

        let mut indices = Vec::new();
        let mut values = Vec::new();

        for feature_str in parts {
            let (index_str, value_str) = feature_str.split_once(':').ok_or_else(|| {
                ElasticNetError::ParseError(format!("Invalid feature format: {feature_str}"))
            })?;

            let index = index_str.parse::<usize>().map_err(|_| {
                ElasticNetError::ParseError(format!("Invalid feature index: {index_str}"))
            })?;
            let value = value_str.parse::<f64>().map_err(|_| {
                ElasticNetError::ParseError(format!("Invalid feature value: {value_str}"))
            })?;

            // libsvm uses 1-based indexing
            if index == 0 {
                return Err(ElasticNetError::ParseError(
                    "Feature index must be positive: 0".to_string(),
                ));
            }

            // Explicit zeros carry no information for a sparse store
            if value != 0.0 {
                indices.push(index - 1);
                values.push(value);
            }
        }

        Ok((SparseVector::new(indices, values), label))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Highest referenced feature index plus one
    pub fn dim(&self) -> usize {
        self.dimensions
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    /// Split into a feature store and its labels
    pub fn into_parts(self) -> Result<(SparseDataset, Vec<f64>)> {
        let n_features = self.dimensions;
        self.into_parts_with_features(n_features)
    }

    /// Split into a feature store with a fixed width, e.g. to match a model
    /// fitted on another file
    pub fn into_parts_with_features(self, n_features: usize) -> Result<(SparseDataset, Vec<f64>)> {
        if self.dimensions > n_features {
            return Err(ElasticNetError::DimensionMismatch {
                expected: n_features,
                actual: self.dimensions,
            });
        }
        let dataset = SparseDataset::from_rows(self.rows, n_features)?;
        Ok((dataset, self.labels))
    }
}
