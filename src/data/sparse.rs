//! In-memory sparse feature store
//!
//! Keeps every non-zero twice: once per data point (row-major, used to
//! initialize scores and to predict) and once per feature (column-major, used
//! by the coordinate updates).

use crate::core::{ElasticNetError, FeatureStore, Result, SparseVector, SparseView};

/// Sparse dataset with both row and column access
#[derive(Debug, Clone)]
pub struct SparseDataset {
    rows: Vec<SparseVector>,
    columns: Vec<SparseVector>,
    n_features: usize,
}

impl SparseDataset {
    /// Build from sparse rows; every feature index must be `< n_features`
    pub fn from_rows(rows: Vec<SparseVector>, n_features: usize) -> Result<Self> {
        let mut columns = vec![SparseVector::empty(); n_features];

        for (i, row) in rows.iter().enumerate() {
            for (j, x) in row.view() {
                let column = columns.get_mut(j).ok_or_else(|| {
                    ElasticNetError::InvalidDataset(format!(
                        "row {i} references feature {j} but the dataset has {n_features} features"
                    ))
                })?;
                // Rows are visited in order, so column indices stay sorted
                column.indices.push(i);
                column.values.push(x);
            }
        }

        Ok(Self {
            rows,
            columns,
            n_features,
        })
    }

    /// Build from dense rows of equal length, dropping exact zeros
    pub fn from_dense(rows: &[Vec<f64>]) -> Result<Self> {
        let n_features = rows.first().map_or(0, |r| r.len());
        if let Some((i, bad)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_features) {
            return Err(ElasticNetError::InvalidDataset(format!(
                "row {i} has {} values, expected {n_features}",
                bad.len()
            )));
        }

        let sparse_rows = rows.iter().map(|r| SparseVector::from_dense(r)).collect();
        Self::from_rows(sparse_rows, n_features)
    }

    /// All rows, in data point order
    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    /// Total number of stored non-zeros
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(SparseVector::nnz).sum()
    }
}

impl FeatureStore for SparseDataset {
    fn n_samples(&self) -> usize {
        self.rows.len()
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn row(&self, i: usize) -> SparseView<'_> {
        self.rows[i].view()
    }

    fn column(&self, j: usize) -> SparseView<'_> {
        self.columns[j].view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_mirror_rows() {
        let dataset = SparseDataset::from_dense(&[
            vec![1.0, 0.0, 2.0],
            vec![0.0, 3.0, 0.0],
            vec![4.0, 0.0, 5.0],
        ])
        .unwrap();

        assert_eq!(dataset.n_samples(), 3);
        assert_eq!(dataset.n_features(), 3);
        assert_eq!(dataset.nnz(), 5);

        let col0: Vec<_> = dataset.column(0).iter().collect();
        assert_eq!(col0, vec![(0, 1.0), (2, 4.0)]);
        let col1: Vec<_> = dataset.column(1).iter().collect();
        assert_eq!(col1, vec![(1, 3.0)]);

        let row2: Vec<_> = dataset.row(2).iter().collect();
        assert_eq!(row2, vec![(0, 4.0), (2, 5.0)]);
    }

    #[test]
    fn test_all_zero_column_is_empty() {
        let dataset = SparseDataset::from_dense(&[vec![1.0, 0.0], vec![2.0, 0.0]]).unwrap();
        assert!(dataset.column(1).is_empty());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = SparseDataset::from_dense(&[vec![1.0, 2.0], vec![1.0]]);
        assert!(matches!(result, Err(ElasticNetError::InvalidDataset(_))));
    }

    #[test]
    fn test_out_of_range_feature_rejected() {
        let rows = vec![SparseVector::new(vec![0, 7], vec![1.0, 1.0])];
        let result = SparseDataset::from_rows(rows, 3);
        assert!(matches!(result, Err(ElasticNetError::InvalidDataset(_))));
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = SparseDataset::from_rows(Vec::new(), 2).unwrap();
        assert!(dataset.is_empty());
        assert_eq!(dataset.n_features(), 2);
        assert!(dataset.column(0).is_empty());
    }
}
