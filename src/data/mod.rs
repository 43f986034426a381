//! Feature stores and data loading
//!
//! [`SparseDataset`] is the in-memory [`FeatureStore`](crate::core::FeatureStore)
//! used by the optimizer; [`LibSVMDataset`] reads one from the libsvm text format.

pub mod libsvm;
pub mod sparse;

pub use self::libsvm::*;
pub use self::sparse::*;
