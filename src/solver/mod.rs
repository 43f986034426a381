//! Coordinate-descent solver components
//!
//! This module implements the building blocks of the weighted elastic-net
//! coordinate descent described in "Regularization paths for generalized
//! linear models via coordinate descent" by Friedman, Hastie and Tibshirani:
//! the objective, the per-coordinate and bias updates over an incrementally
//! maintained score cache, and the active-set tracker.

pub mod active_set;
pub mod coordinate;
pub mod objective;

pub use self::active_set::*;
pub use self::coordinate::*;
pub use self::objective::*;
