//! Class Balancing
//!
//! Corrects training-set imbalance by randomly duplicating minority-class
//! rows up to a target minority-to-majority ratio. The evaluation set is
//! never resampled.

mod oversample;

pub use oversample::{ClassCounts, RandomOversampler};

use thiserror::Error;

/// Errors during class rebalancing
#[derive(Debug, Clone, Error)]
pub enum BalanceError {
    /// Target ratio outside (0, 1]
    #[error("Target ratio {ratio} is outside (0, 1]")]
    InvalidRatio { ratio: f64 },

    /// Feature matrix and label column disagree on row count
    #[error("Feature matrix has {rows} rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },

    /// Both classes must be present to balance
    #[error("Cannot balance a single-class training set")]
    SingleClass,
}
