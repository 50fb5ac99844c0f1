//! Random Oversampler Implementation

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{info, warn};

use crate::BalanceError;

/// Per-class row counts of a binary label column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassCounts {
    /// Rows labeled 1.0
    pub positive: usize,
    /// Rows labeled 0.0
    pub negative: usize,
}

impl ClassCounts {
    /// Count classes in a rescaled {0, 1} label column.
    pub fn from_labels(labels: &Array1<f64>) -> Self {
        let positive = labels.iter().filter(|&&v| v > 0.5).count();
        Self {
            positive,
            negative: labels.len() - positive,
        }
    }

    /// Size of the smaller class
    pub fn minority(&self) -> usize {
        self.positive.min(self.negative)
    }

    /// Size of the larger class
    pub fn majority(&self) -> usize {
        self.positive.max(self.negative)
    }

    /// Minority-to-majority ratio, 0.0 when the set is single-class
    pub fn ratio(&self) -> f64 {
        if self.majority() == 0 {
            0.0
        } else {
            self.minority() as f64 / self.majority() as f64
        }
    }
}

/// Random minority oversampling by duplication with replacement,
/// targeting a fixed minority-to-majority ratio.
///
/// Majority rows are never dropped or altered; the output keeps the
/// original rows as a prefix and appends the duplicates.
pub struct RandomOversampler {
    target_ratio: f64,
    rng: StdRng,
}

impl RandomOversampler {
    /// Create an oversampler for the given target ratio in (0, 1].
    pub fn new(target_ratio: f64, rng: StdRng) -> Result<Self, BalanceError> {
        if !(target_ratio > 0.0 && target_ratio <= 1.0) {
            return Err(BalanceError::InvalidRatio { ratio: target_ratio });
        }
        Ok(Self { target_ratio, rng })
    }

    /// Resample the minority class up to `target_ratio * majority` rows.
    pub fn fit_resample(
        &mut self,
        features: &Array2<f64>,
        labels: &Array1<f64>,
    ) -> Result<(Array2<f64>, Array1<f64>), BalanceError> {
        if features.nrows() != labels.len() {
            return Err(BalanceError::LengthMismatch {
                rows: features.nrows(),
                labels: labels.len(),
            });
        }

        let counts = ClassCounts::from_labels(labels);
        if counts.positive == 0 || counts.negative == 0 {
            return Err(BalanceError::SingleClass);
        }

        if counts.ratio() >= self.target_ratio {
            warn!(
                "Set already at ratio {:.3} >= target {:.3}, leaving unchanged",
                counts.ratio(),
                self.target_ratio
            );
            return Ok((features.clone(), labels.clone()));
        }

        let minority_label = if counts.positive < counts.negative { 1.0 } else { 0.0 };
        let minority_rows: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &v)| (v > 0.5) == (minority_label > 0.5))
            .map(|(i, _)| i)
            .collect();

        let target = (self.target_ratio * counts.majority() as f64).round() as usize;
        let extra = target - counts.minority();

        let mut resampled = features.clone();
        let mut new_labels = labels.to_vec();
        for _ in 0..extra {
            let pick = minority_rows[self.rng.gen_range(0..minority_rows.len())];
            resampled.push_row(features.row(pick)).map_err(|_| {
                BalanceError::LengthMismatch {
                    rows: resampled.nrows(),
                    labels: new_labels.len(),
                }
            })?;
            new_labels.push(minority_label);
        }

        let after = ClassCounts::from_labels(&Array1::from_vec(new_labels.clone()));
        info!(
            "Oversampled minority ({}): {} -> {} rows, majority {} untouched",
            if minority_label > 0.5 { "positive" } else { "negative" },
            counts.minority(),
            after.minority(),
            after.majority()
        );

        debug_assert_eq!(resampled.len_of(Axis(0)), new_labels.len());
        Ok((resampled, Array1::from_vec(new_labels)))
    }
}
