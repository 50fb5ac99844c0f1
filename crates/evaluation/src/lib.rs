//! Evaluation & Reporting
//!
//! Thresholded predictions, accuracy, an sklearn-style classification
//! report, and console renderings of the confusion matrix and training
//! curves. All output is plain text aimed at the terminal.

mod confusion;
mod curves;
mod report;

pub use confusion::ConfusionMatrix;
pub use curves::{render_curve, sparkline};
pub use report::{binarize_labels, classification_report, threshold_predictions};

/// Fraction of predictions agreeing with the targets.
pub fn accuracy(predictions: &[bool], targets: &[bool]) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .zip(targets.iter())
        .filter(|(p, t)| p == t)
        .count();
    correct as f64 / predictions.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        let preds = [true, false, true, true];
        let targets = [true, false, false, true];
        assert!((accuracy(&preds, &targets) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_accuracy_empty() {
        assert_eq!(accuracy(&[], &[]), 0.0);
    }
}
