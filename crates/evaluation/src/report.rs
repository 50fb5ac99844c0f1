//! Classification Report

use crate::ConfusionMatrix;

/// Threshold probabilities into hard predictions.
pub fn threshold_predictions(probabilities: &[f64], cutoff: f64) -> Vec<bool> {
    probabilities.iter().map(|&p| p > cutoff).collect()
}

/// Convert {0, 1} float labels into booleans.
pub fn binarize_labels(labels: &[f64]) -> Vec<bool> {
    labels.iter().map(|&v| v > 0.5).collect()
}

/// Per-class precision / recall / F1 / support table with macro
/// averages, formatted like the familiar sklearn report.
pub fn classification_report(
    matrix: &ConfusionMatrix,
    negative_name: &str,
    positive_name: &str,
) -> String {
    let width = negative_name.len().max(positive_name.len()).max(12);
    let mut out = String::new();
    out.push_str(&format!(
        "{:>w$}  {:>9} {:>9} {:>9} {:>9}\n\n",
        "",
        "precision",
        "recall",
        "f1-score",
        "support",
        w = width
    ));
    for (name, positive) in [(negative_name, false), (positive_name, true)] {
        out.push_str(&format!(
            "{:>w$}  {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
            name,
            matrix.precision(positive),
            matrix.recall(positive),
            matrix.f1(positive),
            matrix.support(positive),
            w = width
        ));
    }
    out.push('\n');
    out.push_str(&format!(
        "{:>w$}  {:>9} {:>9} {:>9.2} {:>9}\n",
        "accuracy",
        "",
        "",
        matrix.accuracy(),
        matrix.total(),
        w = width
    ));
    let macro_precision = (matrix.precision(false) + matrix.precision(true)) / 2.0;
    let macro_recall = (matrix.recall(false) + matrix.recall(true)) / 2.0;
    let macro_f1 = (matrix.f1(false) + matrix.f1(true)) / 2.0;
    out.push_str(&format!(
        "{:>w$}  {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
        "macro avg",
        macro_precision,
        macro_recall,
        macro_f1,
        matrix.total(),
        w = width
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_at_half() {
        let probs = [0.1, 0.5, 0.50001, 0.9];
        assert_eq!(
            threshold_predictions(&probs, 0.5),
            vec![false, false, true, true]
        );
    }

    #[test]
    fn test_binarize() {
        assert_eq!(binarize_labels(&[0.0, 1.0, 0.0]), vec![false, true, false]);
    }

    #[test]
    fn test_report_contains_classes_and_averages() {
        let targets = binarize_labels(&[0.0, 0.0, 0.0, 1.0, 1.0]);
        let preds = binarize_labels(&[0.0, 0.0, 1.0, 1.0, 0.0]);
        let matrix = ConfusionMatrix::from_predictions(&preds, &targets);
        let report = classification_report(&matrix, "no transit", "transit confirmed");
        assert!(report.contains("no transit"));
        assert!(report.contains("transit confirmed"));
        assert!(report.contains("macro avg"));
        assert!(report.contains("accuracy"));
    }
}
