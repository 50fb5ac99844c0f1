//! Binary Confusion Matrix

use serde::{Deserialize, Serialize};

/// Confusion matrix for a binary classifier.
///
/// Rows are true classes, columns predicted classes, negative class
/// first, as the usual heatmap is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_positives: usize,
}

impl ConfusionMatrix {
    /// Tally thresholded predictions against {0, 1} targets.
    pub fn from_predictions(predictions: &[bool], targets: &[bool]) -> Self {
        let mut matrix = Self::default();
        for (&pred, &target) in predictions.iter().zip(targets.iter()) {
            match (target, pred) {
                (false, false) => matrix.true_negatives += 1,
                (false, true) => matrix.false_positives += 1,
                (true, false) => matrix.false_negatives += 1,
                (true, true) => matrix.true_positives += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.true_negatives + self.false_positives + self.false_negatives + self.true_positives
    }

    pub fn accuracy(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        (self.true_negatives + self.true_positives) as f64 / self.total() as f64
    }

    /// Number of true samples of a class
    pub fn support(&self, positive: bool) -> usize {
        if positive {
            self.true_positives + self.false_negatives
        } else {
            self.true_negatives + self.false_positives
        }
    }

    pub fn precision(&self, positive: bool) -> f64 {
        let (hit, miss) = if positive {
            (self.true_positives, self.false_positives)
        } else {
            (self.true_negatives, self.false_negatives)
        };
        ratio(hit, hit + miss)
    }

    pub fn recall(&self, positive: bool) -> f64 {
        let (hit, miss) = if positive {
            (self.true_positives, self.false_negatives)
        } else {
            (self.true_negatives, self.false_positives)
        };
        ratio(hit, hit + miss)
    }

    pub fn f1(&self, positive: bool) -> f64 {
        let p = self.precision(positive);
        let r = self.recall(positive);
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// Render the matrix as a shaded console heatmap with annotated
    /// counts.
    pub fn render_heatmap(&self) -> String {
        let cells = [
            [self.true_negatives, self.false_positives],
            [self.false_negatives, self.true_positives],
        ];
        let max = cells.iter().flatten().copied().max().unwrap_or(0).max(1);

        let mut out = String::new();
        out.push_str(&format!("{:>12} {:^14} {:^14}\n", "", "pred 0", "pred 1"));
        for (row, label) in cells.iter().zip(["true 0", "true 1"]) {
            out.push_str(&format!("{:>12} ", label));
            for &count in row {
                out.push_str(&format!("{:^14}", format!("{} {}", shade(count, max), count)));
            }
            out.push('\n');
        }
        out
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Four-step intensity shading for the heatmap cells.
fn shade(count: usize, max: usize) -> &'static str {
    let level = count * 4 / max.max(1);
    match level {
        0 => "░░",
        1 => "▒▒",
        2 | 3 => "▓▓",
        _ => "██",
    }
}
