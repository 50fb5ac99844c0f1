//! Binary Cross-Entropy Loss

use ndarray::Array1;

/// Logistic sigmoid
pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Mean binary cross-entropy computed in the numerically stable logits
/// form, plus its gradient with respect to the logits.
///
/// Loss per sample: `max(z, 0) - z*y + ln(1 + e^(-|z|))`.
/// Gradient per sample: `(sigmoid(z) - y) / batch`.
pub fn bce_with_logits(logits: &Array1<f64>, targets: &Array1<f64>) -> (f64, Array1<f64>) {
    let batch = logits.len().max(1) as f64;
    let mut total = 0.0;
    let mut grad = Array1::zeros(logits.len());
    for (i, (&z, &y)) in logits.iter().zip(targets.iter()).enumerate() {
        total += z.max(0.0) - z * y + (1.0 + (-z.abs()).exp()).ln();
        grad[i] = (sigmoid(z) - y) / batch;
    }
    (total / batch, grad)
}
