//! Per-Row L2 Normalization

use ndarray::Array2;
use tracing::debug;

/// Scale every row of the matrix to unit L2 norm.
///
/// An all-zero row has no direction to preserve and is left untouched
/// instead of dividing by zero.
pub fn l2_normalize_rows(matrix: &Array2<f64>) -> Array2<f64> {
    let mut out = matrix.clone();
    let mut zero_rows = 0usize;
    for mut row in out.rows_mut() {
        let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            row.mapv_inplace(|v| v / norm);
        } else {
            zero_rows += 1;
        }
    }
    if zero_rows > 0 {
        debug!("{} all-zero rows left unnormalized", zero_rows);
    }
    out
}
