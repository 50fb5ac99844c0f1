//! Gaussian Smoothing Filter

use ndarray::Array2;

/// Truncation point of the Gaussian kernel, in standard deviations.
const TRUNCATE: f64 = 4.0;

/// Fixed-width Gaussian smoothing applied independently to each row.
///
/// Kernel radius is `truncate * sigma + 0.5` rounded down and boundaries
/// are handled by reflection, so filtering never changes the row length.
pub struct GaussianSmoother {
    sigma: f64,
    kernel: Vec<f64>,
}

impl GaussianSmoother {
    /// Create a smoother for the given standard deviation (in samples).
    /// `sigma <= 0` yields the identity filter.
    pub fn new(sigma: f64) -> Self {
        Self::with_truncate(sigma, TRUNCATE)
    }

    /// Create a smoother with an explicit truncation point.
    pub fn with_truncate(sigma: f64, truncate: f64) -> Self {
        let kernel = if sigma > 0.0 {
            let radius = (truncate * sigma + 0.5) as usize;
            let mut weights = Vec::with_capacity(2 * radius + 1);
            for offset in -(radius as isize)..=(radius as isize) {
                let x = offset as f64;
                weights.push((-0.5 * x * x / (sigma * sigma)).exp());
            }
            let total: f64 = weights.iter().sum();
            for w in &mut weights {
                *w /= total;
            }
            weights
        } else {
            vec![1.0]
        };
        Self { sigma, kernel }
    }

    /// Kernel radius in samples
    pub fn radius(&self) -> usize {
        self.kernel.len() / 2
    }

    /// Smoothing width
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Smooth a single row.
    pub fn smooth_row(&self, row: &[f64]) -> Vec<f64> {
        let n = row.len() as isize;
        if n == 0 || self.kernel.len() == 1 {
            return row.to_vec();
        }
        let radius = self.radius() as isize;
        let mut out = Vec::with_capacity(row.len());
        for center in 0..n {
            let mut acc = 0.0;
            for (k, &weight) in self.kernel.iter().enumerate() {
                let idx = reflect(center - radius + k as isize, n);
                acc += weight * row[idx];
            }
            out.push(acc);
        }
        out
    }

    /// Smooth every row of a matrix.
    pub fn smooth_rows(&self, matrix: &Array2<f64>) -> Array2<f64> {
        let mut out = matrix.clone();
        for mut row in out.rows_mut() {
            let values: Vec<f64> = row.to_vec();
            let smoothed = self.smooth_row(&values);
            for (dst, src) in row.iter_mut().zip(smoothed) {
                *dst = src;
            }
        }
        out
    }
}

/// Half-sample symmetric reflection: ... d c b a | a b c d | d c b a ...
fn reflect(mut index: isize, len: isize) -> usize {
    loop {
        if index < 0 {
            index = -index - 1;
        } else if index >= len {
            index = 2 * len - index - 1;
        } else {
            return index as usize;
        }
    }
}
