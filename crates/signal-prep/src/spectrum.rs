//! FFT Magnitude Transform

use ndarray::Array2;
use rustfft::{num_complex::Complex, FftPlanner};

use crate::SignalError;

/// Computes the discrete Fourier transform magnitude of flux rows.
///
/// The full N-bin magnitude spectrum is kept (both conjugate-symmetric
/// halves); phase is discarded.
pub struct SpectrumAnalyzer {
    planner: FftPlanner<f64>,
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Magnitude spectrum of a single row.
    pub fn magnitude_row(&mut self, row: &[f64]) -> Result<Vec<f64>, SignalError> {
        let n = row.len();
        if n == 0 {
            return Err(SignalError::EmptySequence);
        }

        let mut buffer: Vec<Complex<f64>> =
            row.iter().map(|&v| Complex::new(v, 0.0)).collect();

        let fft = self.planner.plan_fft_forward(n);
        fft.process(&mut buffer);

        Ok(buffer.iter().map(|c| c.norm()).collect())
    }

    /// Magnitude spectrum of every row of a matrix. Row length is
    /// preserved; a zero-row matrix passes through unchanged.
    pub fn magnitude_rows(&mut self, matrix: &Array2<f64>) -> Result<Array2<f64>, SignalError> {
        if matrix.nrows() == 0 {
            return Ok(matrix.clone());
        }
        let mut out = matrix.clone();
        for mut row in out.rows_mut() {
            let values: Vec<f64> = row.to_vec();
            let magnitudes = self.magnitude_row(&values)?;
            for (dst, src) in row.iter_mut().zip(magnitudes) {
                *dst = src;
            }
        }
        Ok(out)
    }
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
