//! Signal Preprocessing
//!
//! Row-independent transforms applied to flux matrices before training:
//! unit-norm scaling, Gaussian smoothing, and FFT magnitude.

mod error;
mod normalize;
mod smooth;
mod spectrum;

pub use error::SignalError;
pub use normalize::l2_normalize_rows;
pub use smooth::GaussianSmoother;
pub use spectrum::SpectrumAnalyzer;
