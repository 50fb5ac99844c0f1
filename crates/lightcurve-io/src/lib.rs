//! Light Curve Ingestion
//!
//! Loads the exoplanet CSV datasets, shuffles rows, and extracts the binary
//! label column with min-max rescaling.

mod error;
mod labels;
mod loader;

pub use error::DatasetError;
pub use labels::rescale_binary_labels;
pub use loader::{load_flux_table, FluxTable};
