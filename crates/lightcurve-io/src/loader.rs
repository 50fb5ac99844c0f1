//! Flux Table Loading

use std::path::Path;

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};

use crate::DatasetError;

/// Column layout of the exoplanet CSV files: label, one non-feature
/// metadata column, then the flux readings.
const LABEL_COLUMN: usize = 0;
const DROPPED_COLUMN: usize = 1;
const MIN_COLUMNS: usize = 3;

/// A loaded dataset: one flux time-series per row plus raw labels.
#[derive(Debug, Clone)]
pub struct FluxTable {
    /// Flux readings, one fixed-length row per star
    pub features: Array2<f64>,
    /// Raw label column, not yet rescaled
    pub labels: Array1<f64>,
}

impl FluxTable {
    /// Number of rows (stars)
    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    /// Flux sequence length
    pub fn seq_len(&self) -> usize {
        self.features.ncols()
    }

    /// Apply a random row permutation (Fisher-Yates) to features and
    /// labels together.
    pub fn shuffle_rows(&mut self, rng: &mut StdRng) {
        let n = self.n_rows();
        if n < 2 {
            return;
        }
        let mut perm: Vec<usize> = (0..n).collect();
        for i in (1..n).rev() {
            let j = rng.gen_range(0..=i);
            perm.swap(i, j);
        }
        self.features = self.features.select(Axis(0), &perm);
        self.labels = self.labels.select(Axis(0), &perm);
        debug!("Shuffled {} rows", n);
    }
}

/// Load a flux table from a headered CSV file.
///
/// The first column is the label, the second is dropped as non-feature
/// metadata, and the remainder become the feature matrix. Every data row
/// must have the same width as the first.
pub fn load_flux_table(path: &Path) -> Result<FluxTable, DatasetError> {
    let path_text = path.display().to_string();
    // Flexible so that row-width validation happens here, with row
    // context, instead of inside the csv crate
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|source| DatasetError::Csv {
            path: path_text.clone(),
            source,
        })?;

    let mut labels: Vec<f64> = Vec::new();
    let mut flux: Vec<f64> = Vec::new();
    let mut width: Option<usize> = None;

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|source| DatasetError::Csv {
            path: path_text.clone(),
            source,
        })?;

        let expected = *width.get_or_insert(record.len());
        if record.len() != expected {
            return Err(DatasetError::RaggedRow {
                row,
                found: record.len(),
                expected,
            });
        }
        if expected < MIN_COLUMNS {
            return Err(DatasetError::TooFewColumns {
                columns: expected,
                min: MIN_COLUMNS,
            });
        }

        for (column, cell) in record.iter().enumerate() {
            if column == DROPPED_COLUMN {
                continue;
            }
            let value: f64 =
                cell.trim()
                    .parse()
                    .map_err(|_| DatasetError::BadCell {
                        row,
                        column,
                        value: cell.to_string(),
                    })?;
            if column == LABEL_COLUMN {
                labels.push(value);
            } else {
                flux.push(value);
            }
        }
    }

    let n_rows = labels.len();
    if n_rows == 0 {
        return Err(DatasetError::Empty { path: path_text });
    }
    let seq_len = flux.len() / n_rows;

    info!(
        path = %path_text,
        "Loaded {} rows x {} flux readings (label column kept, column {} dropped)",
        n_rows, seq_len, DROPPED_COLUMN
    );

    // Vec lengths are consistent by construction, shape error unreachable
    let features = Array2::from_shape_vec((n_rows, seq_len), flux)
        .map_err(|_| DatasetError::Empty { path: path_text })?;

    Ok(FluxTable {
        features,
        labels: Array1::from_vec(labels),
    })
}
