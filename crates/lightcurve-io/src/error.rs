//! Dataset Error Types

use thiserror::Error;

/// Errors during dataset loading and label extraction
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Underlying CSV read or parse failure
    #[error("CSV failure in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// Row width differs from the first data row
    #[error("Row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    /// Cell could not be parsed as a number
    #[error("Row {row}, column {column}: cannot parse {value:?} as a number")]
    BadCell {
        row: usize,
        column: usize,
        value: String,
    },

    /// File contained a header but no data rows
    #[error("Dataset {path} contains no data rows")]
    Empty { path: String },

    /// Not enough columns for label + metadata + at least one flux reading
    #[error("Dataset has {columns} columns, need at least {min}")]
    TooFewColumns { columns: usize, min: usize },

    /// Label rescaling needs exactly two distinct values
    #[error("Expected exactly 2 distinct label values, found {distinct}")]
    DegenerateLabels { distinct: usize },
}
