//! Transit Classification Network
//!
//! A 1-D fully convolutional network trained with Adam on binary
//! cross-entropy, plus the mini-batch trainer and JSON checkpointing.
//! Everything runs on the CPU over ndarray tensors.

mod checkpoint;
mod layers;
mod loss;
mod model;
mod optimizer;
mod trainer;

pub use checkpoint::{load_model, save_model, Checkpoint};
pub use loss::{bce_with_logits, sigmoid};
pub use model::{FcnConfig, ForwardCache, TransitFcn};
pub use optimizer::Adam;
pub use trainer::{evaluate, EpochMetrics, TrainConfig, TrainHistory, Trainer};

use thiserror::Error;

/// Errors from model construction, training, and checkpointing
#[derive(Debug, Error)]
pub enum NetError {
    /// Architecture parameters that no network can be built from
    #[error("Invalid architecture: {reason}")]
    InvalidArchitecture { reason: String },

    /// Input row length differs from the architecture's sequence length
    #[error("Input sequence length {found} does not match model sequence length {expected}")]
    SeqLenMismatch { expected: usize, found: usize },

    /// Feature matrix and label column disagree on row count
    #[error("Feature matrix has {rows} rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },

    /// Nothing to train on
    #[error("Training set is empty")]
    EmptyTrainingSet,

    /// Checkpoint file I/O failure
    #[error("Checkpoint I/O failure at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Checkpoint JSON failure
    #[error("Checkpoint serialization failure: {0}")]
    Serde(#[from] serde_json::Error),

    /// Checkpoint contents disagree with the recorded architecture
    #[error("Malformed checkpoint: {reason}")]
    MalformedCheckpoint { reason: String },
}
