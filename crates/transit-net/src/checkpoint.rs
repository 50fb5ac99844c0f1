//! Model Checkpointing
//!
//! The trained network is persisted as a single JSON file holding the
//! architecture config and flattened weight tensors.

use std::path::Path;

use ndarray::{Array1, Array3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::{FcnConfig, TransitFcn};
use crate::NetError;

/// On-disk checkpoint layout.
#[derive(Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    pub config: FcnConfig,
    /// Flattened (out, in, kernel) weights per conv block
    pub conv_weights: Vec<Vec<f64>>,
    /// Bias per conv block
    pub conv_biases: Vec<Vec<f64>>,
    pub dense_weights: Vec<f64>,
    pub dense_bias: f64,
}

impl Checkpoint {
    /// Snapshot a trained model.
    pub fn from_model(model: &TransitFcn) -> Self {
        Self {
            config: model.config().clone(),
            conv_weights: model
                .blocks()
                .iter()
                .map(|b| b.weights.iter().cloned().collect())
                .collect(),
            conv_biases: model.blocks().iter().map(|b| b.bias.to_vec()).collect(),
            dense_weights: model.head().weights.to_vec(),
            dense_bias: model.head().bias,
        }
    }

    /// Rebuild a model from the snapshot, validating tensor sizes
    /// against the recorded config.
    pub fn into_model(self) -> Result<TransitFcn, NetError> {
        // Seed is irrelevant: every parameter is overwritten below.
        let mut rng = StdRng::seed_from_u64(0);
        let mut model = TransitFcn::new(self.config.clone(), &mut rng)?;

        if self.conv_weights.len() != 3 || self.conv_biases.len() != 3 {
            return Err(NetError::MalformedCheckpoint {
                reason: format!(
                    "expected 3 conv blocks, found {} weight / {} bias tensors",
                    self.conv_weights.len(),
                    self.conv_biases.len()
                ),
            });
        }

        let mut in_channels = 1;
        for (i, block) in model.blocks_mut().iter_mut().enumerate() {
            let out_channels = self.config.filters[i];
            let kernel = self.config.kernels[i];
            let expected = out_channels * in_channels * kernel;
            if self.conv_weights[i].len() != expected {
                return Err(NetError::MalformedCheckpoint {
                    reason: format!(
                        "conv block {} has {} weights, expected {}",
                        i,
                        self.conv_weights[i].len(),
                        expected
                    ),
                });
            }
            if self.conv_biases[i].len() != out_channels {
                return Err(NetError::MalformedCheckpoint {
                    reason: format!(
                        "conv block {} has {} biases, expected {}",
                        i,
                        self.conv_biases[i].len(),
                        out_channels
                    ),
                });
            }
            block.weights = Array3::from_shape_vec(
                (out_channels, in_channels, kernel),
                self.conv_weights[i].clone(),
            )
            .map_err(|e| NetError::MalformedCheckpoint {
                reason: e.to_string(),
            })?;
            block.bias = Array1::from_vec(self.conv_biases[i].clone());
            in_channels = out_channels;
        }

        if self.dense_weights.len() != in_channels {
            return Err(NetError::MalformedCheckpoint {
                reason: format!(
                    "dense head has {} weights, expected {}",
                    self.dense_weights.len(),
                    in_channels
                ),
            });
        }
        model.head_mut().weights = Array1::from_vec(self.dense_weights);
        model.head_mut().bias = self.dense_bias;

        Ok(model)
    }
}

/// Write a model checkpoint to `path`.
pub fn save_model(model: &TransitFcn, path: &Path) -> Result<(), NetError> {
    let checkpoint = Checkpoint::from_model(model);
    let json = serde_json::to_string(&checkpoint)?;
    std::fs::write(path, json).map_err(|source| NetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(
        "Saved model checkpoint ({} parameters) to {}",
        model.num_parameters(),
        path.display()
    );
    Ok(())
}

/// Load a model checkpoint from `path`.
pub fn load_model(path: &Path) -> Result<TransitFcn, NetError> {
    let json = std::fs::read_to_string(path).map_err(|source| NetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let checkpoint: Checkpoint = serde_json::from_str(&json)?;
    checkpoint.into_model()
}
