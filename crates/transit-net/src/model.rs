//! Fully Convolutional Network

use ndarray::{Array1, Array2, Array3, Axis};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layers::{relu, relu_backward, Conv1d, Dense};
use crate::loss::sigmoid;
use crate::optimizer::Adam;
use crate::NetError;

/// Architecture of the transit classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FcnConfig {
    /// Input sequence length (FFT magnitude bins)
    pub seq_len: usize,
    /// Filters per convolutional block
    pub filters: [usize; 3],
    /// Kernel sizes per convolutional block
    pub kernels: [usize; 3],
}

impl FcnConfig {
    /// Default FCN shape for a given sequence length.
    pub fn new(seq_len: usize) -> Self {
        Self {
            seq_len,
            filters: [16, 32, 16],
            kernels: [8, 5, 3],
        }
    }

    /// Reject shapes no network can be built from. Kernels and filter
    /// counts must be at least 1, as must the sequence length.
    pub fn validate(&self) -> Result<(), NetError> {
        if self.seq_len == 0 {
            return Err(NetError::InvalidArchitecture {
                reason: "sequence length must be at least 1".to_string(),
            });
        }
        for (i, (&filters, &kernel)) in
            self.filters.iter().zip(self.kernels.iter()).enumerate()
        {
            if filters == 0 {
                return Err(NetError::InvalidArchitecture {
                    reason: format!("block {} has 0 filters", i + 1),
                });
            }
            if kernel == 0 {
                return Err(NetError::InvalidArchitecture {
                    reason: format!("block {} has kernel size 0", i + 1),
                });
            }
        }
        Ok(())
    }
}

/// Intermediate tensors from a forward pass, consumed by `backward`.
pub struct ForwardCache {
    /// Input to each conv block
    block_inputs: Vec<Array3<f64>>,
    /// Pre-activation output of each conv block
    pre_activations: Vec<Array3<f64>>,
    /// Globally pooled activations fed to the head
    pooled: Array2<f64>,
}

/// Three Conv1d+ReLU blocks, global average pooling, and a dense head
/// producing one logit per sample.
pub struct TransitFcn {
    config: FcnConfig,
    blocks: Vec<Conv1d>,
    head: Dense,
}

impl TransitFcn {
    /// Build a freshly initialized network.
    pub fn new(config: FcnConfig, rng: &mut StdRng) -> Result<Self, NetError> {
        config.validate()?;
        let mut blocks = Vec::with_capacity(3);
        let mut in_channels = 1;
        for i in 0..3 {
            blocks.push(Conv1d::new(in_channels, config.filters[i], config.kernels[i], rng));
            in_channels = config.filters[i];
        }
        let head = Dense::new(in_channels, rng);
        debug!(
            "Built FCN: filters {:?}, kernels {:?}, {} parameters",
            config.filters,
            config.kernels,
            blocks.iter().map(Conv1d::num_parameters).sum::<usize>() + head.num_parameters()
        );
        Ok(Self { config, blocks, head })
    }

    /// Architecture config
    pub fn config(&self) -> &FcnConfig {
        &self.config
    }

    /// Reshape a (samples, seq_len) feature matrix into the network's
    /// (samples, 1 channel, seq_len) input tensor.
    pub fn to_input(&self, matrix: &Array2<f64>) -> Result<Array3<f64>, NetError> {
        if matrix.ncols() != self.config.seq_len {
            return Err(NetError::SeqLenMismatch {
                expected: self.config.seq_len,
                found: matrix.ncols(),
            });
        }
        Ok(matrix.clone().insert_axis(Axis(1)))
    }

    /// Forward pass producing logits and the cache for `backward`.
    pub fn forward(&self, input: &Array3<f64>) -> (Array1<f64>, ForwardCache) {
        let mut block_inputs = Vec::with_capacity(3);
        let mut pre_activations = Vec::with_capacity(3);

        let mut current = input.clone();
        for block in &self.blocks {
            let z = block.forward(&current);
            block_inputs.push(current);
            current = relu(&z);
            pre_activations.push(z);
        }

        let len = current.len_of(Axis(2)) as f64;
        let pooled = current.sum_axis(Axis(2)) / len;
        let logits = self.head.forward(&pooled);

        (
            logits,
            ForwardCache {
                block_inputs,
                pre_activations,
                pooled,
            },
        )
    }

    /// Backpropagate a gradient on the logits, accumulating parameter
    /// gradients throughout the network.
    pub fn backward(&mut self, cache: &ForwardCache, grad_logits: &Array1<f64>) {
        let grad_pooled = self.head.backward(&cache.pooled, grad_logits);

        // Undo global average pooling: spread each channel gradient
        // uniformly over the sequence.
        let last = &cache.pre_activations[2];
        let (batch, channels, len) = last.dim();
        let mut grad = Array3::zeros((batch, channels, len));
        for b in 0..batch {
            for c in 0..channels {
                let g = grad_pooled[[b, c]] / len as f64;
                for t in 0..len {
                    grad[[b, c, t]] = g;
                }
            }
        }

        for i in (0..3).rev() {
            let grad_z = relu_backward(&cache.pre_activations[i], &grad);
            grad = self.blocks[i].backward(&cache.block_inputs[i], &grad_z);
        }
    }

    /// Zero all accumulated gradients.
    pub fn zero_grads(&mut self) {
        for block in &mut self.blocks {
            block.zero_grads();
        }
        self.head.zero_grads();
    }

    /// Apply one optimizer step to every parameter tensor.
    pub fn apply_gradients(&mut self, optimizer: &mut Adam) {
        optimizer.begin_step();
        let mut tensor_id = 0;
        for block in &mut self.blocks {
            let grads: Vec<f64> = block.grad_weights.iter().cloned().collect();
            if let Some(params) = block.weights.as_slice_mut() {
                optimizer.update(tensor_id, params, &grads);
            }
            tensor_id += 1;

            let grads: Vec<f64> = block.grad_bias.to_vec();
            if let Some(params) = block.bias.as_slice_mut() {
                optimizer.update(tensor_id, params, &grads);
            }
            tensor_id += 1;
        }

        let grads: Vec<f64> = self.head.grad_weights.to_vec();
        if let Some(params) = self.head.weights.as_slice_mut() {
            optimizer.update(tensor_id, params, &grads);
        }
        tensor_id += 1;

        let mut bias = [self.head.bias];
        optimizer.update(tensor_id, &mut bias, &[self.head.grad_bias]);
        self.head.bias = bias[0];
    }

    /// Predicted positive-class probability per feature-matrix row.
    pub fn predict_proba(&self, matrix: &Array2<f64>) -> Result<Array1<f64>, NetError> {
        let input = self.to_input(matrix)?;
        let (logits, _) = self.forward(&input);
        Ok(logits.mapv(sigmoid))
    }

    /// Total trainable parameter count.
    pub fn num_parameters(&self) -> usize {
        self.blocks.iter().map(Conv1d::num_parameters).sum::<usize>()
            + self.head.num_parameters()
    }

    /// Keras-style text summary of the layer stack.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<24} {:<24} {:>10}\n",
            "Layer", "Output Shape", "Params"
        ));
        out.push_str(&format!("{}\n", "-".repeat(60)));
        for (i, block) in self.blocks.iter().enumerate() {
            out.push_str(&format!(
                "{:<24} {:<24} {:>10}\n",
                format!("conv1d_{} (k={})", i + 1, block.kernel()),
                format!("(None, {}, {})", self.config.seq_len, block.out_channels()),
                block.num_parameters()
            ));
            out.push_str(&format!(
                "{:<24} {:<24} {:>10}\n",
                format!("relu_{}", i + 1),
                format!("(None, {}, {})", self.config.seq_len, block.out_channels()),
                0
            ));
        }
        out.push_str(&format!(
            "{:<24} {:<24} {:>10}\n",
            "global_avg_pool",
            format!("(None, {})", self.config.filters[2]),
            0
        ));
        out.push_str(&format!(
            "{:<24} {:<24} {:>10}\n",
            "dense (sigmoid)",
            "(None, 1)",
            self.head.num_parameters()
        ));
        out.push_str(&format!("{}\n", "-".repeat(60)));
        out.push_str(&format!("Total params: {}\n", self.num_parameters()));
        out
    }

    pub(crate) fn blocks(&self) -> &[Conv1d] {
        &self.blocks
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Conv1d> {
        &mut self.blocks
    }

    pub(crate) fn head(&self) -> &Dense {
        &self.head
    }

    pub(crate) fn head_mut(&mut self) -> &mut Dense {
        &mut self.head
    }
}
