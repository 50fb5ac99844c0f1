//! Network Layers
//!
//! Conv1d and the dense head are written directly over ndarray. Forward
//! passes are pure; backward passes take the cached forward input and
//! accumulate parameter gradients on the layer.

use ndarray::{Array1, Array3};
use rand::rngs::StdRng;
use rand::Rng;

/// 1-D convolution, stride 1, zero-padded to keep the sequence length
/// ("same" padding: `(kernel - 1) / 2` on the left, remainder right).
pub struct Conv1d {
    in_channels: usize,
    out_channels: usize,
    kernel: usize,
    /// (out_channels, in_channels, kernel)
    pub weights: Array3<f64>,
    pub bias: Array1<f64>,
    pub grad_weights: Array3<f64>,
    pub grad_bias: Array1<f64>,
}

impl Conv1d {
    /// Glorot-uniform initialized layer.
    pub fn new(in_channels: usize, out_channels: usize, kernel: usize, rng: &mut StdRng) -> Self {
        let fan_in = (in_channels * kernel) as f64;
        let fan_out = (out_channels * kernel) as f64;
        let limit = (6.0 / (fan_in + fan_out)).sqrt();
        let weights =
            Array3::from_shape_fn((out_channels, in_channels, kernel), |_| {
                rng.gen_range(-limit..limit)
            });
        Self {
            in_channels,
            out_channels,
            kernel,
            weights,
            bias: Array1::zeros(out_channels),
            grad_weights: Array3::zeros((out_channels, in_channels, kernel)),
            grad_bias: Array1::zeros(out_channels),
        }
    }

    fn pad(&self) -> usize {
        (self.kernel - 1) / 2
    }

    /// Forward pass over a (batch, in_channels, len) tensor.
    pub fn forward(&self, input: &Array3<f64>) -> Array3<f64> {
        let (batch, _, len) = input.dim();
        let pad = self.pad();
        let mut out = Array3::zeros((batch, self.out_channels, len));
        for b in 0..batch {
            for o in 0..self.out_channels {
                for t in 0..len {
                    let mut acc = self.bias[o];
                    for c in 0..self.in_channels {
                        for k in 0..self.kernel {
                            let shifted = t + k;
                            if shifted >= pad && shifted - pad < len {
                                acc += self.weights[[o, c, k]] * input[[b, c, shifted - pad]];
                            }
                        }
                    }
                    out[[b, o, t]] = acc;
                }
            }
        }
        out
    }

    /// Backward pass: accumulates weight/bias gradients and returns the
    /// gradient with respect to `input`.
    pub fn backward(&mut self, input: &Array3<f64>, grad_out: &Array3<f64>) -> Array3<f64> {
        let (batch, _, len) = input.dim();
        let pad = self.pad();
        let mut grad_in = Array3::zeros(input.raw_dim());
        for b in 0..batch {
            for o in 0..self.out_channels {
                for t in 0..len {
                    let g = grad_out[[b, o, t]];
                    if g == 0.0 {
                        continue;
                    }
                    self.grad_bias[o] += g;
                    for c in 0..self.in_channels {
                        for k in 0..self.kernel {
                            let shifted = t + k;
                            if shifted >= pad && shifted - pad < len {
                                let u = shifted - pad;
                                self.grad_weights[[o, c, k]] += g * input[[b, c, u]];
                                grad_in[[b, c, u]] += g * self.weights[[o, c, k]];
                            }
                        }
                    }
                }
            }
        }
        grad_in
    }

    /// Zero the accumulated gradients.
    pub fn zero_grads(&mut self) {
        self.grad_weights.fill(0.0);
        self.grad_bias.fill(0.0);
    }

    pub fn out_channels(&self) -> usize {
        self.out_channels
    }

    pub fn kernel(&self) -> usize {
        self.kernel
    }

    /// weights + biases
    pub fn num_parameters(&self) -> usize {
        self.weights.len() + self.bias.len()
    }
}

/// Dense head mapping pooled channels to a single logit.
pub struct Dense {
    pub weights: Array1<f64>,
    pub bias: f64,
    pub grad_weights: Array1<f64>,
    pub grad_bias: f64,
}

impl Dense {
    pub fn new(inputs: usize, rng: &mut StdRng) -> Self {
        let limit = (6.0 / (inputs as f64 + 1.0)).sqrt();
        Self {
            weights: Array1::from_shape_fn(inputs, |_| rng.gen_range(-limit..limit)),
            bias: 0.0,
            grad_weights: Array1::zeros(inputs),
            grad_bias: 0.0,
        }
    }

    /// Forward over (batch, inputs) rows, producing one logit per row.
    pub fn forward(&self, input: &ndarray::Array2<f64>) -> Array1<f64> {
        input.dot(&self.weights) + self.bias
    }

    /// Backward: accumulates gradients, returns gradient w.r.t. input.
    pub fn backward(
        &mut self,
        input: &ndarray::Array2<f64>,
        grad_out: &Array1<f64>,
    ) -> ndarray::Array2<f64> {
        let (batch, inputs) = input.dim();
        let mut grad_in = ndarray::Array2::zeros((batch, inputs));
        for b in 0..batch {
            let g = grad_out[b];
            self.grad_bias += g;
            for i in 0..inputs {
                self.grad_weights[i] += g * input[[b, i]];
                grad_in[[b, i]] = g * self.weights[i];
            }
        }
        grad_in
    }

    pub fn zero_grads(&mut self) {
        self.grad_weights.fill(0.0);
        self.grad_bias = 0.0;
    }

    pub fn num_parameters(&self) -> usize {
        self.weights.len() + 1
    }
}

/// Elementwise ReLU.
pub fn relu(x: &Array3<f64>) -> Array3<f64> {
    x.mapv(|v| v.max(0.0))
}

/// ReLU gradient given the pre-activation values.
pub fn relu_backward(pre_activation: &Array3<f64>, grad_out: &Array3<f64>) -> Array3<f64> {
    let mut grad = grad_out.clone();
    for (g, &z) in grad.iter_mut().zip(pre_activation.iter()) {
        if z <= 0.0 {
            *g = 0.0;
        }
    }
    grad
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;

    #[test]
    fn test_conv_identity_kernel() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut conv = Conv1d::new(1, 1, 3, &mut rng);
        conv.weights.fill(0.0);
        conv.weights[[0, 0, 1]] = 1.0; // center tap only
        conv.bias.fill(0.0);

        let input = array![[[1.0, 2.0, 3.0, 4.0]]];
        let out = conv.forward(&input);
        assert_eq!(out, input);
    }

    #[test]
    fn test_conv_known_values() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut conv = Conv1d::new(1, 1, 3, &mut rng);
        // Moving sum of three neighbors, zero-padded edges
        conv.weights.fill(1.0);
        conv.bias.fill(0.0);

        let input = array![[[1.0, 2.0, 3.0]]];
        let out = conv.forward(&input);
        assert_eq!(out, array![[[3.0, 6.0, 5.0]]]);
    }

    #[test]
    fn test_conv_even_kernel_keeps_length() {
        let mut rng = StdRng::seed_from_u64(1);
        let conv = Conv1d::new(1, 2, 8, &mut rng);
        let input = Array3::from_shape_fn((2, 1, 11), |(b, _, t)| (b + t) as f64);
        let out = conv.forward(&input);
        assert_eq!(out.dim(), (2, 2, 11));
    }

    #[test]
    fn test_conv_gradient_matches_finite_difference() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut conv = Conv1d::new(2, 3, 3, &mut rng);
        let input = Array3::from_shape_fn((1, 2, 5), |(_, c, t)| 0.3 * (c as f64 + 1.0) * (t as f64 - 2.0));

        // Scalar objective: sum of outputs
        let grad_out = Array3::ones((1, 3, 5));
        conv.zero_grads();
        let grad_in = conv.backward(&input, &grad_out);

        let eps = 1e-6;

        // Check a weight gradient
        let sum_at = |conv: &Conv1d, input: &Array3<f64>| conv.forward(input).sum();
        let mut perturbed = Conv1d {
            in_channels: 2,
            out_channels: 3,
            kernel: 3,
            weights: conv.weights.clone(),
            bias: conv.bias.clone(),
            grad_weights: Array3::zeros((3, 2, 3)),
            grad_bias: Array1::zeros(3),
        };
        perturbed.weights[[1, 0, 2]] += eps;
        let numeric = (sum_at(&perturbed, &input) - sum_at(&conv, &input)) / eps;
        assert!((numeric - conv.grad_weights[[1, 0, 2]]).abs() < 1e-4);

        // Check an input gradient
        let mut shifted = input.clone();
        shifted[[0, 1, 3]] += eps;
        let numeric_in = (sum_at(&conv, &shifted) - sum_at(&conv, &input)) / eps;
        assert!((numeric_in - grad_in[[0, 1, 3]]).abs() < 1e-4);
    }

    #[test]
    fn test_dense_forward_and_backward() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut dense = Dense::new(3, &mut rng);
        dense.weights = array![1.0, -2.0, 0.5];
        dense.bias = 0.25;

        let input = array![[2.0, 1.0, 4.0]];
        let out = dense.forward(&input);
        assert!((out[0] - (2.0 - 2.0 + 2.0 + 0.25)).abs() < 1e-12);

        dense.zero_grads();
        let grad_in = dense.backward(&input, &array![1.0]);
        assert_eq!(grad_in, array![[1.0, -2.0, 0.5]]);
        assert_eq!(dense.grad_weights, array![2.0, 1.0, 4.0]);
        assert_eq!(dense.grad_bias, 1.0);
    }

    #[test]
    fn test_relu_masks_gradient() {
        let z = array![[[1.0, -1.0, 0.0]]];
        let grad = array![[[5.0, 5.0, 5.0]]];
        let masked = relu_backward(&z, &grad);
        assert_eq!(masked, array![[[5.0, 0.0, 0.0]]]);
    }
}
