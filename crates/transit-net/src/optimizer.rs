//! Adam Optimizer

/// Adam with standard bias correction and a fixed learning rate.
///
/// Moment buffers are kept per parameter tensor, keyed by the order in
/// which tensors are registered on the first step.
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    step: u64,
    moments: Vec<(Vec<f64>, Vec<f64>)>,
}

impl Adam {
    /// Create an optimizer with the Keras default betas.
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            step: 0,
            moments: Vec::new(),
        }
    }

    /// Advance the global step counter. Call once per mini-batch, before
    /// updating the parameter tensors of that batch.
    pub fn begin_step(&mut self) {
        self.step += 1;
    }

    /// Apply one Adam update to a parameter tensor.
    ///
    /// `tensor_id` must be stable across steps for a given tensor.
    pub fn update(&mut self, tensor_id: usize, params: &mut [f64], grads: &[f64]) {
        while self.moments.len() <= tensor_id {
            self.moments.push((Vec::new(), Vec::new()));
        }
        let (m, v) = &mut self.moments[tensor_id];
        if m.len() != params.len() {
            m.resize(params.len(), 0.0);
            v.resize(params.len(), 0.0);
        }

        let t = self.step.max(1) as i32;
        let correction1 = 1.0 - self.beta1.powi(t);
        let correction2 = 1.0 - self.beta2.powi(t);

        for i in 0..params.len() {
            let g = grads[i];
            m[i] = self.beta1 * m[i] + (1.0 - self.beta1) * g;
            v[i] = self.beta2 * v[i] + (1.0 - self.beta2) * g * g;
            let m_hat = m[i] / correction1;
            let v_hat = v[i] / correction2;
            params[i] -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }
    }

    /// Configured learning rate
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}
