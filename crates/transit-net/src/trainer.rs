//! Mini-Batch Trainer

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::loss::bce_with_logits;
use crate::model::TransitFcn;
use crate::optimizer::Adam;
use crate::NetError;

/// Training hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Passes over the training set
    pub epochs: usize,
    /// Mini-batch size
    pub batch_size: usize,
    /// Adam learning rate
    pub learning_rate: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 2,
            batch_size: 10,
            learning_rate: 1e-3,
        }
    }
}

/// Metrics recorded after each epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub loss: f64,
    pub accuracy: f64,
    pub val_loss: f64,
    pub val_accuracy: f64,
}

/// Per-epoch training history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainHistory {
    pub epochs: Vec<EpochMetrics>,
}

/// Runs the fixed-epoch training loop with per-epoch validation against
/// the untouched evaluation set. No early stopping, no schedule.
pub struct Trainer {
    config: TrainConfig,
    rng: StdRng,
}

impl Trainer {
    pub fn new(config: TrainConfig, rng: StdRng) -> Self {
        Self { config, rng }
    }

    /// Fit the model on (samples, seq_len) feature matrices with {0, 1}
    /// labels.
    pub fn fit(
        &mut self,
        model: &mut TransitFcn,
        x_train: &Array2<f64>,
        y_train: &Array1<f64>,
        x_val: &Array2<f64>,
        y_val: &Array1<f64>,
    ) -> Result<TrainHistory, NetError> {
        if x_train.nrows() != y_train.len() {
            return Err(NetError::LengthMismatch {
                rows: x_train.nrows(),
                labels: y_train.len(),
            });
        }
        if x_val.nrows() != y_val.len() {
            return Err(NetError::LengthMismatch {
                rows: x_val.nrows(),
                labels: y_val.len(),
            });
        }
        if x_train.nrows() == 0 {
            return Err(NetError::EmptyTrainingSet);
        }

        let mut optimizer = Adam::new(self.config.learning_rate);
        let mut history = TrainHistory::default();
        let n = x_train.nrows();
        let batch_size = self.config.batch_size.max(1);

        for epoch in 1..=self.config.epochs {
            // Fresh batch order each epoch
            let mut order: Vec<usize> = (0..n).collect();
            for i in (1..n).rev() {
                let j = self.rng.gen_range(0..=i);
                order.swap(i, j);
            }

            let mut epoch_loss = 0.0;
            let mut correct = 0usize;

            for chunk in order.chunks(batch_size) {
                let batch_x = x_train.select(Axis(0), chunk);
                let batch_y = y_train.select(Axis(0), chunk);
                let input = model.to_input(&batch_x)?;

                let (logits, cache) = model.forward(&input);
                let (loss, grad_logits) = bce_with_logits(&logits, &batch_y);

                model.zero_grads();
                model.backward(&cache, &grad_logits);
                model.apply_gradients(&mut optimizer);

                epoch_loss += loss * chunk.len() as f64;
                correct += logits
                    .iter()
                    .zip(batch_y.iter())
                    .filter(|(&z, &y)| (z > 0.0) == (y > 0.5))
                    .count();
            }

            let loss = epoch_loss / n as f64;
            let accuracy = correct as f64 / n as f64;
            let (val_loss, val_accuracy) = evaluate(model, x_val, y_val)?;

            info!(
                "Epoch {}/{}: loss {:.4} accuracy {:.4} val_loss {:.4} val_accuracy {:.4}",
                epoch, self.config.epochs, loss, accuracy, val_loss, val_accuracy
            );

            history.epochs.push(EpochMetrics {
                epoch,
                loss,
                accuracy,
                val_loss,
                val_accuracy,
            });
        }

        Ok(history)
    }
}

/// Loss and accuracy of the model on a labeled set, without updating it.
pub fn evaluate(
    model: &TransitFcn,
    x: &Array2<f64>,
    y: &Array1<f64>,
) -> Result<(f64, f64), NetError> {
    if x.nrows() != y.len() {
        return Err(NetError::LengthMismatch {
            rows: x.nrows(),
            labels: y.len(),
        });
    }
    if x.nrows() == 0 {
        return Ok((0.0, 0.0));
    }
    let input = model.to_input(x)?;
    let (logits, _) = model.forward(&input);
    let (loss, _) = bce_with_logits(&logits, y);
    let correct = logits
        .iter()
        .zip(y.iter())
        .filter(|(&z, &t)| (z > 0.0) == (t > 0.5))
        .count();
    Ok((loss, correct as f64 / x.nrows() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FcnConfig;
    use rand::SeedableRng;

    /// Trivially separable set: negatives are flat rows, positives carry a
    /// large oscillation.
    fn separable_set(n_pos: usize, n_neg: usize, seq_len: usize) -> (Array2<f64>, Array1<f64>) {
        let n = n_pos + n_neg;
        let x = Array2::from_shape_fn((n, seq_len), |(i, j)| {
            if i < n_pos {
                if j % 2 == 0 { 2.0 } else { -2.0 }
            } else {
                0.1
            }
        });
        let y = Array1::from_shape_fn(n, |i| if i < n_pos { 1.0 } else { 0.0 });
        (x, y)
    }

    fn tiny_config(seq_len: usize) -> FcnConfig {
        FcnConfig {
            seq_len,
            filters: [4, 4, 4],
            kernels: [3, 3, 3],
        }
    }

    #[test]
    fn test_loss_decreases_on_separable_data() {
        let (x, y) = separable_set(8, 8, 12);
        let mut rng = StdRng::seed_from_u64(1);
        let mut model = TransitFcn::new(tiny_config(12), &mut rng).unwrap();
        let mut trainer = Trainer::new(
            TrainConfig {
                epochs: 30,
                batch_size: 4,
                learning_rate: 0.01,
            },
            StdRng::seed_from_u64(2),
        );

        let history = trainer.fit(&mut model, &x, &y, &x, &y).unwrap();
        assert_eq!(history.epochs.len(), 30);
        let first = history.epochs.first().unwrap().loss;
        let last = history.epochs.last().unwrap().loss;
        assert!(last < first, "loss did not decrease: {} -> {}", first, last);
        assert!(history.epochs.last().unwrap().accuracy > 0.7);
    }

    #[test]
    fn test_history_length_matches_epochs() {
        let (x, y) = separable_set(3, 5, 8);
        let mut rng = StdRng::seed_from_u64(3);
        let mut model = TransitFcn::new(tiny_config(8), &mut rng).unwrap();
        let mut trainer = Trainer::new(
            TrainConfig {
                epochs: 2,
                batch_size: 10,
                learning_rate: 1e-3,
            },
            StdRng::seed_from_u64(4),
        );
        let history = trainer.fit(&mut model, &x, &y, &x, &y).unwrap();
        assert_eq!(history.epochs.len(), 2);
        assert_eq!(history.epochs[0].epoch, 1);
        assert_eq!(history.epochs[1].epoch, 2);
    }

    #[test]
    fn test_empty_training_set_rejected() {
        let x = Array2::<f64>::zeros((0, 8));
        let y = Array1::<f64>::zeros(0);
        let mut rng = StdRng::seed_from_u64(0);
        let mut model = TransitFcn::new(tiny_config(8), &mut rng).unwrap();
        let mut trainer = Trainer::new(TrainConfig::default(), StdRng::seed_from_u64(0));
        assert!(matches!(
            trainer.fit(&mut model, &x, &y, &x, &y),
            Err(NetError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn test_mismatched_labels_rejected() {
        let (x, _) = separable_set(2, 2, 8);
        let y = Array1::<f64>::zeros(3);
        let mut rng = StdRng::seed_from_u64(0);
        let mut model = TransitFcn::new(tiny_config(8), &mut rng).unwrap();
        let mut trainer = Trainer::new(TrainConfig::default(), StdRng::seed_from_u64(0));
        assert!(matches!(
            trainer.fit(&mut model, &x, &y, &x, &y),
            Err(NetError::LengthMismatch { rows: 4, labels: 3 })
        ));
    }

    #[test]
    fn test_validation_set_is_not_trained_on() {
        // Same buffers before/after: evaluate() must not mutate
        let (x, y) = separable_set(2, 6, 8);
        let mut rng = StdRng::seed_from_u64(5);
        let model = TransitFcn::new(tiny_config(8), &mut rng).unwrap();
        let (loss_a, acc_a) = evaluate(&model, &x, &y).unwrap();
        let (loss_b, acc_b) = evaluate(&model, &x, &y).unwrap();
        assert_eq!(loss_a, loss_b);
        assert_eq!(acc_a, acc_b);
    }
}
