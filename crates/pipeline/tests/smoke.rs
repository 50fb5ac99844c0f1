//! End-to-end smoke test over a tiny synthetic dataset.

use std::io::Write;
use std::path::PathBuf;

use pipeline::{run, PipelineConfig};

/// Write a small exoplanet-style CSV: label (2 = transit, 1 = none),
/// one metadata column, then `seq_len` flux readings.
fn write_dataset(name: &str, positives: usize, negatives: usize, seq_len: usize) -> PathBuf {
    let path = std::env::temp_dir().join(format!("transit-smoke-{}-{}", std::process::id(), name));
    let mut file = std::fs::File::create(&path).unwrap();

    let mut header = String::from("LABEL,META");
    for i in 1..=seq_len {
        header.push_str(&format!(",FLUX.{}", i));
    }
    writeln!(file, "{}", header).unwrap();

    for row in 0..positives + negatives {
        let positive = row < positives;
        let mut line = format!("{},{}", if positive { 2 } else { 1 }, row);
        for t in 0..seq_len {
            // Transits dip periodically, quiet stars just drift
            let flux = if positive {
                if t % 4 == 0 { -40.0 } else { 5.0 + t as f64 }
            } else {
                10.0 + 0.3 * t as f64 + row as f64
            };
            line.push_str(&format!(",{}", flux));
        }
        writeln!(file, "{}", line).unwrap();
    }
    path
}

#[test]
fn pipeline_completes_and_writes_checkpoint() {
    let train_csv = write_dataset("train.csv", 2, 8, 8);
    let test_csv = write_dataset("test.csv", 1, 4, 8);
    let model_path = std::env::temp_dir().join(format!(
        "transit-smoke-{}-model.json",
        std::process::id()
    ));

    let config = PipelineConfig {
        train_csv: train_csv.clone(),
        test_csv: test_csv.clone(),
        smoothing_sigma: 1.0,
        oversample_ratio: 0.5,
        epochs: 2,
        batch_size: 4,
        learning_rate: 1e-3,
        seed: Some(42),
        model_path: model_path.clone(),
        filters: [4, 4, 4],
        kernels: [3, 3, 3],
    };

    let summary = run(&config).expect("pipeline run failed");

    // Balanced set reached the target ratio without touching the majority
    assert_eq!(summary.train_rows, 10);
    assert_eq!(summary.balanced_counts.majority(), 8);
    assert!(
        summary.balanced_counts.minority() as f64
            >= config.oversample_ratio * summary.balanced_counts.majority() as f64
    );

    // One history entry per epoch, and the artifact exists on disk
    assert_eq!(summary.history.epochs.len(), 2);
    assert!(model_path.exists());

    // The checkpoint is loadable and predicts over the right shape
    let model = transit_net::load_model(&model_path).expect("checkpoint unreadable");
    assert_eq!(model.config().seq_len, 8);

    std::fs::remove_file(train_csv).ok();
    std::fs::remove_file(test_csv).ok();
    std::fs::remove_file(model_path).ok();
}

#[test]
fn seeded_runs_reproduce_the_balanced_counts() {
    let train_csv = write_dataset("train-b.csv", 2, 8, 8);
    let test_csv = write_dataset("test-b.csv", 1, 4, 8);

    let config = PipelineConfig {
        train_csv,
        test_csv,
        smoothing_sigma: 1.0,
        oversample_ratio: 0.5,
        epochs: 1,
        batch_size: 4,
        learning_rate: 1e-3,
        seed: Some(7),
        model_path: std::env::temp_dir().join(format!(
            "transit-smoke-{}-model-b.json",
            std::process::id()
        )),
        filters: [4, 4, 4],
        kernels: [3, 3, 3],
    };

    let first = run(&config).expect("first run failed");
    let second = run(&config).expect("second run failed");
    assert_eq!(first.balanced_counts, second.balanced_counts);
    assert_eq!(first.test_accuracy, second.test_accuracy);

    std::fs::remove_file(&config.train_csv).ok();
    std::fs::remove_file(&config.test_csv).ok();
    std::fs::remove_file(&config.model_path).ok();
}
