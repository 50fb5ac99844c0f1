//! Transit Detection Pipeline
//!
//! Orchestrates the full run: load both CSVs, shuffle, extract and
//! rescale labels, normalize, smooth, take the FFT magnitude, oversample
//! the training set, train the FCN, evaluate, and write the checkpoint.
//! Single-threaded and synchronous throughout.

mod config;

pub use self::config::PipelineConfig;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use class_balance::{BalanceError, ClassCounts, RandomOversampler};
use evaluation::{
    binarize_labels, classification_report, render_curve, sparkline, threshold_predictions,
    ConfusionMatrix,
};
use lightcurve_io::{load_flux_table, rescale_binary_labels, DatasetError};
use signal_prep::{l2_normalize_rows, GaussianSmoother, SignalError, SpectrumAnalyzer};
use transit_net::{save_model, FcnConfig, NetError, TrainConfig, TrainHistory, Trainer, TransitFcn};

/// Errors from any pipeline stage
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error(transparent)]
    Balance(#[from] BalanceError),

    #[error(transparent)]
    Net(#[from] NetError),

    #[error("Configuration failure: {0}")]
    Config(#[from] ::config::ConfigError),

    /// Train and test sets must agree on flux sequence length
    #[error("Train sequence length {train} differs from test sequence length {test}")]
    SeqLenMismatch { train: usize, test: usize },
}

/// Outcome of a completed run, for callers and tests.
#[derive(Debug)]
pub struct RunSummary {
    /// Rows in the training set before balancing
    pub train_rows: usize,
    /// Class counts after oversampling
    pub balanced_counts: ClassCounts,
    /// Per-epoch training history
    pub history: TrainHistory,
    /// Final confusion matrix on the evaluation set
    pub confusion: ConfusionMatrix,
    /// Final evaluation accuracy
    pub test_accuracy: f64,
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    // A second init (e.g. in tests) keeps the first subscriber
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Execute the whole training pipeline.
pub fn run(config: &PipelineConfig) -> Result<RunSummary, PipelineError> {
    let mut rng = match config.seed {
        Some(seed) => {
            info!("Seeded run, seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    // Ingestion
    let mut train = load_flux_table(&config.train_csv)?;
    let mut test = load_flux_table(&config.test_csv)?;
    if train.seq_len() != test.seq_len() {
        return Err(PipelineError::SeqLenMismatch {
            train: train.seq_len(),
            test: test.seq_len(),
        });
    }
    train.shuffle_rows(&mut rng);
    test.shuffle_rows(&mut rng);

    let y_train = rescale_binary_labels(&train.labels)?;
    let y_test = rescale_binary_labels(&test.labels)?;

    // Waveform preview of the first curve, in place of a plot window
    println!(
        "flux[0]  {}",
        sparkline(&train.features.row(0).to_vec(), 60)
    );

    // Preprocessing
    let train_norm = l2_normalize_rows(&train.features);
    let test_norm = l2_normalize_rows(&test.features);

    let smoother = GaussianSmoother::new(config.smoothing_sigma);
    let train_smooth = smoother.smooth_rows(&train_norm);
    let test_smooth = smoother.smooth_rows(&test_norm);
    info!(
        "Gaussian smoothing (sigma {}, radius {}): train first-row peak {:.3e} -> {:.3e}, test {:.3e} -> {:.3e}",
        smoother.sigma(),
        smoother.radius(),
        row_peak(&train_norm),
        row_peak(&train_smooth),
        row_peak(&test_norm),
        row_peak(&test_smooth),
    );

    // The frequency transform consumes the normalized flux; the smoothed
    // matrices inform the logs only.
    let mut analyzer = SpectrumAnalyzer::new();
    let train_fft = analyzer.magnitude_rows(&train_norm)?;
    let test_fft = analyzer.magnitude_rows(&test_norm)?;

    // Balancing (training set only)
    let mut sampler =
        RandomOversampler::new(config.oversample_ratio, StdRng::seed_from_u64(rng.gen()))?;
    let (x_balanced, y_balanced) = sampler.fit_resample(&train_fft, &y_train)?;
    let balanced_counts = ClassCounts::from_labels(&y_balanced);
    println!(
        "After oversampling, counts of label '1': {}",
        balanced_counts.positive
    );
    println!(
        "After oversampling, counts of label '0': {}",
        balanced_counts.negative
    );

    // Model
    let fcn_config = FcnConfig {
        seq_len: train.seq_len(),
        filters: config.filters,
        kernels: config.kernels,
    };
    let mut model = TransitFcn::new(fcn_config, &mut rng)?;
    println!("{}", model.summary());

    let mut trainer = Trainer::new(
        TrainConfig {
            epochs: config.epochs,
            batch_size: config.batch_size,
            learning_rate: config.learning_rate,
        },
        StdRng::seed_from_u64(rng.gen()),
    );
    let history = trainer.fit(&mut model, &x_balanced, &y_balanced, &test_fft, &y_test)?;

    let accuracies: Vec<f64> = history.epochs.iter().map(|e| e.accuracy).collect();
    let losses: Vec<f64> = history.epochs.iter().map(|e| e.loss).collect();
    println!("{}", render_curve("accuracy", &accuracies));
    println!("{}", render_curve("loss", &losses));

    // Evaluation
    let probabilities = model.predict_proba(&test_fft)?;
    let predictions = threshold_predictions(&probabilities.to_vec(), 0.5);
    let targets = binarize_labels(&y_test.to_vec());
    let confusion = ConfusionMatrix::from_predictions(&predictions, &targets);
    let test_accuracy = evaluation::accuracy(&predictions, &targets);

    println!("accuracy : {}", test_accuracy);
    println!(
        "{}",
        classification_report(&confusion, "NO exoplanet confirmed", "YES exoplanet confirmed")
    );
    println!("{}", confusion.render_heatmap());

    // Persist the only artifact of the run
    save_model(&model, &config.model_path)?;

    Ok(RunSummary {
        train_rows: train.n_rows(),
        balanced_counts,
        history,
        confusion,
        test_accuracy,
    })
}

/// Largest absolute value in the first row, for smoothing summaries.
fn row_peak(matrix: &ndarray::Array2<f64>) -> f64 {
    matrix
        .row(0)
        .iter()
        .fold(0.0f64, |acc, &v| acc.max(v.abs()))
}
