//! Exoplanet Transit Pipeline - Main Entry Point

use std::path::PathBuf;

use anyhow::Context;
use pipeline::{init_logging, run, PipelineConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== Exoplanet Transit Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = PipelineConfig::load(config_path.as_deref())
        .context("loading pipeline configuration")?;

    info!(
        "Training on {} / evaluating on {}",
        config.train_csv.display(),
        config.test_csv.display()
    );

    let summary = run(&config).context("running training pipeline")?;

    info!(
        "Run complete: {} training rows, final test accuracy {:.4}, model at {}",
        summary.train_rows,
        summary.test_accuracy,
        config.model_path.display()
    );

    Ok(())
}
