//! Transit Prediction API - Main Entry Point

use std::path::PathBuf;

use tracing::info;
use transit_api::{init_logging, run_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let model_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("exoplanet-model.json"));
    let addr = std::env::args()
        .nth(2)
        .unwrap_or_else(|| "0.0.0.0:3001".to_string());

    info!("=== Transit Prediction API v{} ===", env!("CARGO_PKG_VERSION"));
    run_server(&model_path, &addr).await?;

    Ok(())
}
