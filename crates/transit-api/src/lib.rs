//! Transit Prediction API Server
//!
//! Serves a trained checkpoint over HTTP: one prediction route that
//! classifies a submitted flux series, plus a health check.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use signal_prep::{SignalError, SpectrumAnalyzer};
use transit_net::{load_model, NetError, TransitFcn};

mod routes;

pub use routes::predict::{ClassProbabilities, PredictRequest, PredictResponse};

/// Errors a prediction request can fail with
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Flux series is empty")]
    EmptyFlux,

    #[error("Flux value at index {index} is not a finite number")]
    NonFiniteFlux { index: usize },

    #[error(transparent)]
    Net(#[from] NetError),

    #[error(transparent)]
    Signal(#[from] SignalError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::EmptyFlux
            | ApiError::NonFiniteFlux { .. }
            | ApiError::Net(NetError::SeqLenMismatch { .. }) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Application state shared across handlers
pub struct AppState {
    /// The trained classifier
    pub model: TransitFcn,
    /// FFT planner, reused across requests
    pub analyzer: SpectrumAnalyzer,
    /// Where the checkpoint was loaded from
    pub checkpoint: String,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Wrap a loaded model for serving.
    pub fn new(model: TransitFcn, checkpoint: String) -> Self {
        Self {
            model,
            analyzer: SpectrumAnalyzer::new(),
            checkpoint,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: ModelInfo,
}

/// Served model summary
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub checkpoint: String,
    pub seq_len: usize,
    pub parameters: usize,
}

/// Create the application router
pub fn create_router(state: Arc<RwLock<AppState>>) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/predict", post(routes::predict::predict))
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<RwLock<AppState>>>) -> impl IntoResponse {
    let state = state.read().await;
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: ModelInfo {
            checkpoint: state.checkpoint.clone(),
            seq_len: state.model.config().seq_len,
            parameters: state.model.num_parameters(),
        },
    })
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

/// Load the checkpoint and serve it until shut down.
pub async fn run_server(model_path: &Path, addr: &str) -> anyhow::Result<()> {
    let model = load_model(model_path)?;
    info!(
        "Loaded checkpoint {} ({} parameters, sequence length {})",
        model_path.display(),
        model.num_parameters(),
        model.config().seq_len
    );

    let state = Arc::new(RwLock::new(AppState::new(
        model,
        model_path.display().to_string(),
    )));
    let app = create_router(state);

    info!("Starting prediction server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
