//! Prediction Route

use std::sync::Arc;

use axum::{extract::State, Json};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use signal_prep::l2_normalize_rows;

use crate::{ApiError, AppState};

/// A flux time-series submitted for classification
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub flux: Vec<f64>,
}

/// Class probabilities for the two outcomes
#[derive(Debug, Serialize)]
pub struct ClassProbabilities {
    pub no_planet: f64,
    pub planet: f64,
}

/// Classification of one submitted light curve
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: String,
    pub probability: ClassProbabilities,
    pub flux_points: usize,
}

/// Classify one flux series: normalize, take the FFT magnitude, and run
/// the network, the same preprocessing its training rows went through.
pub async fn predict(
    State(state): State<Arc<RwLock<AppState>>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let flux_points = request.flux.len();
    if flux_points == 0 {
        return Err(ApiError::EmptyFlux);
    }
    if let Some(index) = request.flux.iter().position(|v| !v.is_finite()) {
        return Err(ApiError::NonFiniteFlux { index });
    }

    // Shape error unreachable, the vec has (1, flux_points) elements
    let row = Array2::from_shape_vec((1, flux_points), request.flux)
        .map_err(|_| ApiError::EmptyFlux)?;
    let normalized = l2_normalize_rows(&row);

    let mut state = state.write().await;
    let spectrum = state.analyzer.magnitude_rows(&normalized)?;
    let probabilities = state.model.predict_proba(&spectrum)?;
    let planet = probabilities[0];

    debug!(
        "Classified {} flux points, planet probability {:.4}",
        flux_points, planet
    );

    let prediction = if planet >= 0.5 {
        "PLANET DETECTED"
    } else {
        "NO PLANET DETECTED"
    };
    Ok(Json(PredictResponse {
        prediction: prediction.to_string(),
        probability: ClassProbabilities {
            no_planet: 1.0 - planet,
            planet,
        },
        flux_points,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_router;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tower::ServiceExt;
    use transit_net::{FcnConfig, TransitFcn};

    fn test_router(seq_len: usize) -> axum::Router {
        let mut rng = StdRng::seed_from_u64(11);
        let config = FcnConfig {
            seq_len,
            filters: [2, 3, 2],
            kernels: [3, 3, 3],
        };
        let model = TransitFcn::new(config, &mut rng).unwrap();
        let state = Arc::new(RwLock::new(AppState::new(model, "in-memory".to_string())));
        create_router(state)
    }

    fn post_flux(body: String) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_predict_classifies_a_flux_series() {
        let app = test_router(8);
        let flux: Vec<f64> = (0..8).map(|i| 1.0 + (i as f64 * 0.7).sin()).collect();
        let body = serde_json::json!({ "flux": flux }).to_string();

        let response = app.oneshot(post_flux(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let value = json_body(response).await;
        assert_eq!(value["flux_points"], 8);
        let planet = value["probability"]["planet"].as_f64().unwrap();
        let no_planet = value["probability"]["no_planet"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&planet));
        assert!((planet + no_planet - 1.0).abs() < 1e-9);
        let prediction = value["prediction"].as_str().unwrap();
        assert!(prediction == "PLANET DETECTED" || prediction == "NO PLANET DETECTED");
    }

    #[tokio::test]
    async fn test_wrong_length_is_a_client_error() {
        let app = test_router(8);
        let body = serde_json::json!({ "flux": [1.0, 2.0, 3.0] }).to_string();

        let response = app.oneshot(post_flux(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let value = json_body(response).await;
        assert!(value["error"].as_str().unwrap().contains("sequence length"));
    }

    #[tokio::test]
    async fn test_empty_flux_is_a_client_error() {
        let app = test_router(8);
        let body = serde_json::json!({ "flux": [] }).to_string();

        let response = app.oneshot(post_flux(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_overflowing_flux_value_is_a_client_error() {
        // 1e999 overflows f64 on parse and arrives as infinity
        let app = test_router(8);
        let body = r#"{"flux": [1e999, 0, 0, 0, 0, 0, 0, 0]}"#.to_string();

        let response = app.oneshot(post_flux(body)).await.unwrap();
        assert!(response.status().is_client_error());
    }
}
