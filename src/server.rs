//! HTTP front-end for the inference service

use crate::dispatch::{self, INVALID_CASE};
use crate::metrics::InferenceMetrics;
use crate::models::InferenceEngine;
use crate::types::{Case, FeatureSet};
use axum::{
    extract::{Form, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<InferenceEngine>,
    pub metrics: Arc<InferenceMetrics>,
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The prediction form page
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Run a prediction from submitted form fields.
///
/// The form carries `case` plus the case-relevant feature names; the
/// response body is the plain result string, errors included.
async fn predict(
    State(state): State<AppState>,
    Form(fields): Form<FeatureSet>,
) -> String {
    let started = Instant::now();
    let case_raw = fields.get("case").map(String::as_str).unwrap_or("");

    match Case::parse(case_raw) {
        Some(case) => match dispatch::run_case(&state.engine, case, &fields) {
            Ok(result) => {
                state.metrics.record_prediction(case, started.elapsed());
                result
            }
            Err(e) => {
                state.metrics.record_failure(case);
                format!("Error: {}", e)
            }
        },
        None => {
            state.metrics.record_invalid_case();
            INVALID_CASE.to_string()
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    models: HashMap<&'static str, bool>,
}

/// Service status plus per-model slot availability
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let models: HashMap<&'static str, bool> =
        state.engine.availability().into_iter().collect();
    let status = if state.engine.usable_count() > 0 {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        models,
    })
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Astro Inference Service</title>
</head>
<body>
  <h1>Astronomical Model Predictions</h1>
  <form action="/predict" method="post">
    <p>
      <label for="case">Case:</label>
      <select id="case" name="case">
        <option value="1">1: Object Classification</option>
        <option value="2">2: Photometric Redshift Binning</option>
        <option value="3">3: Satellite Anomaly Detection</option>
      </select>
    </p>
    <fieldset>
      <legend>Photometric magnitudes (cases 1 and 2)</legend>
      <p><label>u: <input type="text" name="u" value="0"></label></p>
      <p><label>g: <input type="text" name="g" value="0"></label></p>
      <p><label>r: <input type="text" name="r" value="0"></label></p>
      <p><label>i: <input type="text" name="i" value="0"></label></p>
      <p><label>z: <input type="text" name="z" value="0"></label></p>
    </fieldset>
    <fieldset>
      <legend>Satellite observation (case 3)</legend>
      <p><label>alpha: <input type="text" name="alpha" value="0"></label></p>
      <p><label>delta: <input type="text" name="delta" value="0"></label></p>
      <p><label>fiber_ID: <input type="text" name="fiber_ID" value="0"></label></p>
    </fieldset>
    <p><button type="submit">Predict</button></p>
  </form>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Model;
    use anyhow::Result;

    struct FixedModel(f32);

    impl Model for FixedModel {
        fn predict(&mut self, _features: &[f32]) -> Result<f32> {
            Ok(self.0)
        }
    }

    fn test_state(value: f32) -> AppState {
        AppState {
            engine: Arc::new(InferenceEngine::from_models(
                Some(Box::new(FixedModel(value))),
                Some(Box::new(FixedModel(value))),
                None,
            )),
            metrics: Arc::new(InferenceMetrics::new()),
        }
    }

    fn form(pairs: &[(&str, &str)]) -> Form<FeatureSet> {
        Form(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_predict_form_round_trip() {
        let state = test_state(2.0);
        let body = predict(
            State(state.clone()),
            form(&[
                ("case", "1"),
                ("u", "18.6"),
                ("g", "17.2"),
                ("r", "16.9"),
                ("i", "16.7"),
                ("z", "16.5"),
            ]),
        )
        .await;

        assert_eq!(body, "Predicted Class: 2");
        assert_eq!(
            state
                .metrics
                .predictions_served
                .load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }

    #[tokio::test]
    async fn test_predict_rejects_unknown_selector() {
        let state = test_state(1.0);
        let body = predict(State(state.clone()), form(&[("case", "9")])).await;

        assert_eq!(body, INVALID_CASE);
        assert_eq!(
            state
                .metrics
                .invalid_case_requests
                .load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }

    #[tokio::test]
    async fn test_predict_without_case_field() {
        let state = test_state(1.0);
        let body = predict(State(state), form(&[("u", "18.6")])).await;

        assert_eq!(body, INVALID_CASE);
    }

    #[tokio::test]
    async fn test_predict_dead_slot_reports_error_body() {
        let state = test_state(1.0);
        let body = predict(
            State(state.clone()),
            form(&[
                ("case", "3"),
                ("alpha", "143.5"),
                ("delta", "12.25"),
                ("fiber_ID", "455"),
            ]),
        )
        .await;

        assert_eq!(body, "Error: anomaly model is not available");
        assert_eq!(
            state
                .metrics
                .prediction_errors
                .load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }

    #[tokio::test]
    async fn test_health_reports_slot_availability() {
        let state = test_state(1.0);
        let response = health(State(state)).await;

        assert_eq!(response.0.status, "healthy");
        assert_eq!(response.0.models.get("classification"), Some(&true));
        assert_eq!(response.0.models.get("redshift"), Some(&true));
        assert_eq!(response.0.models.get("anomaly"), Some(&false));

        let json = serde_json::to_value(&response.0).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["models"]["anomaly"], false);
    }

    #[tokio::test]
    async fn test_health_degraded_without_models() {
        let state = AppState {
            engine: Arc::new(InferenceEngine::from_models(None, None, None)),
            metrics: Arc::new(InferenceMetrics::new()),
        };
        let response = health(State(state)).await;

        assert_eq!(response.0.status, "degraded");
    }
}
