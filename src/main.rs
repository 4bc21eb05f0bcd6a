//! Astro Inference Service - Main Entry Point
//!
//! Loads the three pre-trained models and serves predictions over HTTP.

use anyhow::Result;
use astro_inference_service::{
    config::AppConfig,
    metrics::{InferenceMetrics, MetricsReporter},
    models::InferenceEngine,
    server::{self, AppState},
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging; RUST_LOG overrides the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("astro_inference_service={}", config.logging.level))
    });
    if config.logging.format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting Astro Inference Service");

    // Initialize metrics
    let metrics = Arc::new(InferenceMetrics::new());

    // Initialize inference engine with ONNX models
    let engine = Arc::new(InferenceEngine::new(&config)?);
    for (name, available) in engine.availability() {
        info!(model = name, available = available, "Model slot status");
    }

    // Start metrics reporter (prints summary every 60 seconds)
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 60);
        reporter.start().await;
    });

    // Build router and serve
    let state = AppState { engine, metrics };
    let app = server::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
