//! Configuration management for the inference service

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub models: ModelsConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port for the HTTP listener
    #[serde(default = "default_port")]
    pub port: u16,
}

/// ML models configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Directory containing ONNX model files
    pub models_dir: String,
    /// Object classification model filename
    #[serde(default = "default_classification_model")]
    pub classification_model: String,
    /// Photometric redshift binning model filename
    #[serde(default = "default_redshift_model")]
    pub redshift_model: String,
    /// Satellite anomaly detection model filename
    #[serde(default = "default_anomaly_model")]
    pub anomaly_model: String,
    /// Number of threads for ONNX inference per model (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_classification_model() -> String {
    "classification_model.onnx".to_string()
}

fn default_redshift_model() -> String {
    "redshift_model.onnx".to_string()
}

fn default_anomaly_model() -> String {
    "anomaly_model.onnx".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            models: ModelsConfig {
                models_dir: "models".to_string(),
                classification_model: default_classification_model(),
                redshift_model: default_redshift_model(),
                anomaly_model: default_anomaly_model(),
                onnx_threads: 1,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
