//! Astro Inference Service Library
//!
//! Serves three pre-trained astronomical classification models
//! (object classification, photometric redshift binning, satellite
//! anomaly detection) behind a web form and a console tester.

pub mod config;
pub mod dispatch;
pub mod features;
pub mod metrics;
pub mod models;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use features::FeatureVectorizer;
pub use models::inference::{InferenceEngine, Model};
pub use types::{Case, FeatureSet};
