//! Interactive console tester for the prediction models.
//!
//! Loads the same model artifacts as the server, prompts for a case and
//! its input features, and prints the result string.

use anyhow::Result;
use astro_inference_service::{
    config::AppConfig,
    dispatch,
    models::InferenceEngine,
    types::{Case, FeatureSet},
    FeatureVectorizer,
};
use std::io::{self, Write};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn main() -> Result<()> {
    // Keep loader warnings visible; RUST_LOG overrides
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("astro_inference_service=warn")),
        )
        .init();

    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "No usable config file, using defaults");
        AppConfig::default()
    });

    let engine = InferenceEngine::new(&config)?;

    println!("Welcome to the Prediction Tester!");
    println!("Select a case:");
    println!("1: Object Classification");
    println!("2: Photometric Redshift Binning");
    println!("3: Satellite Anomaly Detection");
    let case_raw = prompt("Enter the case number (1/2/3): ")?;

    let Some(case) = Case::parse(&case_raw) else {
        println!("Invalid case selected. Exiting.");
        return Ok(());
    };

    println!("Enter the following input features:");
    let vectorizer = FeatureVectorizer::new();
    let mut features = FeatureSet::new();
    for &name in vectorizer.feature_names(case) {
        let value = prompt(&format!("{}: ", name))?;
        features.insert(name.to_string(), value);
    }

    let result = dispatch::dispatch(&engine, &case_raw, &features);

    println!();
    println!("Prediction Result:");
    println!("{}", result);

    Ok(())
}
