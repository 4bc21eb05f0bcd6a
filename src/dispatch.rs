//! The single dispatch boundary shared by the web and console front-ends.
//!
//! Selects a case, assembles the feature vector, invokes the model and
//! formats the result. Every failure past case selection is converted to
//! a user-visible error string here; nothing propagates to the caller.

use crate::features::FeatureVectorizer;
use crate::models::InferenceEngine;
use crate::types::{AnomalyStatus, Case, FeatureSet, RedshiftBin};
use anyhow::Result;
use tracing::debug;

/// Response for any selector outside {1, 2, 3}.
pub const INVALID_CASE: &str = "Invalid case selected.";

/// Run a prediction for a raw case selector and return the result string.
///
/// This is the whole caller-facing contract: valid selectors produce a
/// formatted prediction or an `Error: …` string, anything else produces
/// [`INVALID_CASE`] without touching a model.
pub fn dispatch(engine: &InferenceEngine, case_raw: &str, features: &FeatureSet) -> String {
    match Case::parse(case_raw) {
        Some(case) => match run_case(engine, case, features) {
            Ok(result) => result,
            Err(e) => format!("Error: {}", e),
        },
        None => INVALID_CASE.to_string(),
    }
}

/// Assemble the case's feature vector, run its model and format the result.
pub fn run_case(engine: &InferenceEngine, case: Case, features: &FeatureSet) -> Result<String> {
    let vectorizer = FeatureVectorizer::new();
    let vector = vectorizer.vectorize(case, features)?;
    let raw = engine.predict(case, &vector)?;

    debug!(case = %case.slot_name(), raw = raw, "Inference complete");

    Ok(format_outcome(case, raw))
}

/// Map a model's raw numeric output to the case's display string.
pub fn format_outcome(case: Case, raw: f32) -> String {
    let class = raw as i64;
    match case {
        Case::ObjectClassification => format!("Predicted Class: {}", class),
        Case::RedshiftBinning => {
            let label = RedshiftBin::from_class(class)
                .map(|bin| bin.to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            format!("Predicted Redshift Bin: {}", label)
        }
        Case::AnomalyDetection => {
            format!("Satellite Observation: {}", AnomalyStatus::from_class(class))
        }
    }
}
