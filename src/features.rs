//! Feature schemas and vector assembly for model inference.
//!
//! Each case reads a fixed set of named features and assembles them into
//! a vector in the exact order expected by the ONNX models.

use crate::types::{Case, FeatureSet};
use anyhow::{anyhow, Result};
use tracing::warn;

/// Photometric magnitudes used by the classification and redshift models.
const PHOTOMETRIC_FEATURES: [&str; 5] = ["u", "g", "r", "i", "z"];

/// Pointing coordinates plus fiber number used by the anomaly model.
const POINTING_FEATURES: [&str; 3] = ["alpha", "delta", "fiber_ID"];

/// Assembles per-case feature vectors from raw named string inputs.
///
/// Feature order matches the layout the models were trained against.
pub struct FeatureVectorizer;

impl FeatureVectorizer {
    /// Create a new feature vectorizer.
    pub fn new() -> Self {
        Self
    }

    /// Feature names read for a case, in model input order.
    pub fn feature_names(&self, case: Case) -> &'static [&'static str] {
        match case {
            Case::ObjectClassification | Case::RedshiftBinning => &PHOTOMETRIC_FEATURES,
            Case::AnomalyDetection => &POINTING_FEATURES,
        }
    }

    /// Number of features a case's model expects.
    pub fn feature_count(&self, case: Case) -> usize {
        self.feature_names(case).len()
    }

    /// Assemble the input vector for a case.
    ///
    /// A missing key defaults to 0.0 and is logged at warn level. A key
    /// that is present but not parseable as a number fails the whole
    /// prediction.
    pub fn vectorize(&self, case: Case, features: &FeatureSet) -> Result<Vec<f32>> {
        let names = self.feature_names(case);
        let mut vector = Vec::with_capacity(names.len());

        for &name in names {
            match features.get(name) {
                Some(raw) => {
                    let value: f32 = raw.trim().parse().map_err(|_| {
                        anyhow!("invalid value for feature `{}`: '{}'", name, raw)
                    })?;
                    vector.push(value);
                }
                None => {
                    warn!(case = %case.slot_name(), feature = name, "Missing input feature, defaulting to 0");
                    vector.push(0.0);
                }
            }
        }

        Ok(vector)
    }
}

impl Default for FeatureVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photometric_set() -> FeatureSet {
        FeatureSet::from([
            ("u".to_string(), "18.6".to_string()),
            ("g".to_string(), "17.2".to_string()),
            ("r".to_string(), "16.9".to_string()),
            ("i".to_string(), "16.7".to_string()),
            ("z".to_string(), "16.5".to_string()),
        ])
    }

    #[test]
    fn test_vectorize_photometric_order() {
        let vectorizer = FeatureVectorizer::new();
        let vector = vectorizer
            .vectorize(Case::ObjectClassification, &photometric_set())
            .unwrap();

        assert_eq!(vector, vec![18.6, 17.2, 16.9, 16.7, 16.5]);
    }

    #[test]
    fn test_redshift_shares_photometric_schema() {
        let vectorizer = FeatureVectorizer::new();
        assert_eq!(
            vectorizer.feature_names(Case::ObjectClassification),
            vectorizer.feature_names(Case::RedshiftBinning)
        );
        assert_eq!(vectorizer.feature_count(Case::RedshiftBinning), 5);
    }

    #[test]
    fn test_pointing_schema_uses_exact_field_names() {
        let vectorizer = FeatureVectorizer::new();
        assert_eq!(
            vectorizer.feature_names(Case::AnomalyDetection),
            &["alpha", "delta", "fiber_ID"]
        );
    }

    #[test]
    fn test_missing_keys_default_to_zero() {
        let vectorizer = FeatureVectorizer::new();
        let mut features = photometric_set();
        features.remove("g");
        features.remove("z");

        let vector = vectorizer
            .vectorize(Case::ObjectClassification, &features)
            .unwrap();

        assert_eq!(vector, vec![18.6, 0.0, 16.9, 16.7, 0.0]);
    }

    #[test]
    fn test_empty_set_is_all_zeros() {
        let vectorizer = FeatureVectorizer::new();
        let vector = vectorizer
            .vectorize(Case::AnomalyDetection, &FeatureSet::new())
            .unwrap();

        assert_eq!(vector, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let vectorizer = FeatureVectorizer::new();
        let mut features = photometric_set();
        features.insert("r".to_string(), "not-a-number".to_string());

        let err = vectorizer
            .vectorize(Case::ObjectClassification, &features)
            .unwrap_err();

        assert!(err.to_string().contains("feature `r`"));
    }

    #[test]
    fn test_surrounding_whitespace_is_accepted() {
        let vectorizer = FeatureVectorizer::new();
        let features = FeatureSet::from([
            ("alpha".to_string(), " 143.5 ".to_string()),
            ("delta".to_string(), "12.25".to_string()),
            ("fiber_ID".to_string(), "455".to_string()),
        ]);

        let vector = vectorizer
            .vectorize(Case::AnomalyDetection, &features)
            .unwrap();

        assert_eq!(vector, vec![143.5, 12.25, 455.0]);
    }
}
