//! Inference engine over the three fixed model slots

use crate::config::AppConfig;
use crate::models::loader::{LoadedModel, ModelLoader};
use crate::types::Case;
use anyhow::{anyhow, Context, Result};
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

/// A pre-trained model exposing a single predict-from-vector capability.
///
/// The dispatch layer only ever sees this seam; ONNX types stay behind it.
pub trait Model: Send {
    /// Run one forward pass and return the raw predicted value.
    fn predict(&mut self, features: &[f32]) -> Result<f32>;
}

/// One process-lifetime model holder. Empty when loading failed at startup.
struct ModelSlot {
    name: &'static str,
    model: Option<Mutex<Box<dyn Model>>>,
}

impl ModelSlot {
    fn predict(&self, features: &[f32]) -> Result<f32> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| anyhow!("{} model is not available", self.name))?;

        let mut model = model
            .lock()
            .map_err(|e| anyhow!("Lock error: {}", e))?;

        model.predict(features)
    }

    fn available(&self) -> bool {
        self.model.is_some()
    }
}

/// Holds the three pre-trained models for the process lifetime.
///
/// Slots whose artifact failed to load stay unusable; predictions against
/// them surface as errors at the dispatch boundary.
pub struct InferenceEngine {
    classification: ModelSlot,
    redshift: ModelSlot,
    anomaly: ModelSlot,
}

impl InferenceEngine {
    /// Load all three model artifacts from the configured paths.
    ///
    /// A per-model load failure logs the error and leaves that slot
    /// unusable; it does not crash the process.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let loader = ModelLoader::with_threads(config.models.onnx_threads)?;
        let models_dir = Path::new(&config.models.models_dir);

        let engine = Self {
            classification: Self::load_slot(
                &loader,
                &models_dir.join(&config.models.classification_model),
                "classification",
            ),
            redshift: Self::load_slot(
                &loader,
                &models_dir.join(&config.models.redshift_model),
                "redshift",
            ),
            anomaly: Self::load_slot(
                &loader,
                &models_dir.join(&config.models.anomaly_model),
                "anomaly",
            ),
        };

        if engine.usable_count() == 0 {
            error!(
                models_dir = %models_dir.display(),
                "No models loaded; every prediction will fail"
            );
        } else {
            info!(
                count = engine.usable_count(),
                models = ?engine.usable_models(),
                "Inference engine initialized"
            );
        }

        Ok(engine)
    }

    /// Build an engine from pre-constructed models. Used by tests.
    pub fn from_models(
        classification: Option<Box<dyn Model>>,
        redshift: Option<Box<dyn Model>>,
        anomaly: Option<Box<dyn Model>>,
    ) -> Self {
        Self {
            classification: ModelSlot {
                name: "classification",
                model: classification.map(Mutex::new),
            },
            redshift: ModelSlot {
                name: "redshift",
                model: redshift.map(Mutex::new),
            },
            anomaly: ModelSlot {
                name: "anomaly",
                model: anomaly.map(Mutex::new),
            },
        }
    }

    fn load_slot(loader: &ModelLoader, path: &Path, name: &'static str) -> ModelSlot {
        let model = match loader.load_model(path, name) {
            Ok(model) => Some(Mutex::new(Box::new(model) as Box<dyn Model>)),
            Err(e) => {
                warn!(model = %name, error = %e, "Failed to load model, slot disabled");
                None
            }
        };

        ModelSlot { name, model }
    }

    fn slot(&self, case: Case) -> &ModelSlot {
        match case {
            Case::ObjectClassification => &self.classification,
            Case::RedshiftBinning => &self.redshift,
            Case::AnomalyDetection => &self.anomaly,
        }
    }

    /// Run the model selected by `case` on an assembled feature vector.
    pub fn predict(&self, case: Case, features: &[f32]) -> Result<f32> {
        self.slot(case).predict(features)
    }

    /// Whether the model backing a case is usable.
    pub fn available(&self, case: Case) -> bool {
        self.slot(case).available()
    }

    /// Slot availability in selector order, for startup logging and health.
    pub fn availability(&self) -> [(&'static str, bool); 3] {
        [
            (self.classification.name, self.classification.available()),
            (self.redshift.name, self.redshift.available()),
            (self.anomaly.name, self.anomaly.available()),
        ]
    }

    /// Number of usable model slots.
    pub fn usable_count(&self) -> usize {
        self.availability().iter().filter(|(_, ok)| *ok).count()
    }

    /// Names of usable model slots.
    pub fn usable_models(&self) -> Vec<&'static str> {
        self.availability()
            .iter()
            .filter(|(_, ok)| *ok)
            .map(|(name, _)| *name)
            .collect()
    }
}

impl Model for LoadedModel {
    fn predict(&mut self, features: &[f32]) -> Result<f32> {
        use ort::value::Tensor;

        // Prepare input tensor - shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .context("Failed to create input tensor")?;

        let model_name = self.name.clone();

        // Run inference
        let outputs = self
            .session
            .run(ort::inputs![&self.input_name => input_tensor])?;

        extract_class(&outputs, &self.output_name, &model_name)
    }
}

/// Extract the predicted class from model output.
/// Handles int64 label tensors, float tensors (single value or per-class
/// probabilities) and the seq(map(int64, float)) shape emitted by
/// scikit-learn ONNX exports.
fn extract_class(
    outputs: &ort::session::SessionOutputs,
    output_name: &str,
    model_name: &str,
) -> Result<f32> {
    // First, try the discovered label output by name
    if let Some(output) = outputs.get(output_name) {
        if let Ok(class) = extract_class_from_value(output, model_name) {
            return Ok(class);
        }
    }

    // Fallback: iterate all outputs and try extraction
    for (name, output) in outputs.iter() {
        // Skip probability outputs when a label output exists alongside
        if name.contains("prob") {
            continue;
        }

        if let Ok(class) = extract_class_from_value(&output, model_name) {
            debug!(model = %model_name, output = %name, class = class, "Extracted from fallback output");
            return Ok(class);
        }
    }

    // Last resort: probability outputs still identify the class via arg-max
    for (name, output) in outputs.iter() {
        if let Ok(class) = extract_class_from_value(&output, model_name) {
            debug!(model = %model_name, output = %name, class = class, "Extracted from probability output");
            return Ok(class);
        }
    }

    Err(anyhow!("{} model produced no usable output", model_name))
}

fn extract_class_from_value(output: &ort::value::DynValue, model_name: &str) -> Result<f32> {
    let dtype = output.dtype();

    // Try int64 label tensor first (classifier exports)
    if let Ok(tensor) = output.try_extract_tensor::<i64>() {
        let (_, data) = tensor;
        let class = data
            .first()
            .copied()
            .ok_or_else(|| anyhow!("Empty label tensor"))?;
        debug!(model = %model_name, class = class, "Extracted from label tensor");
        return Ok(class as f32);
    }

    // Then float tensors: a single value, or per-class probabilities
    if let Ok(tensor) = output.try_extract_tensor::<f32>() {
        let (shape, data) = tensor;
        let class = class_from_tensor(&shape, data)?;
        debug!(model = %model_name, class = class, "Extracted from tensor");
        return Ok(class);
    }

    // seq(map(int64, float)) probabilities - take the arg-max class
    if DynSequenceValueType::can_downcast(&dtype) {
        return class_from_sequence_map(output, model_name);
    }

    Err(anyhow!("Unsupported output type"))
}

/// Predicted class from float tensor data.
fn class_from_tensor(shape: &ort::tensor::Shape, data: &[f32]) -> Result<f32> {
    let dims: Vec<i64> = shape.iter().copied().collect();

    let width = match dims.as_slice() {
        [_, n] => *n as usize,
        [n] => *n as usize,
        _ => data.len(),
    };

    if width == 1 {
        // [batch, 1] or [1] - the value is the prediction itself
        return data
            .first()
            .copied()
            .ok_or_else(|| anyhow!("Empty output tensor"));
    }

    // [batch, num_classes] - arg-max over the class axis
    let (class, _) = data
        .iter()
        .take(width)
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .ok_or_else(|| anyhow!("Empty output tensor"))?;

    Ok(class as f32)
}

/// Predicted class from seq(map(int64, float)) probabilities.
fn class_from_sequence_map(output: &ort::value::DynValue, model_name: &str) -> Result<f32> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow!("Failed to downcast to sequence: {}", e))?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

    if maps.is_empty() {
        return Err(anyhow!("Empty sequence"));
    }

    // Batch size is always 1, so only the first map matters
    let kv_pairs = maps[0].try_extract_key_values::<i64, f32>()?;

    let (class, prob) = kv_pairs
        .iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .ok_or_else(|| anyhow!("No probability found in map"))?;

    debug!(
        model = %model_name,
        class = class,
        prob = prob,
        "Extracted from seq(map)"
    );

    Ok(*class as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedModel(f32);

    impl Model for FixedModel {
        fn predict(&mut self, _features: &[f32]) -> Result<f32> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_predict_routes_to_case_slot() {
        let engine = InferenceEngine::from_models(
            Some(Box::new(FixedModel(2.0))),
            Some(Box::new(FixedModel(1.0))),
            Some(Box::new(FixedModel(0.0))),
        );

        assert_eq!(
            engine.predict(Case::ObjectClassification, &[0.0; 5]).unwrap(),
            2.0
        );
        assert_eq!(engine.predict(Case::RedshiftBinning, &[0.0; 5]).unwrap(), 1.0);
        assert_eq!(engine.predict(Case::AnomalyDetection, &[0.0; 3]).unwrap(), 0.0);
    }

    #[test]
    fn test_empty_slot_is_an_error() {
        let engine =
            InferenceEngine::from_models(None, Some(Box::new(FixedModel(1.0))), None);

        let err = engine
            .predict(Case::ObjectClassification, &[0.0; 5])
            .unwrap_err();
        assert!(err.to_string().contains("classification model is not available"));

        assert!(!engine.available(Case::ObjectClassification));
        assert!(engine.available(Case::RedshiftBinning));
        assert_eq!(engine.usable_count(), 1);
        assert_eq!(engine.usable_models(), vec!["redshift"]);
    }
}
