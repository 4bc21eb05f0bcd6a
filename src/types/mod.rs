//! Type definitions for the inference service

use std::collections::HashMap;

pub mod case;
pub mod prediction;

pub use case::Case;
pub use prediction::{AnomalyStatus, RedshiftBin};

/// Raw named inputs for one observation, as submitted by a caller.
///
/// Only the keys relevant to the active case are read; missing keys
/// default to 0.0 during vector assembly.
pub type FeatureSet = HashMap<String, String>;
