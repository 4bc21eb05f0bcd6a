//! ML model inference components

pub mod inference;
pub mod loader;

pub use inference::{InferenceEngine, Model};
pub use loader::ModelLoader;
