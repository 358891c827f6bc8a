//! Anomaly model loading and inference

pub mod loader;
pub mod scorer;

pub use loader::{LoadedModel, ModelLoader};
pub use scorer::{Label, OnnxScorer, Scorer};
