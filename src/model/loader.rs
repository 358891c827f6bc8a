//! ONNX model loader

use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::info;

/// Loaded ONNX model with metadata
pub struct LoadedModel {
    /// ONNX Runtime session
    pub session: Session,
    /// Input name for the model
    pub input_name: String,
    /// Output name for the predicted label
    pub output_name: String,
}

/// Loader for the anomaly model artifact
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread)
    pub fn new() -> Result<Self> {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        // Initialize ONNX Runtime
        ort::init().commit()?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load the anomaly model from file.
    ///
    /// A missing or unreadable artifact is an error; callers at startup treat
    /// it as fatal.
    pub fn load_model<P: AsRef<Path>>(&self, path: P) -> Result<LoadedModel> {
        let path = path.as_ref();

        info!(path = %path.display(), threads = self.onnx_threads, "Loading anomaly model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        // Get input/output names. Isolation-forest exports carry a "label"
        // output alongside raw scores; prefer it when present.
        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("label"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .first()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "label".to_string())
            });

        info!(
            input = %input_name,
            output = %output_name,
            "Model loaded successfully"
        );

        Ok(LoadedModel {
            session,
            input_name,
            output_name,
        })
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self { onnx_threads: 1 }
    }
}
