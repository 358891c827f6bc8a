//! Anomaly scorer wrapping the pretrained model

use crate::model::loader::{LoadedModel, ModelLoader};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::RwLock;
use tracing::debug;

/// Binary anomaly label produced by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// Raw prediction `1`
    Normal,
    /// Raw prediction `-1`
    Anomalous,
}

impl Label {
    /// Map the model's raw integer prediction to a label.
    pub fn from_raw(raw: i64) -> Self {
        if raw == -1 {
            Label::Anomalous
        } else {
            Label::Normal
        }
    }

    /// The raw integer prediction as persisted (`1` or `-1`).
    pub fn as_i64(self) -> i64 {
        match self {
            Label::Normal => 1,
            Label::Anomalous => -1,
        }
    }

    pub fn is_anomalous(self) -> bool {
        self == Label::Anomalous
    }
}

/// Maps a feature vector to a binary anomaly label.
///
/// The decision boundary is opaque to callers; only the label is consumed.
/// Implementations must be safe to share across concurrent requests.
pub trait Scorer: Send + Sync {
    /// Score a feature vector.
    ///
    /// The vector must use the same ordering and units as at training time.
    /// Errors are per-request: a failed inference must not poison the scorer.
    fn score(&self, features: &[f32]) -> Result<Label>;
}

/// Scorer backed by a pretrained ONNX model loaded once at startup.
pub struct OnnxScorer {
    /// Loaded model (RwLock because ort sessions need `&mut` to run)
    model: RwLock<LoadedModel>,
}

impl OnnxScorer {
    /// Load the model artifact from `path`.
    ///
    /// Failure here is fatal by contract: the service must not start without
    /// a model.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let loader = ModelLoader::new()?;
        let model = loader.load_model(path)?;
        Ok(Self {
            model: RwLock::new(model),
        })
    }

    /// Load with an explicit ONNX thread count.
    pub fn load_with_threads<P: AsRef<Path>>(path: P, onnx_threads: usize) -> Result<Self> {
        let loader = ModelLoader::with_threads(onnx_threads)?;
        let model = loader.load_model(path)?;
        Ok(Self {
            model: RwLock::new(model),
        })
    }

    /// Extract the raw label from the session outputs.
    fn extract_label(
        outputs: &ort::session::SessionOutputs,
        output_name: &str,
    ) -> Result<i64> {
        // Preferred path: the named label output as an int64 tensor.
        if let Some(output) = outputs.get(output_name) {
            if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
                return data
                    .first()
                    .copied()
                    .context("Label output tensor was empty");
            }
        }

        // Fallback: the first int64 tensor among all outputs.
        for (name, output) in outputs.iter() {
            if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
                if let Some(&raw) = data.first() {
                    debug!(output = %name, raw = raw, "Extracted label from fallback output");
                    return Ok(raw);
                }
            }
        }

        anyhow::bail!("No label output found in model outputs")
    }
}

impl Scorer for OnnxScorer {
    fn score(&self, features: &[f32]) -> Result<Label> {
        use ort::value::Tensor;

        // Input tensor shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .context("Failed to create input tensor")?;

        let mut model = self
            .model
            .write()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
        let input_name = model.input_name.clone();
        let output_name = model.output_name.clone();

        let outputs = model.session.run(ort::inputs![input_name => input_tensor])?;

        let raw = Self::extract_label(&outputs, &output_name)?;
        let label = Label::from_raw(raw);

        debug!(raw = raw, anomalous = label.is_anomalous(), "Inference complete");

        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_raw() {
        assert_eq!(Label::from_raw(-1), Label::Anomalous);
        assert_eq!(Label::from_raw(1), Label::Normal);
        // Anything other than -1 is treated as normal.
        assert_eq!(Label::from_raw(0), Label::Normal);
    }

    #[test]
    fn test_label_round_trip() {
        assert_eq!(Label::Normal.as_i64(), 1);
        assert_eq!(Label::Anomalous.as_i64(), -1);
        assert!(Label::Anomalous.is_anomalous());
        assert!(!Label::Normal.is_anomalous());
    }
}
