//! Feature extraction for anomaly model inference.
//!
//! Transforms a transaction into the numeric vector the pretrained model
//! expects. The ordering here must match the ordering used at training time;
//! reordering silently changes scoring semantics.

use crate::types::transaction::Transaction;

/// Feature extractor that transforms transactions into model input features.
///
/// Features are produced in the exact order expected by the ONNX model:
/// `[amount, distance_km, hour, frequency]`. No normalization, clamping, or
/// validation is applied.
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract the fixed-order feature vector from a transaction.
    pub fn extract(&self, tx: &Transaction) -> Vec<f32> {
        vec![
            tx.amount as f32,
            tx.distance_km as f32,
            tx.hour as f32,
            tx.frequency as f32,
        ]
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        4
    }

    /// Get feature names, matching training order.
    pub fn feature_names(&self) -> Vec<&'static str> {
        vec!["amount", "distance_km", "hour", "frequency"]
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx() -> Transaction {
        Transaction {
            transaction_id: "tx_001".to_string(),
            amount: 250.5,
            distance_km: 12.0,
            hour: 14,
            frequency: 3,
        }
    }

    #[test]
    fn test_feature_ordering() {
        let extractor = FeatureExtractor::new();
        let features = extractor.extract(&sample_tx());

        assert_eq!(features, vec![250.5, 12.0, 14.0, 3.0]);
    }

    #[test]
    fn test_feature_count() {
        let extractor = FeatureExtractor::new();
        assert_eq!(extractor.feature_count(), 4);
        assert_eq!(extractor.feature_names().len(), 4);
    }

    #[test]
    fn test_out_of_range_values_pass_through() {
        let extractor = FeatureExtractor::new();
        let mut tx = sample_tx();
        tx.hour = 99;
        tx.amount = -5.0;

        let features = extractor.extract(&tx);
        assert_eq!(features[0], -5.0);
        assert_eq!(features[2], 99.0);
    }
}
