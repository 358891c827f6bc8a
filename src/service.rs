//! Per-request scoring orchestration.

use crate::features::FeatureExtractor;
use crate::model::Scorer;
use crate::reasons::{block_reason, MSG_APPROVED};
use crate::store::TransactionStore;
use crate::types::transaction::{Transaction, TransactionRecord};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Per-request scoring error.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Inference failed; nothing was persisted for this request.
    #[error("inference failed: {0}")]
    Inference(#[source] anyhow::Error),

    /// The decision was computed but could not be durably recorded. Callers
    /// must treat the response as non-authoritative.
    #[error("store write failed: {0}")]
    Store(#[from] sqlx::Error),
}

/// Outcome of scoring one transaction.
#[derive(Debug, Clone)]
pub struct ScoreOutcome {
    /// The persisted record
    pub record: TransactionRecord,
    /// Whether the model labelled the transaction anomalous
    pub is_fraud: bool,
    /// One of the five fixed response messages
    pub message: &'static str,
}

/// Orchestrates feature extraction, inference, reason resolution, and
/// persistence for each request.
///
/// Stateless between requests apart from the shared read-only scorer and the
/// append-only store, both injected at construction.
pub struct ScoringService {
    extractor: FeatureExtractor,
    scorer: Arc<dyn Scorer>,
    store: TransactionStore,
}

impl ScoringService {
    /// Create a new scoring service with injected collaborators.
    pub fn new(scorer: Arc<dyn Scorer>, store: TransactionStore) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            scorer,
            store,
        }
    }

    /// Score one transaction and append the decision to the log.
    pub async fn score(&self, tx: Transaction) -> Result<ScoreOutcome, ScoreError> {
        let features = self.extractor.extract(&tx);

        let label = self
            .scorer
            .score(&features)
            .map_err(ScoreError::Inference)?;
        let is_fraud = label.is_anomalous();

        let message = if is_fraud { block_reason(&tx) } else { MSG_APPROVED };

        debug!(
            transaction_id = %tx.transaction_id,
            is_fraud = is_fraud,
            message = message,
            "Transaction scored"
        );

        let record = self.store.append(&tx, label.as_i64()).await?;

        info!(
            transaction_id = %record.transaction_id,
            record_id = record.id,
            prediction = record.prediction,
            "Decision recorded"
        );

        Ok(ScoreOutcome {
            record,
            is_fraud,
            message,
        })
    }
}
