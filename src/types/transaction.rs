//! Transaction data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An incoming transaction submitted for scoring.
///
/// Field values are taken as-is: an out-of-range `hour` or a negative
/// `amount` is passed through to the model unchanged, matching whatever the
/// model was trained on. Only the *shape* of the payload is validated, and
/// that happens at the HTTP layer before this type is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Caller-supplied identifier. Uniqueness is not enforced; duplicate
    /// submissions produce duplicate records.
    pub transaction_id: String,

    /// Transaction amount
    pub amount: f64,

    /// Distance from the account's usual location, in kilometers
    pub distance_km: f64,

    /// Hour of day the transaction occurred (intended domain 0-23)
    pub hour: i64,

    /// Count of recent transactions by the same actor
    pub frequency: i64,
}

/// A scored transaction as persisted in the `transactions` table.
///
/// Immutable once written; `id` and `timestamp` are assigned by the store at
/// append time. `hour` and `frequency` are optional on the read path so the
/// monitor can work against an older schema that lacks those columns.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TransactionRecord {
    /// Store-assigned surrogate identity (monotonically increasing)
    pub id: i64,

    /// Caller-supplied transaction identifier
    pub transaction_id: String,

    /// Transaction amount
    pub amount: f64,

    /// Distance from the account's usual location, in kilometers
    pub distance_km: f64,

    /// Hour of day (absent when reading an older schema)
    #[sqlx(default)]
    pub hour: Option<i64>,

    /// Recent transaction count (absent when reading an older schema)
    #[sqlx(default)]
    pub frequency: Option<i64>,

    /// Model label: `1` = normal, `-1` = anomalous
    pub prediction: i64,

    /// Append time, assigned by the store
    pub timestamp: DateTime<Utc>,
}

impl TransactionRecord {
    /// Whether the model flagged this transaction as anomalous.
    pub fn is_anomalous(&self) -> bool {
        self.prediction == -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_deserialization() {
        let json = r#"{
            "transaction_id": "tx_123",
            "amount": 100.0,
            "distance_km": 5.0,
            "hour": 14,
            "frequency": 2
        }"#;

        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.transaction_id, "tx_123");
        assert_eq!(tx.amount, 100.0);
        assert_eq!(tx.hour, 14);
        assert_eq!(tx.frequency, 2);
    }

    #[test]
    fn test_transaction_rejects_malformed_types() {
        let json = r#"{
            "transaction_id": "tx_123",
            "amount": "a lot",
            "distance_km": 5.0,
            "hour": 14,
            "frequency": 2
        }"#;

        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }

    #[test]
    fn test_record_anomaly_flag() {
        let record = TransactionRecord {
            id: 1,
            transaction_id: "tx_1".to_string(),
            amount: 50.0,
            distance_km: 2.0,
            hour: Some(14),
            frequency: Some(1),
            prediction: -1,
            timestamp: Utc::now(),
        };

        assert!(record.is_anomalous());
    }
}
