//! Human-readable block reasons for flagged transactions.
//!
//! The reason cascade is a heuristic annotation over the raw transaction
//! fields, not an explanation of the model's internal decision. The model may
//! have flagged a transaction for reasons none of these rules capture, in
//! which case the generic fallback applies.

use crate::types::transaction::Transaction;

/// Message returned for transactions the model labels normal.
pub const MSG_APPROVED: &str = "Approved";

/// Block message for late-night transactions.
pub const MSG_LATE_NIGHT: &str = "Blocked: Suspicious Time (Late Night)";

/// Block message for rapid-fire transaction bursts.
pub const MSG_HIGH_FREQUENCY: &str = "Blocked: High Frequency Burst";

/// Block message for unusually large amounts.
pub const MSG_LARGE_AMOUNT: &str = "Blocked: Large Amount";

/// Block message when no specific rule matched.
pub const MSG_ANOMALOUS_PATTERN: &str = "Blocked: Anomalous Pattern";

/// Resolve the block reason for a flagged transaction.
///
/// Rules are evaluated in fixed priority order and the first match wins:
/// late night, then high frequency, then large amount, then the generic
/// fallback. Only called when the model labelled the transaction anomalous.
pub fn block_reason(tx: &Transaction) -> &'static str {
    if tx.hour < 5 {
        MSG_LATE_NIGHT
    } else if tx.frequency > 10 {
        MSG_HIGH_FREQUENCY
    } else if tx.amount > 5000.0 {
        MSG_LARGE_AMOUNT
    } else {
        MSG_ANOMALOUS_PATTERN
    }
}
