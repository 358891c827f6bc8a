//! Durable append-only transaction log backed by SQLite.

use crate::types::transaction::{Transaction, TransactionRecord};
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::info;

/// Table schema for scored transactions.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    transaction_id TEXT NOT NULL,
    amount REAL NOT NULL,
    distance_km REAL NOT NULL,
    hour INTEGER NOT NULL,
    frequency INTEGER NOT NULL,
    prediction INTEGER NOT NULL,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transactions_timestamp ON transactions(timestamp);
CREATE INDEX IF NOT EXISTS idx_transactions_txid ON transactions(transaction_id);
"#;

/// Append-only store of scored transactions.
///
/// Owns an injected connection pool; handlers and the monitor share a clone
/// rather than a process-global session. Records are never updated or
/// deleted here; retention is an external concern.
#[derive(Clone)]
pub struct TransactionStore {
    pool: SqlitePool,
}

impl TransactionStore {
    /// Wrap an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the database at `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Apply the schema.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        info!("Database schema applied successfully");
        Ok(())
    }

    /// Append a scored transaction, assigning identity and timestamp.
    ///
    /// Returns the stored record. Each append is independent; concurrent
    /// callers are serialized by the pool and SQLite's own write lock.
    pub async fn append(
        &self,
        tx: &Transaction,
        prediction: i64,
    ) -> Result<TransactionRecord, sqlx::Error> {
        let timestamp = Utc::now();

        sqlx::query_as::<_, TransactionRecord>(
            r#"
            INSERT INTO transactions (transaction_id, amount, distance_km, hour, frequency, prediction, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&tx.transaction_id)
        .bind(tx.amount)
        .bind(tx.distance_km)
        .bind(tx.hour)
        .bind(tx.frequency)
        .bind(prediction)
        .bind(timestamp)
        .fetch_one(&self.pool)
        .await
    }

    /// Fetch up to `limit` most recently appended records, newest first.
    ///
    /// Ordering is by timestamp descending with id descending as a tiebreak,
    /// so results are totally ordered even when appends share a timestamp.
    pub async fn recent(&self, limit: i64) -> Result<Vec<TransactionRecord>, sqlx::Error> {
        sqlx::query_as::<_, TransactionRecord>(
            "SELECT * FROM transactions ORDER BY timestamp DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}

/// Whether an error reflects transient unavailability (worth retrying later)
/// rather than a permanent failure.
///
/// SQLite reports lock contention as `database is locked` / `database is
/// busy`; pool exhaustion and dropped connections are likewise transient.
pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => true,
        sqlx::Error::Database(db) => {
            let msg = db.message().to_lowercase();
            msg.contains("locked") || msg.contains("busy")
        }
        _ => false,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// In-memory store for tests. A single connection keeps every query on
    /// the same in-memory database.
    pub(crate) async fn memory_store() -> TransactionStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = TransactionStore::new(pool);
        store.migrate().await.unwrap();
        store
    }

    fn tx(id: &str, amount: f64) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            amount,
            distance_km: 5.0,
            hour: 14,
            frequency: 2,
        }
    }

    #[tokio::test]
    async fn test_append_assigns_identity_and_timestamp() {
        let store = memory_store().await;

        let record = store.append(&tx("tx_1", 100.0), 1).await.unwrap();

        assert!(record.id > 0);
        assert_eq!(record.transaction_id, "tx_1");
        assert_eq!(record.amount, 100.0);
        assert_eq!(record.hour, Some(14));
        assert_eq!(record.frequency, Some(2));
        assert_eq!(record.prediction, 1);
    }

    #[tokio::test]
    async fn test_duplicate_transaction_ids_are_allowed() {
        let store = memory_store().await;

        let first = store.append(&tx("tx_dup", 10.0), 1).await.unwrap();
        let second = store.append(&tx("tx_dup", 20.0), -1).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.recent(10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_recent_orders_newest_first_and_respects_limit() {
        let store = memory_store().await;

        for i in 0..5 {
            store.append(&tx(&format!("tx_{i}"), i as f64), 1).await.unwrap();
        }

        let records = store.recent(3).await.unwrap();
        assert_eq!(records.len(), 3);
        // Appends within the same timestamp tick fall back to id ordering.
        assert!(records.windows(2).all(|w| {
            w[0].timestamp > w[1].timestamp
                || (w[0].timestamp == w[1].timestamp && w[0].id > w[1].id)
        }));
        assert_eq!(records[0].transaction_id, "tx_4");
    }

    #[tokio::test]
    async fn test_recent_on_empty_store() {
        let store = memory_store().await;
        assert!(store.recent(200).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recent_never_exceeds_total() {
        let store = memory_store().await;
        store.append(&tx("tx_only", 1.0), 1).await.unwrap();

        assert_eq!(store.recent(200).await.unwrap().len(), 1);
    }
}
