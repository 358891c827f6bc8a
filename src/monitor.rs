//! Live monitor: periodic KPI recomputation over the transaction log.
//!
//! An independent process loop that re-reads the most recent window from the
//! store each cycle, recomputes the KPI snapshot from scratch, and hands the
//! result to a rendering sink. A failed read never terminates the loop; the
//! monitor reports the outage and retries after an extended delay, forever.

use crate::store::{is_transient, TransactionStore};
use crate::types::transaction::TransactionRecord;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// Per-record status derived from the persisted prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnStatus {
    Approved,
    Blocked,
}

impl TxnStatus {
    pub fn from_prediction(prediction: i64) -> Self {
        if prediction == -1 {
            TxnStatus::Blocked
        } else {
            TxnStatus::Approved
        }
    }
}

impl fmt::Display for TxnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxnStatus::Approved => write!(f, "APPROVED"),
            TxnStatus::Blocked => write!(f, "BLOCKED"),
        }
    }
}

/// One display row of the live feed.
#[derive(Debug, Clone)]
pub struct FeedRow {
    pub timestamp: DateTime<Utc>,
    pub amount: f64,
    pub distance_km: f64,
    /// Absent when the stored schema predates this column
    pub hour: Option<i64>,
    /// Absent when the stored schema predates this column
    pub frequency: Option<i64>,
    pub status: TxnStatus,
}

impl FeedRow {
    pub fn from_record(record: &TransactionRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            amount: record.amount,
            distance_km: record.distance_km,
            hour: record.hour,
            frequency: record.frequency,
            status: TxnStatus::from_prediction(record.prediction),
        }
    }
}

/// Rolling KPIs over the observed window. Recomputed from scratch every
/// cycle, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiSnapshot {
    /// Records in the observed window
    pub total: usize,
    /// Records with prediction -1
    pub fraud_count: usize,
    /// Percentage of the window flagged, 0.0 for an empty window
    pub fraud_rate: f64,
}

impl KpiSnapshot {
    /// Compute the snapshot over one window of records.
    pub fn compute(records: &[TransactionRecord]) -> Self {
        let total = records.len();
        let fraud_count = records.iter().filter(|r| r.is_anomalous()).count();
        let fraud_rate = if total > 0 {
            (fraud_count as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        Self {
            total,
            fraud_count,
            fraud_rate,
        }
    }
}

/// Consumer of each monitor cycle's output. The rendering toolkit behind it
/// is an external collaborator; the monitor only produces snapshot and rows.
pub trait MonitorSink: Send {
    /// Render one cycle's snapshot and feed.
    fn render(&mut self, snapshot: &KpiSnapshot, rows: &[FeedRow]);

    /// Report a failed store read as a transient connectivity message.
    fn render_error(&mut self, message: &str);
}

/// Sink that renders the KPI header and feed table through `tracing`.
pub struct ConsoleSink {
    /// Feed rows shown per cycle
    max_rows: usize,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self { max_rows: 15 }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorSink for ConsoleSink {
    fn render(&mut self, snapshot: &KpiSnapshot, rows: &[FeedRow]) {
        if snapshot.total == 0 {
            warn!("Waiting for data... no transactions recorded yet");
            return;
        }

        info!("╔════════════════════════════════════════════════════════╗");
        info!("║               LIVE FRAUD MONITOR                       ║");
        info!("╠════════════════════════════════════════════════════════╣");
        info!(
            "║ Recent: {:>6}  │  Fraud: {:>6}  │  Rate: {:>5.1}%      ║",
            snapshot.total, snapshot.fraud_count, snapshot.fraud_rate
        );
        info!("╠════════════════════════════════════════════════════════╣");
        for row in rows.iter().take(self.max_rows) {
            let hour = row
                .hour
                .map(|h| h.to_string())
                .unwrap_or_else(|| "-".to_string());
            let freq = row
                .frequency
                .map(|f| f.to_string())
                .unwrap_or_else(|| "-".to_string());
            info!(
                "║ {} │ {:>9.2} │ {:>8.1} km │ {:>2}h │ {:>3}x │ {:>8} ║",
                row.timestamp.format("%H:%M:%S"),
                row.amount,
                row.distance_km,
                hour,
                freq,
                row.status
            );
        }
        info!("╚════════════════════════════════════════════════════════╝");
    }

    fn render_error(&mut self, message: &str) {
        warn!("{}", message);
    }
}

/// Periodic monitor loop over the transaction store.
pub struct LiveMonitor {
    store: TransactionStore,
    /// Window size read each cycle
    window: i64,
    /// Delay between successful cycles
    interval: Duration,
    /// Extended delay after a failed store read
    retry_interval: Duration,
}

impl LiveMonitor {
    pub fn new(
        store: TransactionStore,
        window: i64,
        interval: Duration,
        retry_interval: Duration,
    ) -> Self {
        Self {
            store,
            window,
            interval,
            retry_interval,
        }
    }

    /// Run one cycle: read, derive, render. Returns the delay before the
    /// next cycle.
    async fn cycle<S: MonitorSink>(&self, sink: &mut S) -> Duration {
        match self.store.recent(self.window).await {
            Ok(records) => {
                let rows: Vec<FeedRow> = records.iter().map(FeedRow::from_record).collect();
                let snapshot = KpiSnapshot::compute(&records);
                sink.render(&snapshot, &rows);
                self.interval
            }
            Err(e) => {
                let detail = if is_transient(&e) {
                    format!("Database connecting... ({})", e)
                } else {
                    format!("Store read failed ({})", e)
                };
                sink.render_error(&detail);
                self.retry_interval
            }
        }
    }

    /// Run cycles until the shutdown signal flips to `true` (or its sender
    /// is dropped). Cycles never overlap; a slow cycle delays the next one.
    pub async fn run<S: MonitorSink>(&self, sink: &mut S, mut shutdown: watch::Receiver<bool>) {
        info!(
            window = self.window,
            interval_secs = self.interval.as_secs_f64(),
            "Live monitor started"
        );

        'cycles: loop {
            let delay = self.cycle(sink).await;

            let sleep = tokio::time::sleep(delay);
            tokio::pin!(sleep);

            // Wait out the full delay; a watch change that is not a shutdown
            // re-arms the remaining sleep instead of starting the next cycle
            // early.
            loop {
                tokio::select! {
                    _ = &mut sleep => break,
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break 'cycles;
                        }
                    }
                }
            }
        }

        info!("Live monitor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::memory_store;
    use crate::types::transaction::Transaction;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::{Arc, Mutex};

    fn record(prediction: i64) -> TransactionRecord {
        TransactionRecord {
            id: 1,
            transaction_id: "tx_1".to_string(),
            amount: 100.0,
            distance_km: 5.0,
            hour: Some(14),
            frequency: Some(2),
            prediction,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_kpi_empty_window() {
        let snapshot = KpiSnapshot::compute(&[]);

        assert_eq!(snapshot.total, 0);
        assert_eq!(snapshot.fraud_count, 0);
        assert_eq!(snapshot.fraud_rate, 0.0);
    }

    #[test]
    fn test_kpi_fraud_rate() {
        let records = vec![record(1), record(-1), record(-1), record(1)];
        let snapshot = KpiSnapshot::compute(&records);

        assert_eq!(snapshot.total, 4);
        assert_eq!(snapshot.fraud_count, 2);
        assert!((snapshot.fraud_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_status_from_prediction() {
        assert_eq!(TxnStatus::from_prediction(-1), TxnStatus::Blocked);
        assert_eq!(TxnStatus::from_prediction(1), TxnStatus::Approved);
        assert_eq!(TxnStatus::Blocked.to_string(), "BLOCKED");
    }

    /// Sink recording every cycle for assertions.
    #[derive(Clone, Default)]
    struct RecordingSink {
        snapshots: Arc<Mutex<Vec<KpiSnapshot>>>,
        errors: Arc<Mutex<Vec<String>>>,
    }

    impl MonitorSink for RecordingSink {
        fn render(&mut self, snapshot: &KpiSnapshot, _rows: &[FeedRow]) {
            self.snapshots.lock().unwrap().push(*snapshot);
        }

        fn render_error(&mut self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    fn tx(id: &str) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            amount: 10.0,
            distance_km: 1.0,
            hour: 12,
            frequency: 1,
        }
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let store = memory_store().await;
        store.append(&tx("tx_a"), 1).await.unwrap();
        store.append(&tx("tx_b"), -1).await.unwrap();

        let monitor = LiveMonitor::new(
            store,
            200,
            Duration::from_secs(1),
            Duration::from_secs(2),
        );
        let sink = RecordingSink::default();
        let snapshots = sink.snapshots.clone();

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut sink = sink;
            monitor.run(&mut sink, stop_rx).await;
        });

        tokio::time::sleep(Duration::from_secs(5)).await;
        stop_tx.send(true).unwrap();
        handle.await.unwrap();

        let snapshots = snapshots.lock().unwrap();
        // Several full recomputations happened, all over the same window.
        assert!(snapshots.len() >= 2);
        assert!(snapshots.iter().all(|s| s.total == 2 && s.fraud_count == 1));
    }

    #[tokio::test]
    async fn test_read_failure_keeps_retrying() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = TransactionStore::new(pool.clone());
        // Closing the pool makes every read fail.
        pool.close().await;

        let monitor = LiveMonitor::new(
            store,
            200,
            Duration::from_secs(1),
            Duration::from_secs(2),
        );
        let sink = RecordingSink::default();
        let errors = sink.errors.clone();

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut sink = sink;
            monitor.run(&mut sink, stop_rx).await;
        });

        tokio::time::sleep(Duration::from_secs(10)).await;
        stop_tx.send(true).unwrap();
        handle.await.unwrap();

        // The loop survived the failures and retried more than once.
        assert!(errors.lock().unwrap().len() >= 2);
    }

    #[tokio::test]
    async fn test_non_shutdown_signal_does_not_cut_sleep_short() {
        let store = memory_store().await;
        store.append(&tx("tx_a"), 1).await.unwrap();

        // Long interval so no second cycle can fire within the test window.
        let monitor = LiveMonitor::new(
            store,
            200,
            Duration::from_secs(60),
            Duration::from_secs(120),
        );
        let sink = RecordingSink::default();
        let snapshots = sink.snapshots.clone();

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut sink = sink;
            monitor.run(&mut sink, stop_rx).await;
        });

        // Let the first cycle render and the loop settle into its sleep.
        while snapshots.lock().unwrap().is_empty() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(snapshots.lock().unwrap().len(), 1);

        // Spurious writes that are not a shutdown must not trigger an early
        // cycle.
        for _ in 0..3 {
            stop_tx.send(false).unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(snapshots.lock().unwrap().len(), 1);

        stop_tx.send(true).unwrap();
        handle.await.unwrap();
        assert_eq!(snapshots.lock().unwrap().len(), 1);
    }
}
