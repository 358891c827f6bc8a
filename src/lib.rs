//! Aegis Scoring Library
//!
//! A real-time transaction anomaly scoring service: each transaction is
//! turned into a fixed-order feature vector, labelled by a pretrained
//! unsupervised model, annotated with a human-readable reason when flagged,
//! and appended to a durable log. A separate live monitor re-reads the log
//! to compute rolling KPIs.

pub mod api;
pub mod config;
pub mod features;
pub mod model;
pub mod monitor;
pub mod reasons;
pub mod service;
pub mod store;
pub mod types;

pub use config::AppConfig;
pub use features::FeatureExtractor;
pub use model::{Label, OnnxScorer, Scorer};
pub use monitor::LiveMonitor;
pub use service::ScoringService;
pub use store::TransactionStore;
pub use types::transaction::{Transaction, TransactionRecord};
