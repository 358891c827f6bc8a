//! Type definitions for the scoring service

pub mod transaction;

pub use transaction::{Transaction, TransactionRecord};
