//! Traffic Simulator
//!
//! Generates synthetic transactions and submits them to the scoring API,
//! mixing in a small share of suspicious patterns.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
struct Transaction {
    transaction_id: String,
    amount: f64,
    distance_km: f64,
    hour: i64,
    frequency: i64,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    is_fraud: bool,
    message: String,
}

/// Transaction generator producing mostly-normal traffic
struct TransactionGenerator {
    rng: rand::rngs::ThreadRng,
}

impl TransactionGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    fn generate(&mut self, fraud_rate: f64) -> Transaction {
        // Default normal behavior
        let mut amount: f64 = self.rng.gen_range(10.0..500.0);
        let mut distance_km: f64 = self.rng.gen_range(1.0..20.0);
        let mut hour = self.rng.gen_range(9..23);
        let mut frequency = self.rng.gen_range(1..4);

        if self.rng.gen_bool(fraud_rate) {
            match self.rng.gen_range(0..4) {
                0 => amount = self.rng.gen_range(5000.0..15000.0),
                1 => distance_km = self.rng.gen_range(500.0..2000.0),
                2 => hour = self.rng.gen_range(1..5),
                _ => frequency = self.rng.gen_range(15..50),
            }
        }

        Transaction {
            transaction_id: uuid::Uuid::new_v4().to_string(),
            amount: (amount * 100.0).round() / 100.0,
            distance_km: (distance_km * 100.0).round() / 100.0,
            hour,
            frequency,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("simulator=info".parse()?),
        )
        .init();

    info!("Starting Traffic Simulator");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let api_url = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("http://localhost:8000/predict");
    let fraud_rate: f64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(0.035);
    let delay_ms: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(1000);

    info!(
        api_url = %api_url,
        fraud_rate = fraud_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    let client = reqwest::Client::new();
    let mut generator = TransactionGenerator::new();

    loop {
        let tx = generator.generate(fraud_rate);

        match client.post(api_url).json(&tx).send().await {
            Ok(response) => match response.json::<PredictResponse>().await {
                Ok(result) => {
                    let icon = if result.is_fraud { "BLOCKED " } else { "approved" };
                    info!(
                        "{} {} | amount=${:.2} hour={}h freq={}",
                        icon, result.message, tx.amount, tx.hour, tx.frequency
                    );
                }
                Err(e) => warn!(error = %e, "Failed to parse response"),
            },
            Err(e) => warn!(error = %e, "Connection failed; ensure the API is running"),
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
