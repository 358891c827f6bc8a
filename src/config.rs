//! Configuration management for the scoring service and monitor

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub model: ModelConfig,
    pub monitor: MonitorConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Transaction store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,
    /// Connection pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Anomaly model configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path to the serialized ONNX model artifact
    pub path: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

/// Live monitor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Records read per cycle
    #[serde(default = "default_window")]
    pub window: i64,
    /// Seconds between cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Seconds to wait after a failed store read
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_connections() -> u32 {
    5
}

fn default_onnx_threads() -> usize {
    1
}

fn default_window() -> i64 {
    200
}

fn default_interval_secs() -> u64 {
    1
}

fn default_retry_interval_secs() -> u64 {
    2
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            database: DatabaseConfig {
                url: "sqlite://aegis.db?mode=rwc".to_string(),
                max_connections: default_max_connections(),
            },
            model: ModelConfig {
                path: "models/isolation_forest.onnx".to_string(),
                onnx_threads: default_onnx_threads(),
            },
            monitor: MonitorConfig {
                window: default_window(),
                interval_secs: default_interval_secs(),
                retry_interval_secs: default_retry_interval_secs(),
            },
        }
    }
}
