//! Configuration management for the insights pipeline
//!
//! All file-system locations live here. The config object is built once at
//! the orchestration boundary and passed into each stage; stages never read
//! ambient path state.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "config/pipeline.toml";

const ORDERS_CSV: &str = "orders.csv";
const SHIPMENTS_CSV: &str = "shipments.csv";
const FACT_SNAPSHOT_CSV: &str = "order_shipments.csv";
const KPI_SUMMARY_CSV: &str = "kpi_summary.csv";
const ANOMALIES_CSV: &str = "anomalies.csv";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub generator: GeneratorConfig,
    pub logging: LoggingConfig,
}

/// File-system layout for raw inputs, the database, and published artifacts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the raw orders/shipments CSVs
    pub raw_dir: PathBuf,
    /// Directory holding derived table snapshots
    pub processed_dir: PathBuf,
    /// SQLite database path
    pub db_path: PathBuf,
    /// Directory holding the published KPI and anomaly artifacts
    pub reports_dir: PathBuf,
}

/// Synthetic raw data generation parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of orders to generate
    pub orders: usize,
    /// RNG seed; a fixed seed reproduces the raw dataset byte for byte
    pub seed: u64,
    /// First possible order date (inclusive)
    pub start_date: NaiveDate,
    /// Last possible order date (inclusive)
    pub end_date: NaiveDate,
    /// Fraction of shipped orders that receive a shipment record
    pub shipment_coverage: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from the default path, falling back to built-in
    /// defaults when no config file is present.
    pub fn load() -> Result<Self> {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        if path.exists() {
            Self::load_from_path(path)
        } else {
            Ok(Self::default())
        }
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

    pub fn orders_csv(&self) -> PathBuf {
        self.data.raw_dir.join(ORDERS_CSV)
    }

    pub fn shipments_csv(&self) -> PathBuf {
        self.data.raw_dir.join(SHIPMENTS_CSV)
    }

    pub fn fact_snapshot(&self) -> PathBuf {
        self.data.processed_dir.join(FACT_SNAPSHOT_CSV)
    }

    pub fn kpi_summary(&self) -> PathBuf {
        self.data.reports_dir.join(KPI_SUMMARY_CSV)
    }

    pub fn anomalies(&self) -> PathBuf {
        self.data.reports_dir.join(ANOMALIES_CSV)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            generator: GeneratorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            processed_dir: PathBuf::from("data/processed"),
            db_path: PathBuf::from("data/insights.db"),
            reports_dir: PathBuf::from("reports"),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            orders: 50_000,
            seed: 42,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date"),
            shipment_coverage: 0.95,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
