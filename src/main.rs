//! Delivery Insights Pipeline - Main Entry Point
//!
//! Runs the full batch pipeline: generate raw data, load it, build the
//! fact table, compute weekly KPIs, and detect anomalous weeks.

use anyhow::Result;
use delivery_insights_pipeline::{config::AppConfig, pipeline};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };

    init_logging(&config);

    info!("Starting Delivery Insights Pipeline");
    info!(
        raw_dir = %config.data.raw_dir.display(),
        db_path = %config.data.db_path.display(),
        reports_dir = %config.data.reports_dir.display(),
        "Configuration loaded"
    );

    let summary = pipeline::run_all(&config)?;

    info!(
        orders = summary.orders_generated,
        shipments = summary.shipments_generated,
        kpi_weeks = summary.kpi_weeks,
        anomalous_weeks = summary.anomalous_weeks,
        "Pipeline completed successfully"
    );

    Ok(())
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "delivery_insights_pipeline={}",
            config.logging.level
        ))
    });

    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
