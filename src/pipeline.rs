//! Pipeline orchestration: a fixed five-stage sequence, each stage
//! consuming the persisted output of the previous one. The first failure
//! aborts the run; downstream stages are never attempted.

use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::{anomaly, generator, kpi, store, transform};
use tracing::info;

/// Row counts observed across one full pipeline run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub orders_generated: usize,
    pub shipments_generated: usize,
    pub orders_loaded: usize,
    pub shipments_loaded: usize,
    pub fact_rows: usize,
    pub kpi_weeks: usize,
    pub anomalous_weeks: usize,
}

/// Run the full pipeline end-to-end.
pub fn run_all(config: &AppConfig) -> Result<RunSummary, PipelineError> {
    let mut summary = RunSummary::default();

    info!("stage 1/5: generating synthetic raw data");
    let raw = generator::generate(config)?;
    summary.orders_generated = raw.orders;
    summary.shipments_generated = raw.shipments;

    info!("stage 2/5: loading raw tables");
    let mut conn = store::open(&config.data.db_path)?;
    store::init_schema(&conn)?;
    summary.orders_loaded = store::load_orders_csv(&mut conn, &config.orders_csv())?;
    summary.shipments_loaded = store::load_shipments_csv(&mut conn, &config.shipments_csv())?;

    info!("stage 3/5: building the order-shipment fact table");
    summary.fact_rows = transform::build_fact_table(&mut conn, config)?;

    info!("stage 4/5: computing weekly KPIs");
    summary.kpi_weeks = kpi::run(&conn, config)?;

    info!("stage 5/5: detecting anomalous weeks");
    summary.anomalous_weeks = anomaly::detect_anomalies(config)?.len();

    info!(
        orders = summary.orders_loaded,
        fact_rows = summary.fact_rows,
        kpi_weeks = summary.kpi_weeks,
        anomalous_weeks = summary.anomalous_weeks,
        "pipeline completed"
    );
    Ok(summary)
}
