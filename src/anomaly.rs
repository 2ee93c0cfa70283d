//! Anomaly detection over the weekly KPI summary.
//!
//! Each week is scored against the distribution of all weeks with
//! population z-scores on two metrics, then checked against fixed
//! thresholds. The on-time rule only fires on the low side; revenue fires
//! on both extremes, with a wider high-side threshold.

use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::stats::{zscore, Moments};
use crate::store;
use crate::types::anomaly::{AnomalyFlags, WeekScore, ANOMALY_COLUMNS};
use crate::types::kpi::{WeeklyKpi, KPI_COLUMNS};
use tracing::info;

pub const ON_TIME_Z_MIN: f64 = -1.5;
pub const REVENUE_Z_MAX: f64 = 2.0;
pub const REVENUE_Z_MIN: f64 = -2.0;

const KPI_HINT: &str = "run the KPI aggregation stage first";

/// Score every KPI row against the population of all weeks.
///
/// Weeks with an unset on-time rate are excluded from that metric's
/// distribution; their z stays unset and trips no rule, except under a
/// constant series where the zero-deviation policy pins every week to 0.
pub fn score_weeks(kpis: Vec<WeeklyKpi>) -> Vec<WeekScore> {
    let on_time_values: Vec<f64> = kpis.iter().filter_map(|k| k.on_time_rate).collect();
    let revenue_values: Vec<f64> = kpis.iter().map(|k| k.total_revenue).collect();

    let on_time_moments = Moments::population(&on_time_values);
    let revenue_moments = Moments::population(&revenue_values);

    kpis.into_iter()
        .map(|kpi| {
            let on_time_z = score_metric(kpi.on_time_rate, on_time_moments);
            let revenue_z = score_metric(Some(kpi.total_revenue), revenue_moments);
            // A rule never trips on an unset z-score.
            let flags = AnomalyFlags {
                on_time: on_time_z.is_some_and(|z| z < ON_TIME_Z_MIN),
                revenue_high: revenue_z.is_some_and(|z| z > REVENUE_Z_MAX),
                revenue_low: revenue_z.is_some_and(|z| z < REVENUE_Z_MIN),
            };
            WeekScore::from_kpi(kpi, on_time_z, revenue_z, flags)
        })
        .collect()
}

fn score_metric(value: Option<f64>, moments: Option<Moments>) -> Option<f64> {
    let moments = moments?;
    match value {
        Some(v) => Some(zscore(v, moments)),
        // A constant series pins every week to 0, unset metric included.
        None if moments.std_dev == 0.0 => Some(0.0),
        None => None,
    }
}

/// Read the KPI summary, score it, and publish the anomalies artifact
/// containing only the flagged weeks. Returns the flagged rows.
pub fn detect_anomalies(config: &AppConfig) -> Result<Vec<WeekScore>, PipelineError> {
    let kpi_path = config.kpi_summary();
    let kpis: Vec<WeeklyKpi> =
        store::read_rows(&kpi_path, "kpi_summary", &KPI_COLUMNS, KPI_HINT)?;

    if kpis.is_empty() {
        info!("KPI summary is empty; no anomalies to detect");
        store::write_delimited(&config.anomalies(), &ANOMALY_COLUMNS, &Vec::<WeekScore>::new())?;
        return Ok(Vec::new());
    }

    let scored = score_weeks(kpis);
    let flagged: Vec<WeekScore> = scored.into_iter().filter(WeekScore::is_anomalous).collect();

    store::write_delimited(&config.anomalies(), &ANOMALY_COLUMNS, &flagged)?;
    info!(
        anomalous_weeks = flagged.len(),
        path = %config.anomalies().display(),
        "anomaly report written"
    );
    Ok(flagged)
}
