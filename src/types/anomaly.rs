//! Scored weekly records and anomaly flags

use crate::types::kpi::WeeklyKpi;
use serde::{Deserialize, Serialize};

/// A weekly KPI row scored against the distribution of all weeks.
///
/// Field order matches the published anomalies artifact: the KPI columns
/// followed by the z-scores and the three rule flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekScore {
    pub order_week: String,
    pub total_orders: i64,
    pub shipped_orders: i64,
    pub on_time_shipments: i64,
    pub late_shipments: i64,
    pub total_revenue: f64,
    pub avg_delivery_days: Option<f64>,
    pub avg_days_past_required: Option<f64>,
    pub on_time_rate: Option<f64>,
    /// Population z-score of the on-time rate; unset when the rate itself
    /// is unset and the series is not constant.
    pub on_time_z: Option<f64>,
    pub revenue_z: Option<f64>,
    pub is_on_time_anomaly: bool,
    pub is_revenue_high_anomaly: bool,
    pub is_revenue_low_anomaly: bool,
}

/// Column order of the anomalies artifact header row.
pub const ANOMALY_COLUMNS: [&str; 14] = [
    "order_week",
    "total_orders",
    "shipped_orders",
    "on_time_shipments",
    "late_shipments",
    "total_revenue",
    "avg_delivery_days",
    "avg_days_past_required",
    "on_time_rate",
    "on_time_z",
    "revenue_z",
    "is_on_time_anomaly",
    "is_revenue_high_anomaly",
    "is_revenue_low_anomaly",
];

impl WeekScore {
    /// Carry a KPI row over with its z-scores and pre-evaluated flags.
    pub fn from_kpi(
        kpi: WeeklyKpi,
        on_time_z: Option<f64>,
        revenue_z: Option<f64>,
        flags: AnomalyFlags,
    ) -> Self {
        Self {
            order_week: kpi.order_week,
            total_orders: kpi.total_orders,
            shipped_orders: kpi.shipped_orders,
            on_time_shipments: kpi.on_time_shipments,
            late_shipments: kpi.late_shipments,
            total_revenue: kpi.total_revenue,
            avg_delivery_days: kpi.avg_delivery_days,
            avg_days_past_required: kpi.avg_days_past_required,
            on_time_rate: kpi.on_time_rate,
            on_time_z,
            revenue_z,
            is_on_time_anomaly: flags.on_time,
            is_revenue_high_anomaly: flags.revenue_high,
            is_revenue_low_anomaly: flags.revenue_low,
        }
    }

    /// Whether any of the three rules tripped.
    pub fn is_anomalous(&self) -> bool {
        self.is_on_time_anomaly || self.is_revenue_high_anomaly || self.is_revenue_low_anomaly
    }
}

/// Outcome of the three anomaly rules for one week.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnomalyFlags {
    pub on_time: bool,
    pub revenue_high: bool,
    pub revenue_low: bool,
}
