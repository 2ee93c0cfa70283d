//! Weekly KPI summary rows

use serde::{Deserialize, Serialize};

/// One summary row per distinct order week.
///
/// Field order matches the published KPI artifact column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyKpi {
    pub order_week: String,
    pub total_orders: i64,
    pub shipped_orders: i64,
    pub on_time_shipments: i64,
    pub late_shipments: i64,
    pub total_revenue: f64,
    /// Mean order-to-delivery days over shipped orders; unset for weeks
    /// with no shipments.
    pub avg_delivery_days: Option<f64>,
    /// Mean days past the required ship date over late shipments only;
    /// unset for weeks with no late shipments.
    pub avg_days_past_required: Option<f64>,
    /// on_time_shipments / shipped_orders; unset when nothing shipped.
    pub on_time_rate: Option<f64>,
}

/// Column order of the KPI artifact header row.
pub const KPI_COLUMNS: [&str; 9] = [
    "order_week",
    "total_orders",
    "shipped_orders",
    "on_time_shipments",
    "late_shipments",
    "total_revenue",
    "avg_delivery_days",
    "avg_days_past_required",
    "on_time_rate",
];
