//! Per-order fact rows joining shipment outcome and timing to each order

use crate::types::shipment::ShipmentStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row per order, left-joined to its shipment when one exists.
///
/// All shipment-derived fields are `None` for unshipped orders; the join
/// never drops or duplicates an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderShipmentFact {
    pub order_id: i64,
    pub order_date: NaiveDate,
    pub required_ship_date: NaiveDate,
    pub ship_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    /// ISO-8601 Monday-start week label (`YYYY-Www`) of the order date.
    pub order_week: String,
    pub order_amount: f64,
    pub shipment_status: Option<ShipmentStatus>,
    /// Days from order placement to delivery.
    pub order_to_delivery_days: Option<i64>,
    /// 1 when delivery landed after the required ship date, 0 otherwise.
    pub is_late_flag: Option<i64>,
    /// Days delivered past the required ship date, floored at 0.
    pub days_past_required: Option<i64>,
}

/// Column order of the fact snapshot header row.
pub const FACT_COLUMNS: [&str; 11] = [
    "order_id",
    "order_date",
    "required_ship_date",
    "ship_date",
    "delivery_date",
    "order_week",
    "order_amount",
    "shipment_status",
    "order_to_delivery_days",
    "is_late_flag",
    "days_past_required",
];

impl OrderShipmentFact {
    pub fn is_shipped(&self) -> bool {
        self.shipment_status.is_some()
    }
}
