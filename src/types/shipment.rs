//! Raw shipment records

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Outcome of a shipment relative to the order's required ship date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    OnTime,
    Late,
}

#[derive(Debug, Error)]
#[error("unknown shipment status `{0}`")]
pub struct ParseShipmentStatusError(String);

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::OnTime => "ON_TIME",
            ShipmentStatus::Late => "LATE",
        }
    }
}

impl FromStr for ShipmentStatus {
    type Err = ParseShipmentStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ON_TIME" => Ok(ShipmentStatus::OnTime),
            "LATE" => Ok(ShipmentStatus::Late),
            other => Err(ParseShipmentStatusError(other.to_string())),
        }
    }
}

impl ToSql for ShipmentStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ShipmentStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: ParseShipmentStatusError| FromSqlError::Other(Box::new(e)))
    }
}

/// Column order of the shipments CSV header row; also the set of columns
/// the loader requires to be present by name.
pub const SHIPMENT_COLUMNS: [&str; 7] = [
    "shipment_id",
    "order_id",
    "ship_date",
    "delivery_date",
    "shipment_status",
    "carrier",
    "warehouse_id",
];

/// A raw shipment as loaded from `shipments.csv`. At most one shipment
/// exists per order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub shipment_id: i64,
    pub order_id: i64,
    pub ship_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub shipment_status: ShipmentStatus,
    pub carrier: String,
    pub warehouse_id: i64,
}
