//! Raw order records

use chrono::NaiveDate;
use rusqlite::types::{ToSql, ToSqlOutput};
use serde::{Deserialize, Serialize};

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Shipped,
    Pending,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Pending => "PENDING",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl ToSql for OrderStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

/// Order priority band. HIGH orders carry a price premium in the
/// synthetic data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        }
    }
}

impl ToSql for Priority {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

/// Column order of the orders CSV header row; also the set of columns the
/// loader requires to be present by name.
pub const ORDER_COLUMNS: [&str; 8] = [
    "order_id",
    "customer_id",
    "order_date",
    "required_ship_date",
    "order_status",
    "order_amount",
    "priority",
    "region",
];

/// A raw order as loaded from `orders.csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i64,
    pub customer_id: i64,
    pub order_date: NaiveDate,
    pub required_ship_date: NaiveDate,
    pub order_status: OrderStatus,
    pub order_amount: f64,
    pub priority: Priority,
    pub region: String,
}
