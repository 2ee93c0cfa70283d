//! Fact transform: one row per order, left-joined to its shipment, with
//! week and lateness facts derived per row.
//!
//! The new fact rows are built in a staging table and swapped in within a
//! single transaction, so a failed rebuild leaves the prior fact table
//! untouched.

use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::store;
use crate::types::fact::{OrderShipmentFact, FACT_COLUMNS};
use crate::types::order::ORDER_COLUMNS;
use crate::types::shipment::{ShipmentStatus, SHIPMENT_COLUMNS};
use chrono::{Datelike, NaiveDate};
use rusqlite::{params, Connection};
use tracing::info;

pub const FACT_TABLE: &str = "order_shipments";
const STAGING_TABLE: &str = "order_shipments_new";

const LOAD_HINT: &str = "run the raw data load stage first";

const FACT_DDL: &str = "
    CREATE TABLE order_shipments_new (
      order_id INTEGER PRIMARY KEY,
      order_date TEXT NOT NULL,
      required_ship_date TEXT NOT NULL,
      ship_date TEXT,
      delivery_date TEXT,
      order_week TEXT NOT NULL,
      order_amount REAL NOT NULL,
      shipment_status TEXT,
      order_to_delivery_days INTEGER,
      is_late_flag INTEGER,
      days_past_required INTEGER
    );
";

/// ISO-8601 week label of a date: Monday-start weeks, labeled with the ISO
/// week-year (`YYYY-Www`). Total over all valid dates; zero-padding keeps
/// lexicographic order chronological.
pub fn iso_week_label(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{:04}-W{:02}", week.year(), week.week())
}

/// One order row as read back from the left join, before derivation.
struct JoinedOrder {
    order_id: i64,
    order_date: NaiveDate,
    required_ship_date: NaiveDate,
    order_amount: f64,
    ship_date: Option<NaiveDate>,
    delivery_date: Option<NaiveDate>,
    shipment_status: Option<ShipmentStatus>,
}

fn derive_fact(row: JoinedOrder) -> OrderShipmentFact {
    let order_week = iso_week_label(row.order_date);
    let order_to_delivery_days = row
        .delivery_date
        .map(|delivered| (delivered - row.order_date).num_days());
    let is_late_flag = row
        .delivery_date
        .map(|delivered| i64::from(delivered > row.required_ship_date));
    let days_past_required = row
        .delivery_date
        .map(|delivered| (delivered - row.required_ship_date).num_days().max(0));

    OrderShipmentFact {
        order_id: row.order_id,
        order_date: row.order_date,
        required_ship_date: row.required_ship_date,
        ship_date: row.ship_date,
        delivery_date: row.delivery_date,
        order_week,
        order_amount: row.order_amount,
        shipment_status: row.shipment_status,
        order_to_delivery_days,
        is_late_flag,
        days_past_required,
    }
}

/// Rebuild the fact table from the raw tables and publish a delimited
/// snapshot of it. Returns the number of fact rows.
pub fn build_fact_table(
    conn: &mut Connection,
    config: &AppConfig,
) -> Result<usize, PipelineError> {
    ensure_input_table(conn, store::ORDERS_TABLE, &ORDER_COLUMNS)?;
    ensure_input_table(conn, store::SHIPMENTS_TABLE, &SHIPMENT_COLUMNS)?;

    let facts = read_and_derive(conn)?;
    if facts.is_empty() {
        info!("orders table contains no rows; fact table will be empty");
    }

    publish_fact_table(conn, &facts)?;
    store::write_delimited(&config.fact_snapshot(), &FACT_COLUMNS, &facts)?;

    info!(rows = facts.len(), table = FACT_TABLE, "fact table rebuilt");
    Ok(facts.len())
}

/// The raw input tables must exist and carry every schema column by name.
fn ensure_input_table(
    conn: &Connection,
    table: &'static str,
    required: &[&str],
) -> Result<(), PipelineError> {
    if !store::table_exists(conn, table)? {
        return Err(PipelineError::MissingTable {
            table,
            hint: LOAD_HINT,
        });
    }
    let columns = store::table_columns(conn, table)?;
    for column in required {
        if !columns.iter().any(|c| c == column) {
            return Err(PipelineError::schema_mismatch(table, *column));
        }
    }
    Ok(())
}

fn read_and_derive(conn: &Connection) -> Result<Vec<OrderShipmentFact>, PipelineError> {
    let mut stmt = conn.prepare(
        "SELECT o.order_id, o.order_date, o.required_ship_date, o.order_amount,
                s.ship_date, s.delivery_date, s.shipment_status
         FROM orders o
         LEFT JOIN shipments s ON s.order_id = o.order_id",
    )?;
    let facts = stmt
        .query_map([], |row| {
            Ok(JoinedOrder {
                order_id: row.get(0)?,
                order_date: row.get(1)?,
                required_ship_date: row.get(2)?,
                order_amount: row.get(3)?,
                ship_date: row.get(4)?,
                delivery_date: row.get(5)?,
                shipment_status: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(derive_fact)
        .collect();
    Ok(facts)
}

/// Build the staging table, fill it, and swap it in atomically.
fn publish_fact_table(
    conn: &mut Connection,
    facts: &[OrderShipmentFact],
) -> Result<(), PipelineError> {
    let tx = conn.transaction()?;
    tx.execute_batch(&format!("DROP TABLE IF EXISTS {STAGING_TABLE};"))?;
    tx.execute_batch(FACT_DDL)?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO order_shipments_new (
               order_id, order_date, required_ship_date, ship_date, delivery_date,
               order_week, order_amount, shipment_status,
               order_to_delivery_days, is_late_flag, days_past_required
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )?;
        for fact in facts {
            stmt.execute(params![
                fact.order_id,
                fact.order_date,
                fact.required_ship_date,
                fact.ship_date,
                fact.delivery_date,
                fact.order_week,
                fact.order_amount,
                fact.shipment_status,
                fact.order_to_delivery_days,
                fact.is_late_flag,
                fact.days_past_required,
            ])?;
        }
    }
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {FACT_TABLE};
         ALTER TABLE {STAGING_TABLE} RENAME TO {FACT_TABLE};"
    ))?;
    tx.commit()?;
    Ok(())
}
