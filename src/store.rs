//! Persistence helpers: SQLite connection and schema management, raw CSV
//! loading, and delimited artifact publication.
//!
//! Artifacts are always written to a temporary sibling file and renamed
//! into place, so a failed write never clobbers the prior snapshot.

use crate::error::PipelineError;
use crate::types::order::{Order, ORDER_COLUMNS};
use crate::types::shipment::{Shipment, SHIPMENT_COLUMNS};
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ORDERS_TABLE: &str = "orders";
pub const SHIPMENTS_TABLE: &str = "shipments";

const GENERATE_HINT: &str = "run the data generation stage first";

/// Raw table DDL. Dropped and recreated on every run; derived tables are
/// owned by their producing stages.
const SCHEMA_SQL: &str = "
    DROP TABLE IF EXISTS shipments;
    DROP TABLE IF EXISTS orders;
    CREATE TABLE orders (
      order_id INTEGER PRIMARY KEY,
      customer_id INTEGER NOT NULL,
      order_date TEXT NOT NULL,
      required_ship_date TEXT NOT NULL,
      order_status TEXT NOT NULL,
      order_amount REAL NOT NULL,
      priority TEXT NOT NULL,
      region TEXT NOT NULL
    );
    CREATE TABLE shipments (
      shipment_id INTEGER PRIMARY KEY,
      order_id INTEGER NOT NULL REFERENCES orders(order_id),
      ship_date TEXT NOT NULL,
      delivery_date TEXT NOT NULL,
      shipment_status TEXT NOT NULL,
      carrier TEXT NOT NULL,
      warehouse_id INTEGER NOT NULL
    );
";

/// Open (creating if needed) the SQLite database with foreign keys enabled.
pub fn open(db_path: &Path) -> Result<Connection, PipelineError> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

/// Drop and recreate the raw tables.
pub fn init_schema(conn: &Connection) -> Result<(), PipelineError> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Load `orders.csv` into the orders table. Returns the number of rows
/// appended; zero rows is reported, not an error.
pub fn load_orders_csv(conn: &mut Connection, path: &Path) -> Result<usize, PipelineError> {
    let orders: Vec<Order> = read_rows(path, ORDERS_TABLE, &ORDER_COLUMNS, GENERATE_HINT)?;
    if orders.is_empty() {
        warn!(path = %path.display(), "orders CSV contains no rows; nothing to load");
        return Ok(0);
    }

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO orders (
               order_id, customer_id, order_date, required_ship_date,
               order_status, order_amount, priority, region
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for order in &orders {
            stmt.execute(params![
                order.order_id,
                order.customer_id,
                order.order_date,
                order.required_ship_date,
                order.order_status,
                order.order_amount,
                order.priority,
                order.region,
            ])?;
        }
    }
    tx.commit()?;

    info!(rows = orders.len(), table = ORDERS_TABLE, "raw table loaded");
    Ok(orders.len())
}

/// Load `shipments.csv` into the shipments table. Returns the number of
/// rows appended; zero rows is reported, not an error.
pub fn load_shipments_csv(conn: &mut Connection, path: &Path) -> Result<usize, PipelineError> {
    let shipments: Vec<Shipment> =
        read_rows(path, SHIPMENTS_TABLE, &SHIPMENT_COLUMNS, GENERATE_HINT)?;
    if shipments.is_empty() {
        warn!(path = %path.display(), "shipments CSV contains no rows; nothing to load");
        return Ok(0);
    }

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO shipments (
               shipment_id, order_id, ship_date, delivery_date,
               shipment_status, carrier, warehouse_id
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for shipment in &shipments {
            stmt.execute(params![
                shipment.shipment_id,
                shipment.order_id,
                shipment.ship_date,
                shipment.delivery_date,
                shipment.shipment_status,
                shipment.carrier,
                shipment.warehouse_id,
            ])?;
        }
    }
    tx.commit()?;

    info!(rows = shipments.len(), table = SHIPMENTS_TABLE, "raw table loaded");
    Ok(shipments.len())
}

/// Read a delimited artifact into records, validating the header by name.
pub(crate) fn read_rows<T: DeserializeOwned>(
    path: &Path,
    table: &str,
    required: &[&str],
    hint: &'static str,
) -> Result<Vec<T>, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::missing_artifact(path, hint));
    }
    let mut rdr = csv::Reader::from_path(path)?;
    validate_headers(rdr.headers()?, table, required)?;
    let rows = rdr.deserialize().collect::<Result<Vec<T>, _>>()?;
    Ok(rows)
}

/// Columns are matched by name, not position.
fn validate_headers(
    headers: &csv::StringRecord,
    table: &str,
    required: &[&str],
) -> Result<(), PipelineError> {
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(PipelineError::schema_mismatch(table, *column));
        }
    }
    Ok(())
}

/// Publish a delimited artifact: header row plus one row per record,
/// written to a temp file and atomically renamed over the prior snapshot.
pub(crate) fn write_delimited<T: Serialize>(
    path: &Path,
    columns: &[&str],
    rows: &[T],
) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = staging_path(path);

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&tmp)?;
    wtr.write_record(columns)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    drop(wtr);

    fs::rename(&tmp, path)?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Whether `table` exists in the database.
pub(crate) fn table_exists(conn: &Connection, table: &str) -> Result<bool, PipelineError> {
    let mut stmt =
        conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    let found = stmt.exists(params![table])?;
    Ok(found)
}

/// Column names of `table`, in declaration order.
pub(crate) fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, PipelineError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}
