//! Weekly KPI aggregation over the fact table.

use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::stats::rate;
use crate::store;
use crate::transform::FACT_TABLE;
use crate::types::kpi::{WeeklyKpi, KPI_COLUMNS};
use rusqlite::Connection;
use tracing::info;

const TRANSFORM_HINT: &str = "run the fact transform stage first";

/// One summary row per distinct order week, ascending by week.
///
/// The null-handling rules ride on SQLite aggregate semantics: AVG skips
/// NULLs and returns NULL over an empty set, so the per-week averages are
/// unset exactly when no row qualifies. The on-time rate is computed by
/// the null-safe `rate` helper, never by raw division.
const WEEKLY_KPI_SQL: &str = "
    SELECT
        order_week,
        COUNT(*) AS total_orders,
        SUM(CASE WHEN shipment_status IS NOT NULL THEN 1 ELSE 0 END) AS shipped_orders,
        SUM(CASE WHEN shipment_status IS NOT NULL AND is_late_flag = 0 THEN 1 ELSE 0 END)
            AS on_time_shipments,
        SUM(CASE WHEN is_late_flag = 1 THEN 1 ELSE 0 END) AS late_shipments,
        SUM(order_amount) AS total_revenue,
        AVG(order_to_delivery_days) AS avg_delivery_days,
        AVG(CASE WHEN is_late_flag = 1 THEN days_past_required ELSE NULL END)
            AS avg_days_past_required
    FROM order_shipments
    GROUP BY order_week
    ORDER BY order_week
";

/// Compute the weekly KPI rows from the fact table.
pub fn compute_weekly_kpis(conn: &Connection) -> Result<Vec<WeeklyKpi>, PipelineError> {
    if !store::table_exists(conn, FACT_TABLE)? {
        return Err(PipelineError::MissingTable {
            table: FACT_TABLE,
            hint: TRANSFORM_HINT,
        });
    }

    let mut stmt = conn.prepare(WEEKLY_KPI_SQL)?;
    let kpis = stmt
        .query_map([], |row| {
            let shipped_orders: i64 = row.get(2)?;
            let on_time_shipments: i64 = row.get(3)?;
            Ok(WeeklyKpi {
                order_week: row.get(0)?,
                total_orders: row.get(1)?,
                shipped_orders,
                on_time_shipments,
                late_shipments: row.get(4)?,
                total_revenue: row.get(5)?,
                avg_delivery_days: row.get(6)?,
                avg_days_past_required: row.get(7)?,
                on_time_rate: rate(on_time_shipments, shipped_orders),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    if kpis.is_empty() {
        info!("fact table contains no rows; KPI summary will be empty");
    }
    Ok(kpis)
}

/// Compute the weekly KPIs and publish the summary artifact, replacing
/// any prior snapshot. Returns the number of weeks summarized.
pub fn run(conn: &Connection, config: &AppConfig) -> Result<usize, PipelineError> {
    let kpis = compute_weekly_kpis(conn)?;
    store::write_delimited(&config.kpi_summary(), &KPI_COLUMNS, &kpis)?;
    info!(
        weeks = kpis.len(),
        path = %config.kpi_summary().display(),
        "weekly KPI summary written"
    );
    Ok(kpis.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{init_schema, open};
    use crate::transform::build_fact_table;
    use chrono::NaiveDate;
    use rusqlite::params;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_config(dir: &TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.data.raw_dir = dir.path().join("raw");
        config.data.processed_dir = dir.path().join("processed");
        config.data.db_path = dir.path().join("insights.db");
        config.data.reports_dir = dir.path().join("reports");
        config
    }

    fn insert_order(conn: &Connection, id: i64, order_date: NaiveDate, amount: f64) {
        let required = order_date + chrono::Duration::days(4);
        conn.execute(
            "INSERT INTO orders VALUES (?1, 1500, ?2, ?3, 'SHIPPED', ?4, 'LOW', 'East')",
            params![id, order_date, required, amount],
        )
        .unwrap();
    }

    fn insert_shipment(conn: &Connection, id: i64, order_id: i64, delivery: NaiveDate, late: bool) {
        let ship = delivery - chrono::Duration::days(2);
        let status = if late { "LATE" } else { "ON_TIME" };
        conn.execute(
            "INSERT INTO shipments VALUES (?1, ?2, ?3, ?4, ?5, 'CarrierA', 1)",
            params![id, order_id, ship, delivery, status],
        )
        .unwrap();
    }

    /// 10 orders in one week, 8 shipped and all on time.
    #[test]
    fn test_single_week_fully_on_time() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let mut conn = open(&config.data.db_path).unwrap();
        init_schema(&conn).unwrap();

        let monday = date(2024, 3, 4);
        for id in 1..=10 {
            insert_order(&conn, id, monday, 10.0);
        }
        for id in 1..=8 {
            // Delivered inside the required window.
            insert_shipment(&conn, id, id, monday + chrono::Duration::days(2), false);
        }

        build_fact_table(&mut conn, &config).unwrap();
        let kpis = compute_weekly_kpis(&conn).unwrap();

        assert_eq!(kpis.len(), 1);
        let week = &kpis[0];
        assert_eq!(week.order_week, "2024-W10");
        assert_eq!(week.total_orders, 10);
        assert_eq!(week.shipped_orders, 8);
        assert_eq!(week.on_time_shipments, 8);
        assert_eq!(week.late_shipments, 0);
        assert_eq!(week.on_time_rate, Some(1.0));
        assert!((week.total_revenue - 100.0).abs() < 1e-9);
        assert_eq!(week.avg_delivery_days, Some(2.0));
        // No late shipments, so the lateness average is unset.
        assert_eq!(week.avg_days_past_required, None);
    }

    /// A week with orders but no shipments still appears, with the rate
    /// and delivery average unset.
    #[test]
    fn test_week_without_shipments_is_retained() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let mut conn = open(&config.data.db_path).unwrap();
        init_schema(&conn).unwrap();

        for id in 1..=5 {
            insert_order(&conn, id, date(2024, 3, 4), 20.0);
        }

        build_fact_table(&mut conn, &config).unwrap();
        let kpis = compute_weekly_kpis(&conn).unwrap();

        assert_eq!(kpis.len(), 1);
        let week = &kpis[0];
        assert_eq!(week.total_orders, 5);
        assert_eq!(week.shipped_orders, 0);
        assert_eq!(week.on_time_rate, None);
        assert_eq!(week.avg_delivery_days, None);
        // Revenue counts every order, shipped or not.
        assert!((week.total_revenue - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_weeks_are_ascending_and_unique() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let mut conn = open(&config.data.db_path).unwrap();
        init_schema(&conn).unwrap();

        // Insert out of calendar order across three weeks.
        insert_order(&conn, 1, date(2024, 3, 18), 10.0);
        insert_order(&conn, 2, date(2024, 3, 4), 10.0);
        insert_order(&conn, 3, date(2024, 3, 11), 10.0);
        insert_order(&conn, 4, date(2024, 3, 5), 10.0);

        build_fact_table(&mut conn, &config).unwrap();
        let kpis = compute_weekly_kpis(&conn).unwrap();

        let weeks: Vec<&str> = kpis.iter().map(|k| k.order_week.as_str()).collect();
        assert_eq!(weeks, vec!["2024-W10", "2024-W11", "2024-W12"]);
        assert_eq!(kpis[0].total_orders, 2);
    }

    #[test]
    fn test_on_time_plus_late_never_exceeds_shipped() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let mut conn = open(&config.data.db_path).unwrap();
        init_schema(&conn).unwrap();

        let monday = date(2024, 3, 4);
        for id in 1..=6 {
            insert_order(&conn, id, monday, 15.0);
        }
        insert_shipment(&conn, 1, 1, monday + chrono::Duration::days(2), false);
        insert_shipment(&conn, 2, 2, monday + chrono::Duration::days(9), true);
        insert_shipment(&conn, 3, 3, monday + chrono::Duration::days(10), true);

        build_fact_table(&mut conn, &config).unwrap();
        let kpis = compute_weekly_kpis(&conn).unwrap();

        let week = &kpis[0];
        assert_eq!(week.shipped_orders, 3);
        assert_eq!(week.on_time_shipments, 1);
        assert_eq!(week.late_shipments, 2);
        assert!(week.on_time_shipments + week.late_shipments <= week.shipped_orders);
        let rate = week.on_time_rate.unwrap();
        assert!((0.0..=1.0).contains(&rate));
        // Late deliveries landed 5 and 6 days past the required date.
        assert_eq!(week.avg_days_past_required, Some(5.5));
    }

    #[test]
    fn test_missing_fact_table_is_fatal() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let conn = open(&config.data.db_path).unwrap();

        let err = compute_weekly_kpis(&conn).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingTable {
                table: FACT_TABLE,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_fact_table_writes_header_only_artifact() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let mut conn = open(&config.data.db_path).unwrap();
        init_schema(&conn).unwrap();
        build_fact_table(&mut conn, &config).unwrap();

        let weeks = run(&conn, &config).unwrap();
        assert_eq!(weeks, 0);

        let content = std::fs::read_to_string(config.kpi_summary()).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with("order_week,total_orders"));
    }
}
