//! Synthetic raw data generation
//!
//! Produces the orders and shipments CSVs the rest of the pipeline
//! consumes. Generation is deterministic for a fixed seed.

use crate::config::{AppConfig, GeneratorConfig};
use crate::error::PipelineError;
use crate::store;
use crate::types::order::{Order, OrderStatus, Priority, ORDER_COLUMNS};
use crate::types::shipment::{Shipment, ShipmentStatus, SHIPMENT_COLUMNS};
use chrono::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Row counts of the generated raw dataset.
#[derive(Debug, Clone, Copy)]
pub struct RawCounts {
    pub orders: usize,
    pub shipments: usize,
}

/// Generate the raw orders and shipments CSVs under the configured raw
/// data directory, replacing any prior files.
pub fn generate(config: &AppConfig) -> Result<RawCounts, PipelineError> {
    let mut rng = StdRng::seed_from_u64(config.generator.seed);

    let orders = generate_orders(&config.generator, &mut rng);
    let shipments = generate_shipments(&config.generator, &orders, &mut rng);

    store::write_delimited(&config.orders_csv(), &ORDER_COLUMNS, &orders)?;
    store::write_delimited(&config.shipments_csv(), &SHIPMENT_COLUMNS, &shipments)?;

    info!(
        orders = orders.len(),
        shipments = shipments.len(),
        raw_dir = %config.data.raw_dir.display(),
        "synthetic raw data written"
    );

    Ok(RawCounts {
        orders: orders.len(),
        shipments: shipments.len(),
    })
}

fn generate_orders(cfg: &GeneratorConfig, rng: &mut StdRng) -> Vec<Order> {
    let span_days = (cfg.end_date - cfg.start_date).num_days().max(0);

    (1..=cfg.orders as i64)
        .map(|order_id| {
            let order_date = cfg.start_date + Duration::days(rng.gen_range(0..=span_days));
            let required_ship_date = order_date + Duration::days(rng.gen_range(1..=5));

            let priority = *weighted_choice(
                rng,
                &[
                    (Priority::Low, 0.4),
                    (Priority::Medium, 0.4),
                    (Priority::High, 0.2),
                ],
            );
            let base_amount = rng.gen_range(10.0..90.0);
            let multiplier = if priority == Priority::High { 1.3 } else { 1.0 };

            Order {
                order_id,
                customer_id: rng.gen_range(1000..2000),
                order_date,
                required_ship_date,
                order_status: *weighted_choice(
                    rng,
                    &[
                        (OrderStatus::Shipped, 0.8),
                        (OrderStatus::Pending, 0.15),
                        (OrderStatus::Cancelled, 0.05),
                    ],
                ),
                order_amount: round_cents(base_amount * multiplier),
                priority,
                region: weighted_choice(
                    rng,
                    &[("East", 0.3), ("West", 0.3), ("North", 0.2), ("South", 0.2)],
                )
                .to_string(),
            }
        })
        .collect()
}

/// Most shipped orders get exactly one shipment record; orders that were
/// never shipped (or fell outside coverage) get none.
fn generate_shipments(cfg: &GeneratorConfig, orders: &[Order], rng: &mut StdRng) -> Vec<Shipment> {
    let mut shipments = Vec::new();

    for order in orders {
        if order.order_status != OrderStatus::Shipped {
            continue;
        }
        if !rng.gen_bool(cfg.shipment_coverage) {
            continue;
        }

        let ship_date = order.order_date + Duration::days(rng.gen_range(0..=3));
        let delivery_date = ship_date + Duration::days(rng.gen_range(1..=7));
        let shipment_status = if delivery_date > order.required_ship_date {
            ShipmentStatus::Late
        } else {
            ShipmentStatus::OnTime
        };

        shipments.push(Shipment {
            shipment_id: shipments.len() as i64 + 1,
            order_id: order.order_id,
            ship_date,
            delivery_date,
            shipment_status,
            carrier: weighted_choice(
                rng,
                &[("CarrierA", 1.0), ("CarrierB", 1.0), ("CarrierC", 1.0)],
            )
            .to_string(),
            warehouse_id: rng.gen_range(1..=5),
        });
    }

    shipments
}

fn weighted_choice<'a, T>(rng: &mut StdRng, choices: &'a [(T, f64)]) -> &'a T {
    let total: f64 = choices.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0.0..total);
    for (item, weight) in choices {
        if roll < *weight {
            return item;
        }
        roll -= weight;
    }
    &choices[choices.len() - 1].0
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
