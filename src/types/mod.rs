//! Record types shared across the pipeline stages

pub mod anomaly;
pub mod fact;
pub mod kpi;
pub mod order;
pub mod shipment;

pub use anomaly::WeekScore;
pub use fact::OrderShipmentFact;
pub use kpi::WeeklyKpi;
pub use order::{Order, OrderStatus, Priority};
pub use shipment::{Shipment, ShipmentStatus};
