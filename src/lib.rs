//! Sensor monitoring: MQTT ingest and JSON API (`sensor-monitor` binary) plus
//! the polling dashboard that renders it (`dashboard` binary).
//!
//! Modules follow the Explicit Module Boundary Pattern (EMBP): each
//! directory module exposes a small gateway in its `mod.rs`, and shared
//! types are re-exported here so siblings only know about `crate::`.

pub mod config;
pub mod dashboard;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod routes;
pub mod schema;

pub use config::{Config, DashboardConfig};
pub use models::{IncomingReading, MonthYear, Reading, SensorRow, Summary, TopReading};
