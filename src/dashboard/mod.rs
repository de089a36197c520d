//! Polling dashboard: fetches the backend's summary and readings on a fixed
//! cadence and renders them into an in-memory page.

mod backend;
mod chart;
mod error;
mod page;
mod refresher;
mod render;

pub use backend::{HttpBackend, SensorBackend, DATA_PATH, SUMMARY_PATH};
pub use chart::{Canvas, ChartHandle, LineChart};
pub use error::RefreshError;
pub use page::{ElementId, Page, StatusNotice};
pub use refresher::{CycleOutcome, DashboardRefresher, INDICATOR_LINGER, REFRESH_INTERVAL};
pub use render::PLACEHOLDER;
