//! Entry point for the polling dashboard.
//!
//! Polls the backend's `/api/summary` and `/api/data` on a fixed cadence and
//! writes the rendered page to `DASHBOARD_SNAPSHOT` after every cycle.
//! See [`sensor_monitor::config::load_dashboard_from_env`] for the variables.
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;

use sensor_monitor::dashboard::{DashboardRefresher, HttpBackend};
use sensor_monitor::{config, logging};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    logging::init_tracing("info");
    dotenv().ok();

    let cfg = config::load_dashboard_from_env()?;
    cfg.log_config();

    let backend = HttpBackend::new(&cfg.api_url, cfg.request_timeout)
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

    let mut refresher = DashboardRefresher::new(backend).with_indicator_linger(cfg.indicator_linger);
    if let Some(path) = &cfg.snapshot_path {
        refresher = refresher.with_snapshot_path(path);
    }

    tracing::info!(
        "Refreshing from {} every {}ms",
        cfg.api_url,
        cfg.refresh_interval.as_millis()
    );

    tokio::select! {
        _ = Arc::new(refresher).run(cfg.refresh_interval) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, stopping dashboard");
        }
    }

    Ok(())
}
