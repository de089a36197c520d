//! The refresh cycle: fetch summary and readings, then render them.
//!
//! A cycle never renders half a fetch: both resources are fetched and decoded
//! before the page is touched, and the whole render happens under one lock.
//! At most one cycle is in flight at a time; a timer tick that lands while a
//! cycle is still running is skipped instead of queued.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::backend::SensorBackend;
use super::chart::{ChartHandle, LineChart};
use super::error::RefreshError;
use super::page::{ElementId, Page, StatusNotice};
use super::render::{count_label, format_optional, table_rows, PLACEHOLDER};
use crate::{Reading, Summary};

// ---

/// Default cadence of refresh cycles.
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(5000);

/// Default time the refresh indicator stays visible after a cycle settles.
pub const INDICATOR_LINGER: Duration = Duration::from_millis(500);

/// Result of one call to [`DashboardRefresher::refresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Rendered { readings: usize },
    /// Another cycle was still in flight; nothing was done.
    Skipped,
    /// Fetching failed; the page keeps what it showed before.
    Failed(StatusNotice),
}

/// Page plus the one chart currently constructed on its canvas.
#[derive(Debug, Default)]
struct ViewState {
    page: Page,
    chart: Option<ChartHandle>,
}

impl ViewState {
    // ---
    fn render(&mut self, summary: &Summary, readings: &[Reading]) {
        // ---
        let page = &mut self.page;

        match readings.first() {
            Some(latest) => {
                page.set_text(ElementId::CurrentTemp, format_optional(latest.suhu));
                page.set_text(ElementId::CurrentHumid, format_optional(latest.humidity));
                page.set_text(ElementId::CurrentLux, format_optional(latest.lux));
            }
            None => {
                page.set_text(ElementId::CurrentTemp, PLACEHOLDER);
                page.set_text(ElementId::CurrentHumid, PLACEHOLDER);
                page.set_text(ElementId::CurrentLux, PLACEHOLDER);
            }
        }
        page.set_text(ElementId::TotalData, readings.len().to_string());

        page.set_text(ElementId::SuhuMax, format_optional(summary.suhumax));
        page.set_text(ElementId::SuhuMin, format_optional(summary.suhumin));
        page.set_text(ElementId::SuhuAvg, format_optional(summary.suhurata));
        page.set_text(ElementId::HumidMax, format_optional(summary.humidmax));
        page.set_text(ElementId::HumidMin, format_optional(summary.humidmin));
        page.set_text(ElementId::HumidAvg, format_optional(summary.humidrata));

        // Old chart goes before the new one is constructed
        if let Some(old) = self.chart.take() {
            page.canvas_mut().destroy(old);
        }
        self.chart = Some(page.canvas_mut().attach(LineChart::from_readings(readings)));

        page.set_table_body(table_rows(readings));
        page.set_text(ElementId::DataCount, count_label(readings.len()));
        page.show_notice(None);
    }
}

/// Periodically re-renders the dashboard page from a [`SensorBackend`].
pub struct DashboardRefresher<B> {
    backend: B,
    view: Arc<Mutex<ViewState>>,
    in_flight: AtomicBool,
    generation: Arc<AtomicU64>,
    indicator_linger: Duration,
    snapshot_path: Option<PathBuf>,
}

impl<B: SensorBackend> DashboardRefresher<B> {
    // ---
    pub fn new(backend: B) -> Self {
        // ---
        DashboardRefresher {
            backend,
            view: Arc::new(Mutex::new(ViewState::default())),
            in_flight: AtomicBool::new(false),
            generation: Arc::new(AtomicU64::new(0)),
            indicator_linger: INDICATOR_LINGER,
            snapshot_path: None,
        }
    }

    pub fn with_indicator_linger(mut self, linger: Duration) -> Self {
        self.indicator_linger = linger;
        self
    }

    /// Write the rendered page to `path` whenever a cycle has settled.
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Run `f` against the current page.
    pub async fn with_page<R>(&self, f: impl FnOnce(&Page) -> R) -> R {
        f(&self.view.lock().await.page)
    }

    /// Perform one full refresh cycle.
    ///
    /// Failures are logged and reflected in the `refreshStatus` target; they
    /// never propagate. The refresh indicator is switched off after the
    /// linger delay however the cycle ends, including when the returned
    /// future is dropped before completion.
    pub async fn refresh(&self) -> CycleOutcome {
        // ---
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Previous refresh cycle still in flight, skipping tick");
            return CycleOutcome::Skipped;
        }

        let cycle = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let _guard = CycleGuard {
            in_flight: &self.in_flight,
            view: Arc::clone(&self.view),
            generation: Arc::clone(&self.generation),
            cycle,
            linger: self.indicator_linger,
            snapshot_path: self.snapshot_path.clone(),
        };

        debug!("Refresh cycle {} started", cycle);
        self.view.lock().await.page.set_refreshing(true);

        match self.fetch().await {
            Ok((summary, readings)) => {
                self.view.lock().await.render(&summary, &readings);
                info!("Refresh cycle {} rendered {} readings", cycle, readings.len());
                CycleOutcome::Rendered {
                    readings: readings.len(),
                }
            }
            Err(err) => {
                if err.is_transient() {
                    warn!("⚠️ Failed to load dashboard data: {}", err);
                } else {
                    error!("⚠️ Backend returned malformed dashboard data: {}", err);
                }
                let notice = err.notice();
                self.view.lock().await.page.show_notice(Some(notice));
                CycleOutcome::Failed(notice)
            }
        }
    }

    /// Both resources, summary first. Nothing is rendered from a partial fetch.
    async fn fetch(&self) -> Result<(Summary, Vec<Reading>), RefreshError> {
        // ---
        let summary = self.backend.fetch_summary().await?;
        let readings = self.backend.fetch_data().await?;
        Ok((summary, readings))
    }
}

impl<B: SensorBackend + 'static> DashboardRefresher<B> {
    /// Refresh immediately, then once per `interval`, forever.
    ///
    /// Each tick runs its cycle on its own task so a slow backend does not
    /// stretch the cadence; overlapping ticks are skipped by [`Self::refresh`].
    pub async fn run(self: Arc<Self>, interval: Duration) {
        // ---
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let refresher = Arc::clone(&self);
            tokio::spawn(async move {
                refresher.refresh().await;
            });
        }
    }
}

/// Releases the single-flight flag and schedules the indicator switch-off.
struct CycleGuard<'a> {
    in_flight: &'a AtomicBool,
    view: Arc<Mutex<ViewState>>,
    generation: Arc<AtomicU64>,
    cycle: u64,
    linger: Duration,
    snapshot_path: Option<PathBuf>,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        // ---
        self.in_flight.store(false, Ordering::Release);

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let view = Arc::clone(&self.view);
        let generation = Arc::clone(&self.generation);
        let cycle = self.cycle;
        let linger = self.linger;
        let snapshot_path = self.snapshot_path.take();

        runtime.spawn(async move {
            tokio::time::sleep(linger).await;

            let html = {
                let mut view = view.lock().await;
                // A newer cycle owns the indicator now
                if generation.load(Ordering::Acquire) != cycle {
                    return;
                }
                view.page.set_refreshing(false);
                snapshot_path.as_ref().map(|_| view.page.to_html())
            };

            if let (Some(path), Some(html)) = (snapshot_path, html) {
                if let Err(e) = tokio::fs::write(&path, html).await {
                    error!("Failed to write dashboard snapshot {}: {}", path.display(), e);
                }
            }
        });
    }
}
