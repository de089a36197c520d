//! In-memory model of the dashboard page.
//!
//! Every target the refresher writes is addressed by the element ID it has in
//! the rendered document, so a snapshot from [`Page::to_html`] can be opened
//! in a browser and looks like the live page.

use std::collections::BTreeMap;

use super::chart::Canvas;
use super::render::{count_label, escape_html, PLACEHOLDER};

// ---

/// Element IDs of the page targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ElementId {
    RefreshIndicator,
    RefreshStatus,
    CurrentTemp,
    CurrentHumid,
    CurrentLux,
    TotalData,
    SuhuMax,
    SuhuMin,
    SuhuAvg,
    HumidMax,
    HumidMin,
    HumidAvg,
    ChartSuhu,
    DataBody,
    DataCount,
}

impl ElementId {
    /// Targets holding plain text.
    pub const TEXT: [ElementId; 12] = [
        ElementId::RefreshStatus,
        ElementId::CurrentTemp,
        ElementId::CurrentHumid,
        ElementId::CurrentLux,
        ElementId::TotalData,
        ElementId::SuhuMax,
        ElementId::SuhuMin,
        ElementId::SuhuAvg,
        ElementId::HumidMax,
        ElementId::HumidMin,
        ElementId::HumidAvg,
        ElementId::DataCount,
    ];

    pub fn as_str(self) -> &'static str {
        // ---
        match self {
            ElementId::RefreshIndicator => "refreshIndicator",
            ElementId::RefreshStatus => "refreshStatus",
            ElementId::CurrentTemp => "currentTemp",
            ElementId::CurrentHumid => "currentHumid",
            ElementId::CurrentLux => "currentLux",
            ElementId::TotalData => "totalData",
            ElementId::SuhuMax => "suhuMax",
            ElementId::SuhuMin => "suhuMin",
            ElementId::SuhuAvg => "suhuAvg",
            ElementId::HumidMax => "humidMax",
            ElementId::HumidMin => "humidMin",
            ElementId::HumidAvg => "humidAvg",
            ElementId::ChartSuhu => "chartSuhu",
            ElementId::DataBody => "dataBody",
            ElementId::DataCount => "dataCount",
        }
    }

    fn initial_text(self) -> String {
        // ---
        match self {
            ElementId::RefreshStatus => String::new(),
            ElementId::DataCount => count_label(0),
            _ => PLACEHOLDER.to_string(),
        }
    }
}

/// Status shown in the `refreshStatus` target after a failed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusNotice {
    /// Backend unreachable or answered with an error status.
    Stale,
    /// Backend answered with a body that is not the expected JSON.
    Malformed,
}

impl StatusNotice {
    pub fn text(self) -> &'static str {
        match self {
            StatusNotice::Stale => "Data may be stale: backend unreachable",
            StatusNotice::Malformed => "Backend returned malformed data",
        }
    }
}

#[derive(Debug)]
pub struct Page {
    texts: BTreeMap<ElementId, String>,
    table_body: String,
    refreshing: bool,
    canvas: Canvas,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    // ---
    pub fn new() -> Self {
        // ---
        Page {
            texts: ElementId::TEXT
                .iter()
                .map(|id| (*id, id.initial_text()))
                .collect(),
            table_body: String::new(),
            refreshing: false,
            canvas: Canvas::default(),
        }
    }

    /// Text content of a text target; empty for non-text targets.
    pub fn text(&self, id: ElementId) -> &str {
        self.texts.get(&id).map(String::as_str).unwrap_or("")
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        self.texts.insert(id, text.into());
    }

    pub fn table_body(&self) -> &str {
        &self.table_body
    }

    /// Replace the whole content of `dataBody`.
    pub fn set_table_body(&mut self, html: String) {
        self.table_body = html;
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn set_refreshing(&mut self, active: bool) {
        self.refreshing = active;
    }

    pub fn show_notice(&mut self, notice: Option<StatusNotice>) {
        self.set_text(
            ElementId::RefreshStatus,
            notice.map(StatusNotice::text).unwrap_or_default(),
        );
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Render the page as a standalone HTML document.
    pub fn to_html(&self) -> String {
        // ---
        let t = |id: ElementId| escape_html(self.text(id));
        let indicator_class = if self.refreshing {
            "refresh-indicator active"
        } else {
            "refresh-indicator"
        };

        let chart_script = match self.canvas.current() {
            Some(chart) => match serde_json::to_string(chart) {
                // `</` would end the script element early
                Ok(json) => format!(
                    "<script type=\"application/json\" id=\"chartSuhu-config\">{}</script>\n{}",
                    json.replace("</", "<\\/"),
                    CHART_BOOTSTRAP
                ),
                Err(e) => {
                    tracing::error!("Failed to serialize chart config: {}", e);
                    String::new()
                }
            },
            None => String::new(),
        };

        format!(
            r#"<!DOCTYPE html>
<html lang="id">
<head>
  <meta charset="utf-8">
  <title>Sensor Monitoring Dashboard</title>
  <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
  <style>
    body {{ font-family: 'Segoe UI', sans-serif; background: #f0f2f5; margin: 0; padding: 24px; }}
    .cards {{ display: flex; gap: 16px; flex-wrap: wrap; }}
    .card {{ background: #fff; border-radius: 12px; padding: 16px; min-width: 160px; box-shadow: 0 4px 6px rgba(0,0,0,0.1); }}
    .value {{ font-size: 2rem; font-weight: bold; }}
    .refresh-indicator {{ visibility: hidden; color: #4ecdc4; }}
    .refresh-indicator.active {{ visibility: visible; }}
    .status {{ color: #c0392b; min-height: 1em; }}
    .chart-box {{ position: relative; height: 400px; background: #fff; border-radius: 12px; margin: 24px 0; padding: 16px; }}
    .badge {{ border-radius: 8px; padding: 2px 8px; }}
    .badge-temp {{ background: #ffe3e3; }}
    .badge-humid {{ background: #dcf7f5; }}
    .badge-lux {{ background: #fff4cc; }}
  </style>
</head>
<body>
  <header>
    <h1>Sistem Monitoring Data Sensor</h1>
    <span id="refreshIndicator" class="{indicator_class}">&#8635; refreshing</span>
    <p id="refreshStatus" class="status">{refresh_status}</p>
  </header>
  <section class="cards">
    <div class="card"><h3>Suhu</h3><div class="value"><span id="currentTemp">{current_temp}</span> &deg;C</div></div>
    <div class="card"><h3>Kelembapan</h3><div class="value"><span id="currentHumid">{current_humid}</span> %</div></div>
    <div class="card"><h3>Cahaya</h3><div class="value"><span id="currentLux">{current_lux}</span> Lux</div></div>
    <div class="card"><h3>Total Data</h3><div class="value" id="totalData">{total_data}</div></div>
  </section>
  <section class="cards">
    <div class="card">Suhu max <b id="suhuMax">{suhu_max}</b></div>
    <div class="card">Suhu min <b id="suhuMin">{suhu_min}</b></div>
    <div class="card">Suhu rata-rata <b id="suhuAvg">{suhu_avg}</b></div>
    <div class="card">Kelembapan max <b id="humidMax">{humid_max}</b></div>
    <div class="card">Kelembapan min <b id="humidMin">{humid_min}</b></div>
    <div class="card">Kelembapan rata-rata <b id="humidAvg">{humid_avg}</b></div>
  </section>
  <div class="chart-box"><canvas id="chartSuhu"></canvas></div>
  <section>
    <h2>Riwayat Data <small id="dataCount">{data_count}</small></h2>
    <table>
      <thead><tr><th>ID</th><th>Waktu</th><th>Suhu</th><th>Kelembapan</th><th>Cahaya</th></tr></thead>
      <tbody id="dataBody">{table_body}</tbody>
    </table>
  </section>
{chart_script}
</body>
</html>
"#,
            refresh_status = t(ElementId::RefreshStatus),
            current_temp = t(ElementId::CurrentTemp),
            current_humid = t(ElementId::CurrentHumid),
            current_lux = t(ElementId::CurrentLux),
            total_data = t(ElementId::TotalData),
            suhu_max = t(ElementId::SuhuMax),
            suhu_min = t(ElementId::SuhuMin),
            suhu_avg = t(ElementId::SuhuAvg),
            humid_max = t(ElementId::HumidMax),
            humid_min = t(ElementId::HumidMin),
            humid_avg = t(ElementId::HumidAvg),
            data_count = t(ElementId::DataCount),
            table_body = self.table_body,
        )
    }
}

/// Turns the gradient descriptions in the embedded config into canvas gradients.
const CHART_BOOTSTRAP: &str = r#"<script>
  (function () {
    const cfg = JSON.parse(document.getElementById('chartSuhu-config').textContent);
    const ctx = document.getElementById('chartSuhu').getContext('2d');
    for (const ds of cfg.data.datasets) {
      const g = ds.backgroundColor;
      const grad = ctx.createLinearGradient(g.x0, g.y0, g.x1, g.y1);
      for (const [offset, color] of g.stops) grad.addColorStop(offset, color);
      ds.backgroundColor = grad;
    }
    new Chart(ctx, cfg);
  })();
</script>"#;
