//! Temperature/humidity line chart and the canvas it is attached to.
//!
//! The chart is rebuilt from scratch every cycle. Its configuration
//! serializes to the shape Chart.js expects, except that fills are plain
//! [`Gradient`] values which the page bootstrap turns into canvas gradients.

use serde::Serialize;

use crate::Reading;

// ---

/// Height in pixels over which the fill gradients fade out.
const GRADIENT_HEIGHT: f64 = 400.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    /// Time of day per point, oldest first.
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: &'static str,
    /// `None` serializes as `null`, which Chart.js draws as a gap.
    pub data: Vec<Option<f64>>,
    pub border_color: &'static str,
    pub background_color: Gradient,
    pub fill: bool,
    pub tension: f64,
    pub border_width: u32,
}

/// Vertical linear gradient, top colour first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gradient {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub stops: [(f64, &'static str); 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    pub plugins: serde_json::Value,
    pub scales: serde_json::Value,
}

impl Gradient {
    fn fade(top: &'static str, bottom: &'static str) -> Self {
        Gradient {
            x0: 0.0,
            y0: 0.0,
            x1: 0.0,
            y1: GRADIENT_HEIGHT,
            stops: [(0.0, top), (1.0, bottom)],
        }
    }
}

impl Default for ChartOptions {
    fn default() -> Self {
        ChartOptions {
            responsive: true,
            maintain_aspect_ratio: false,
            plugins: serde_json::json!({ "legend": { "position": "bottom" } }),
            scales: serde_json::json!({
                "y": { "beginAtZero": true },
                "x": { "grid": { "display": false } }
            }),
        }
    }
}

/// Time-of-day part of a `YYYY-MM-DD HH:MM:SS` timestamp.
///
/// Falls back to the whole string when there is no space in it.
pub fn time_of_day(timestamp: &str) -> &str {
    timestamp.split(' ').nth(1).unwrap_or(timestamp)
}

impl LineChart {
    /// Build the chart from readings in fetch order (newest first).
    ///
    /// Labels and both series come out in chronological order.
    pub fn from_readings(readings: &[Reading]) -> Self {
        // ---
        let chronological = readings.iter().rev();
        let labels = chronological
            .clone()
            .map(|r| time_of_day(&r.timestamp).to_string())
            .collect();
        let temperature = chronological.clone().map(|r| r.suhu).collect();
        let humidity = chronological.map(|r| r.humidity).collect();

        LineChart {
            kind: "line",
            data: ChartData {
                labels,
                datasets: vec![
                    Dataset {
                        label: "Suhu (°C)",
                        data: temperature,
                        border_color: "#ff6b6b",
                        background_color: Gradient::fade(
                            "rgba(255, 107, 107, 0.5)",
                            "rgba(255, 107, 107, 0.05)",
                        ),
                        fill: true,
                        tension: 0.4,
                        border_width: 3,
                    },
                    Dataset {
                        label: "Kelembapan (%)",
                        data: humidity,
                        border_color: "#4ecdc4",
                        background_color: Gradient::fade(
                            "rgba(78, 205, 196, 0.5)",
                            "rgba(78, 205, 196, 0.05)",
                        ),
                        fill: true,
                        tension: 0.4,
                        border_width: 3,
                    },
                ],
            },
            options: ChartOptions::default(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.data.labels
    }

    pub fn series(&self, label: &str) -> Option<&[Option<f64>]> {
        self.data
            .datasets
            .iter()
            .find(|d| d.label == label)
            .map(|d| d.data.as_slice())
    }
}

// ---

/// Identifies one chart constructed on a [`Canvas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartHandle(u64);

/// Drawing surface for the `chartSuhu` target.
///
/// Every constructed chart stays attached until it is destroyed through its
/// handle, so leaking a handle shows up in [`Canvas::attached_count`].
#[derive(Debug, Default)]
pub struct Canvas {
    attached: Vec<(ChartHandle, LineChart)>,
    next_id: u64,
}

impl Canvas {
    // ---
    pub fn attach(&mut self, chart: LineChart) -> ChartHandle {
        // ---
        self.next_id += 1;
        let handle = ChartHandle(self.next_id);
        self.attached.push((handle, chart));
        handle
    }

    /// Detach the chart behind `handle`. Returns false if it was already gone.
    pub fn destroy(&mut self, handle: ChartHandle) -> bool {
        // ---
        let before = self.attached.len();
        self.attached.retain(|(h, _)| *h != handle);
        self.attached.len() != before
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    /// The most recently attached chart, if any.
    pub fn current(&self) -> Option<&LineChart> {
        self.attached.last().map(|(_, chart)| chart)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn reading(id: i64, timestamp: &str, suhu: f64, humidity: f64) -> Reading {
        Reading {
            id,
            timestamp: timestamp.to_string(),
            suhu: Some(suhu),
            humidity: Some(humidity),
            lux: Some(100.0),
        }
    }

    #[test]
    fn series_are_reversed_into_chronological_order() {
        // ---
        let readings = vec![
            reading(3, "2024-01-01 10:00:10", 26.0, 61.0),
            reading(2, "2024-01-01 10:00:05", 25.0, 60.0),
            reading(1, "2024-01-01 10:00:00", 24.0, 58.0),
        ];
        let chart = LineChart::from_readings(&readings);

        assert_eq!(chart.labels(), ["10:00:00", "10:00:05", "10:00:10"]);
        assert_eq!(
            chart.series("Suhu (°C)").unwrap(),
            [Some(24.0), Some(25.0), Some(26.0)]
        );
        assert_eq!(
            chart.series("Kelembapan (%)").unwrap(),
            [Some(58.0), Some(60.0), Some(61.0)]
        );
    }

    #[test]
    fn missing_values_become_null_points() {
        // ---
        let mut gap = reading(2, "2024-01-01 10:00:05", 0.0, 60.0);
        gap.suhu = None;
        let readings = vec![gap, reading(1, "2024-01-01 10:00:00", 24.0, 58.0)];
        let chart = LineChart::from_readings(&readings);

        assert_eq!(chart.series("Suhu (°C)").unwrap(), [Some(24.0), None]);
        let json = serde_json::to_value(&chart).unwrap();
        assert!(json["data"]["datasets"][0]["data"][1].is_null());
    }

    #[test]
    fn empty_readings_give_empty_series() {
        // ---
        let chart = LineChart::from_readings(&[]);
        assert!(chart.labels().is_empty());
        assert!(chart.series("Suhu (°C)").unwrap().is_empty());
    }

    #[test]
    fn time_of_day_takes_token_after_first_space() {
        // ---
        assert_eq!(time_of_day("2024-01-01 10:00:05"), "10:00:05");
        assert_eq!(time_of_day("2024-01-01T10:00:05"), "2024-01-01T10:00:05");
    }

    #[test]
    fn config_serializes_in_chart_js_shape() {
        // ---
        let json = serde_json::to_value(LineChart::from_readings(&[])).unwrap();
        assert_eq!(json["type"], "line");
        assert_eq!(json["data"]["datasets"][0]["borderColor"], "#ff6b6b");
        assert_eq!(json["data"]["datasets"][1]["borderWidth"], 3);
        assert_eq!(json["data"]["datasets"][1]["tension"], 0.4);
        assert_eq!(json["options"]["maintainAspectRatio"], false);
        assert_eq!(json["options"]["plugins"]["legend"]["position"], "bottom");
        assert_eq!(
            json["data"]["datasets"][0]["backgroundColor"]["stops"][1][1],
            "rgba(255, 107, 107, 0.05)"
        );
    }

    #[test]
    fn canvas_tracks_attached_charts() {
        // ---
        let mut canvas = Canvas::default();
        let first = canvas.attach(LineChart::from_readings(&[]));
        assert_eq!(canvas.attached_count(), 1);

        assert!(canvas.destroy(first));
        assert!(!canvas.destroy(first));
        let _second = canvas.attach(LineChart::from_readings(&[]));
        assert_eq!(canvas.attached_count(), 1);
    }
}
