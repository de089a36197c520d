//! Data models shared by the backend API, the MQTT ingest task and the dashboard.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ---

/// Wire format of timestamps served by `/api/data` and `/api/summary`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One timestamped sensor sample as served by `GET /api/data` (newest first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    // ---
    pub id: i64,
    /// `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
    /// Temperature in °C; `null` when the sensor did not report it.
    #[serde(default)]
    pub suhu: Option<f64>,
    /// Relative humidity in %.
    #[serde(default)]
    pub humidity: Option<f64>,
    /// Light level in lux.
    #[serde(default)]
    pub lux: Option<f64>,
}

/// Server-computed aggregates as served by `GET /api/summary`.
///
/// Every aggregate is optional: an empty table yields `null`, and the
/// dashboard tolerates a field being absent altogether.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    // ---
    #[serde(default)]
    pub suhumax: Option<f64>,
    #[serde(default)]
    pub suhumin: Option<f64>,
    #[serde(default)]
    pub suhurata: Option<f64>,
    #[serde(default)]
    pub humidmax: Option<f64>,
    #[serde(default)]
    pub humidmin: Option<f64>,
    #[serde(default)]
    pub humidrata: Option<f64>,

    /// The two hottest readings (ties broken by humidity).
    #[serde(default)]
    pub nilai_suhu_max_humid_max: Vec<TopReading>,

    /// The two most recent months with data, as `MM-YYYY`.
    #[serde(default)]
    pub month_year_max: Vec<MonthYear>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopReading {
    pub idx: i64,
    pub suhun: f64,
    pub humid: f64,
    pub kecerahan: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthYear {
    pub month_year: String,
}

// ---

/// Row shape of the `data_sensor` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SensorRow {
    // ---
    pub id: i32,
    pub suhu: f64,
    pub humidity: f64,
    pub lux: f64,
    pub timestamp: NaiveDateTime,
}

impl SensorRow {
    // ---
    pub fn to_reading(&self) -> Reading {
        // ---
        Reading {
            id: i64::from(self.id),
            timestamp: self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            suhu: Some(self.suhu),
            humidity: Some(self.humidity),
            lux: Some(self.lux),
        }
    }

    pub fn to_top_reading(&self) -> TopReading {
        // ---
        TopReading {
            idx: i64::from(self.id),
            suhun: self.suhu,
            humid: self.humidity,
            kecerahan: self.lux,
            timestamp: self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Round to two decimals, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---

/// Reasons an MQTT payload is not accepted as a reading.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not numeric: {value}")]
    NotNumeric { field: &'static str, value: String },
}

/// A reading published by the sensor node over MQTT.
///
/// The node is lenient about types: each value may arrive as a JSON number
/// or as a numeric string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncomingReading {
    // ---
    pub suhu: f64,
    pub humidity: f64,
    pub lux: f64,
}

impl IncomingReading {
    // ---
    pub fn from_payload(payload: &[u8]) -> Result<Self, PayloadError> {
        // ---
        let value: Value = serde_json::from_slice(payload)?;
        let object = value.as_object().ok_or(PayloadError::NotAnObject)?;

        let field = |name: &'static str| -> Result<f64, PayloadError> {
            let raw = object.get(name).ok_or(PayloadError::MissingField(name))?;
            coerce_f64(raw).ok_or_else(|| PayloadError::NotNumeric {
                field: name,
                value: raw.to_string(),
            })
        };

        Ok(IncomingReading {
            suhu: field("suhu")?,
            humidity: field("humidity")?,
            lux: field("lux")?,
        })
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    // ---
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}
