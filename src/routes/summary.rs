//! `GET /api/summary`: aggregates over every stored reading.
//!
//! Aggregates are rounded to two decimals and are `null` while the table is
//! empty. The response also carries the two hottest readings and the two
//! most recent months that have data.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use sqlx::PgPool;
use tracing::{debug, error};

use crate::models::round2;
use crate::{Config, MonthYear, SensorRow, Summary};

// ---

/// MAX/MIN/AVG of suhu, then of humidity.
type AggregateRow = (
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
);

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new().route("/api/summary", get(handler))
}

async fn handler(State((pool, _config)): State<(PgPool, Config)>) -> impl IntoResponse {
    // ---
    debug!("GET /api/summary");

    match build_summary(&pool).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            error!("Failed to compute summary: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to compute summary"),
            )
                .into_response()
        }
    }
}

pub async fn build_summary(pool: &PgPool) -> Result<Summary, sqlx::Error> {
    // ---
    let aggregates: AggregateRow = sqlx::query_as(
        r#"
        SELECT
            MAX(suhu), MIN(suhu), AVG(suhu),
            MAX(humidity), MIN(humidity), AVG(humidity)
        FROM data_sensor
        "#,
    )
    .fetch_one(pool)
    .await?;

    let top_rows: Vec<SensorRow> = sqlx::query_as(
        r#"
        SELECT id, suhu, humidity, lux, "timestamp"
        FROM data_sensor
        ORDER BY suhu DESC, humidity DESC
        LIMIT 2
        "#,
    )
    .fetch_all(pool)
    .await?;

    let months: Vec<(Option<String>,)> = sqlx::query_as(
        r#"
        SELECT to_char(MAX("timestamp"), 'MM-YYYY') AS month_year
        FROM data_sensor
        GROUP BY to_char("timestamp", 'MM-YYYY')
        ORDER BY MAX("timestamp") DESC
        LIMIT 2
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(assemble(aggregates, &top_rows, months))
}

fn assemble(
    aggregates: AggregateRow,
    top_rows: &[SensorRow],
    months: Vec<(Option<String>,)>,
) -> Summary {
    // ---
    let (suhumax, suhumin, suhurata, humidmax, humidmin, humidrata) = aggregates;

    Summary {
        suhumax: suhumax.map(round2),
        suhumin: suhumin.map(round2),
        suhurata: suhurata.map(round2),
        humidmax: humidmax.map(round2),
        humidmin: humidmin.map(round2),
        humidrata: humidrata.map(round2),
        nilai_suhu_max_humid_max: top_rows.iter().map(SensorRow::to_top_reading).collect(),
        month_year_max: months
            .into_iter()
            .filter_map(|(month_year,)| month_year.map(|month_year| MonthYear { month_year }))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_table_yields_nulls() {
        // ---
        let summary = assemble((None, None, None, None, None, None), &[], vec![]);
        let json = serde_json::to_value(&summary).unwrap();

        assert!(json["suhumax"].is_null());
        assert!(json["humidrata"].is_null());
        assert_eq!(json["nilai_suhu_max_humid_max"], serde_json::json!([]));
        assert_eq!(json["month_year_max"], serde_json::json!([]));
    }

    #[test]
    fn aggregates_are_rounded_and_zero_is_kept() {
        // ---
        let summary = assemble(
            (
                Some(25.0),
                Some(0.0),
                Some(24.456),
                Some(60.0),
                Some(58.0),
                Some(59.004),
            ),
            &[],
            vec![(Some("01-2024".to_string()),), (None,)],
        );

        assert_eq!(summary.suhumin, Some(0.0));
        assert_eq!(summary.suhurata, Some(24.46));
        assert_eq!(summary.humidrata, Some(59.0));
        assert_eq!(
            summary.month_year_max,
            vec![MonthYear {
                month_year: "01-2024".into()
            }]
        );
    }

    #[test]
    fn top_rows_keep_query_order() {
        // ---
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let rows = vec![
            SensorRow {
                id: 9,
                suhu: 31.0,
                humidity: 70.0,
                lux: 500.0,
                timestamp: at,
            },
            SensorRow {
                id: 4,
                suhu: 31.0,
                humidity: 65.0,
                lux: 420.0,
                timestamp: at,
            },
        ];
        let summary = assemble((None, None, None, None, None, None), &rows, vec![]);

        let ids: Vec<i64> = summary.nilai_suhu_max_humid_max.iter().map(|t| t.idx).collect();
        assert_eq!(ids, vec![9, 4]);
        assert_eq!(summary.nilai_suhu_max_humid_max[0].timestamp, "2024-01-01 10:00:00");
    }
}
