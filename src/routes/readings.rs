//! `GET /api/data`: the newest readings, newest first.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use sqlx::PgPool;
use tracing::{debug, error};

use crate::{Config, Reading, SensorRow};

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new().route("/api/data", get(handler))
}

async fn handler(State((pool, config)): State<(PgPool, Config)>) -> impl IntoResponse {
    // ---
    debug!("GET /api/data - limit {}", config.data_limit);

    match fetch_latest(&pool, config.data_limit).await {
        Ok(readings) => {
            debug!("GET /api/data - returning {} readings", readings.len());
            (StatusCode::OK, Json(readings)).into_response()
        }
        Err(e) => {
            error!("Failed to load readings: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to load readings"),
            )
                .into_response()
        }
    }
}

/// Newest `limit` rows of `data_sensor`, ordered by id descending.
pub async fn fetch_latest(pool: &PgPool, limit: u32) -> Result<Vec<Reading>, sqlx::Error> {
    // ---
    let rows: Vec<SensorRow> = sqlx::query_as(
        r#"
        SELECT id, suhu, humidity, lux, "timestamp"
        FROM data_sensor
        ORDER BY id DESC
        LIMIT $1
        "#,
    )
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(SensorRow::to_reading).collect())
}
