//! Database schema management for `sensor-monitor`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs`.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the `data_sensor` table that the MQTT ingest task writes and the
/// `/api/data` and `/api/summary` endpoints read. Safe to call on every
/// startup; no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS data_sensor (
            id         SERIAL PRIMARY KEY,
            suhu       DOUBLE PRECISION NOT NULL,
            humidity   DOUBLE PRECISION NOT NULL,
            lux        DOUBLE PRECISION NOT NULL,
            "timestamp" TIMESTAMP       NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Month grouping in `/api/summary` scans by timestamp
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_data_sensor_timestamp
            ON data_sensor ("timestamp");
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
