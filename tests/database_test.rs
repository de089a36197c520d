//! Backend routes against a live PostgreSQL database.
//!
//! Needs `DATABASE_URL`; each test works in a throwaway schema so existing
//! `data_sensor` rows are never touched. Skipped when the variable is unset.

use std::str::FromStr;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tokio::net::TcpListener;
use uuid::Uuid;

use sensor_monitor::{ingest, routes, schema, Config, IncomingReading, Reading, Summary};

/// A pool whose `search_path` points at a fresh schema.
struct Scratch {
    admin: PgPool,
    pool: PgPool,
    name: String,
}

impl Scratch {
    async fn create(url: &str) -> Result<Self> {
        // ---
        let admin = PgPoolOptions::new().max_connections(1).connect(url).await?;
        let name = format!("sensor_test_{}", Uuid::new_v4().simple());
        sqlx::query(&format!("CREATE SCHEMA {}", name))
            .execute(&admin)
            .await?;

        let options = PgConnectOptions::from_str(url)?.options([("search_path", name.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await?;
        schema::create_schema(&pool).await?;

        Ok(Scratch { admin, pool, name })
    }

    async fn drop_schema(self) -> Result<()> {
        // ---
        self.pool.close().await;
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.name))
            .execute(&self.admin)
            .await?;
        Ok(())
    }
}

fn test_config(url: &str) -> Config {
    // ---
    Config {
        db_url: url.to_string(),
        db_pool_max: 2,
        http_port: 0,
        data_limit: 20,
        mqtt_enabled: false,
        mqtt_host: "localhost".into(),
        mqtt_port: 1883,
        mqtt_topic: "sensor/test".into(),
    }
}

async fn serve(pool: PgPool, config: Config) -> Result<String> {
    // ---
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = routes::router(pool, config);
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    Ok(format!("http://{}", addr))
}

fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

/// 25 readings: 3 in Nov 2023, 2 in Dec 2023, 20 in Jan 2024.
/// Temperature climbs by 0.5 per reading from 20.0.
async fn seed(pool: &PgPool) -> Result<()> {
    // ---
    for i in 0..25u32 {
        let when = match i {
            0..=2 => at(2023, 11, 1 + i, 8),
            3..=4 => at(2023, 12, 1 + i, 8),
            _ => at(2024, 1, i - 4, 8),
        };
        let reading = IncomingReading {
            suhu: 20.0 + f64::from(i) * 0.5,
            humidity: 50.0 + f64::from(i),
            lux: 300.0,
        };
        ingest::store_reading(pool, &reading, when).await?;
    }
    Ok(())
}

async fn row_count(pool: &PgPool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM data_sensor")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[tokio::test]
async fn data_endpoint_returns_newest_rows_first() -> Result<()> {
    // ---
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return Ok(());
    };
    let scratch = Scratch::create(&url).await?;
    seed(&scratch.pool).await?;

    let base = serve(scratch.pool.clone(), test_config(&url)).await?;
    let client = Client::builder().no_proxy().build()?;
    let readings: Vec<Reading> = client
        .get(format!("{}/api/data", base))
        .send()
        .await?
        .json()
        .await?;

    let ids: Vec<i64> = readings.iter().map(|r| r.id).collect();
    assert_eq!(ids, (6..=25).rev().collect::<Vec<i64>>());
    assert_eq!(readings[0].suhu, Some(32.0));
    assert_eq!(readings[0].timestamp, "2024-01-20 08:00:00");

    scratch.drop_schema().await
}

#[tokio::test]
async fn summary_endpoint_aggregates_and_groups_months() -> Result<()> {
    // ---
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return Ok(());
    };
    let scratch = Scratch::create(&url).await?;
    let base = serve(scratch.pool.clone(), test_config(&url)).await?;
    let client = Client::builder().no_proxy().build()?;

    let empty: Summary = client
        .get(format!("{}/api/summary", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(empty, Summary::default());

    seed(&scratch.pool).await?;
    let summary: Summary = client
        .get(format!("{}/api/summary", base))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(summary.suhumax, Some(32.0));
    assert_eq!(summary.suhumin, Some(20.0));
    assert_eq!(summary.suhurata, Some(26.0));
    assert_eq!(summary.humidrata, Some(62.0));

    let top: Vec<i64> = summary.nilai_suhu_max_humid_max.iter().map(|t| t.idx).collect();
    assert_eq!(top, vec![25, 24]);

    let months: Vec<&str> = summary
        .month_year_max
        .iter()
        .map(|m| m.month_year.as_str())
        .collect();
    assert_eq!(months, vec!["01-2024", "12-2023"]);

    scratch.drop_schema().await
}

#[tokio::test]
async fn ingest_stores_valid_payloads_and_skips_the_rest() -> Result<()> {
    // ---
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return Ok(());
    };
    let scratch = Scratch::create(&url).await?;
    let when = at(2024, 1, 1, 8);

    let skipped = ingest::handle_payload(&scratch.pool, br#"{"temperature": 26}"#, when).await?;
    assert_eq!(skipped, None);
    assert_eq!(row_count(&scratch.pool).await?, 0);

    let stored = ingest::handle_payload(
        &scratch.pool,
        br#"{"suhu": "26.5", "humidity": 55, "lux": 120}"#,
        when,
    )
    .await?;
    assert_eq!(stored.map(|r| r.suhu), Some(26.5));
    assert_eq!(row_count(&scratch.pool).await?, 1);

    scratch.drop_schema().await
}
