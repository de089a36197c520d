//! MQTT ingestion: subscribe to the sensor topic and store every reading.
//!
//! Runs as a background task next to the HTTP server. The topic is
//! (re)subscribed on every ConnAck so a broker reconnect does not silently
//! stop ingestion.

use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use sqlx::PgPool;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{Config, IncomingReading};

// ---

const KEEP_ALIVE: Duration = Duration::from_secs(60);
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Connect to the configured broker and store readings until the process exits.
pub async fn run(pool: PgPool, config: Config) {
    // ---
    let client_id = format!("sensor-monitor-{}", Uuid::new_v4().simple());
    let mut options = MqttOptions::new(client_id, config.mqtt_host.clone(), config.mqtt_port);
    options.set_keep_alive(KEEP_ALIVE);

    let (client, mut eventloop) = AsyncClient::new(options, 10);
    info!(
        "Connecting to MQTT broker {}:{}",
        config.mqtt_host, config.mqtt_port
    );

    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                info!("Connected to MQTT broker ({:?})", ack.code);
                if let Err(e) = client.try_subscribe(config.mqtt_topic.as_str(), QoS::AtLeastOnce) {
                    error!("Failed to subscribe to {}: {}", config.mqtt_topic, e);
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                debug!("MQTT message on {}", publish.topic);
                if let Err(e) =
                    handle_payload(&pool, &publish.payload, Local::now().naive_local()).await
                {
                    error!("Failed to store reading: {}", e);
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("MQTT connection error: {}", e);
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

/// Decode one payload and store it.
///
/// Returns the stored reading, or `None` when the payload was not a
/// recognisable reading. Bad payloads are logged and skipped without
/// touching the database.
pub async fn handle_payload(
    pool: &PgPool,
    payload: &[u8],
    received_at: NaiveDateTime,
) -> Result<Option<IncomingReading>, sqlx::Error> {
    // ---
    let reading = match IncomingReading::from_payload(payload) {
        Ok(reading) => reading,
        Err(e) => {
            warn!(
                "Unrecognised sensor payload, skipped ({}): {}",
                e,
                String::from_utf8_lossy(payload)
            );
            return Ok(None);
        }
    };

    store_reading(pool, &reading, received_at).await?;
    info!(
        "Stored reading: suhu={} humidity={} lux={} at {}",
        reading.suhu, reading.humidity, reading.lux, received_at
    );
    Ok(Some(reading))
}

pub async fn store_reading(
    pool: &PgPool,
    reading: &IncomingReading,
    received_at: NaiveDateTime,
) -> Result<(), sqlx::Error> {
    // ---
    sqlx::query(
        r#"
        INSERT INTO data_sensor (suhu, humidity, lux, "timestamp")
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(reading.suhu)
    .bind(reading.humidity)
    .bind(reading.lux)
    .bind(received_at)
    .execute(pool)
    .await?;

    Ok(())
}
