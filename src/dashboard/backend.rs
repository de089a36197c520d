//! Where the dashboard gets its data from.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::error::RefreshError;
use crate::{Reading, Summary};

// ---

pub const SUMMARY_PATH: &str = "/api/summary";
pub const DATA_PATH: &str = "/api/data";

/// Source of the two resources a refresh cycle renders.
#[async_trait]
pub trait SensorBackend: Send + Sync {
    async fn fetch_summary(&self) -> Result<Summary, RefreshError>;

    /// Readings, newest first.
    async fn fetch_data(&self) -> Result<Vec<Reading>, RefreshError>;
}

/// [`SensorBackend`] talking to the `sensor-monitor` HTTP API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    // ---
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        // ---
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        // ---
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpBackend { base_url, client }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RefreshError> {
        // ---
        let endpoint = format!("{}{}", self.base_url, path);
        let network = |source| RefreshError::Network {
            endpoint: endpoint.clone(),
            source,
        };

        tracing::debug!("GET {}", endpoint);
        let response = self.client.get(&endpoint).send().await.map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefreshError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        // Read the body first so that decode errors are told apart from I/O errors
        let body = response.bytes().await.map_err(network)?;
        serde_json::from_slice(&body).map_err(|source| RefreshError::Malformed { endpoint, source })
    }
}

#[async_trait]
impl SensorBackend for HttpBackend {
    async fn fetch_summary(&self) -> Result<Summary, RefreshError> {
        self.get_json(SUMMARY_PATH).await
    }

    async fn fetch_data(&self) -> Result<Vec<Reading>, RefreshError> {
        self.get_json(DATA_PATH).await
    }
}
