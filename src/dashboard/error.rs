use thiserror::Error;

use super::page::StatusNotice;

// ---

/// Why a refresh cycle could not fetch its data.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// Connection refused, DNS failure, timeout, dropped body...
    #[error("request to {endpoint} failed: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} answered with HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The backend answered, but not with the JSON we expect.
    #[error("{endpoint} returned malformed JSON: {source}")]
    Malformed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RefreshError {
    /// Transient failures are expected to clear up on a later cycle.
    pub fn is_transient(&self) -> bool {
        !matches!(self, RefreshError::Malformed { .. })
    }

    pub fn notice(&self) -> StatusNotice {
        if self.is_transient() {
            StatusNotice::Stale
        } else {
            StatusNotice::Malformed
        }
    }
}
