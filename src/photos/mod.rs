//! Upstream photo record client
//!
//! Provides:
//! - Single record fetch with status and shape checks
//! - Ordered fan-out/fan-in over several endpoints

use std::time::Duration;

use futures_util::future::try_join_all;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::Config;

/// Default endpoints queried by a freshly mounted feed
pub const DEFAULT_ENDPOINTS: [&str; 2] = [
    "https://jsonplaceholder.typicode.com/photos/1",
    "https://jsonplaceholder.typicode.com/photos/2",
];

/// A remote photo record. Only `url` is required; other fields are kept unvalidated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub url: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Failure kinds of the aggregate fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Error fetching image")]
    Status { url: String, status: StatusCode },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid JSON body: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("malformed image record: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Coarse classification of a [`FetchError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Status,
    Transport,
    Parse,
    Malformed,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Status { .. } => FetchErrorKind::Status,
            FetchError::Transport(_) => FetchErrorKind::Transport,
            FetchError::Parse(_) => FetchErrorKind::Parse,
            FetchError::Malformed(_) => FetchErrorKind::Malformed,
        }
    }
}

/// HTTP client for photo records
#[derive(Debug, Clone)]
pub struct PhotoClient {
    client: Client,
}

impl PhotoClient {
    /// Create a client honoring the configured request timeout (none by default)
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Fetch and decode one record
    pub async fn fetch_record(&self, url: &str) -> Result<ImageRecord, FetchError> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Photo endpoint error: {} - {}", url, status);
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await?;
        let value: serde_json::Value = serde_json::from_slice(&body)?;

        serde_json::from_value(value).map_err(FetchError::Malformed)
    }

    /// Fetch every endpoint concurrently and collect the `url` fields.
    ///
    /// The result follows `endpoints` order. The first failure aborts the rest.
    pub async fn fetch_urls(&self, endpoints: &[String]) -> Result<Vec<String>, FetchError> {
        let records = try_join_all(endpoints.iter().map(|url| self.fetch_record(url))).await?;

        Ok(records.into_iter().map(|record| record.url).collect())
    }
}
