//! Feed source implementations for fetching sensor snapshots.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDateTime;
use reqwest::Client;
use tracing::{debug, info, instrument};

use sensor_common::{SensorError, SensorResult};

/// Trait for sources that can serve a raw feed snapshot.
///
/// `since` is the most recent timestamp already persisted; the source is
/// expected to return readings after it. No retry happens here — retry
/// policy belongs to the caller.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, since: Option<NaiveDateTime>) -> SensorResult<Bytes>;
}

/// HTTP feed source returning the wide CSV export.
pub struct HttpFeedSource {
    client: Client,
    base_url: String,
}

impl HttpFeedSource {
    pub fn new(base_url: &str, timeout: Duration) -> SensorResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SensorError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Request URL for a snapshot, with the `since` window when known.
    pub fn snapshot_url(&self, since: Option<NaiveDateTime>) -> String {
        match since {
            Some(ts) => format!(
                "{}?since={}",
                self.base_url,
                ts.format("%Y-%m-%dT%H:%M:%S")
            ),
            None => self.base_url.clone(),
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    #[instrument(skip(self))]
    async fn fetch(&self, since: Option<NaiveDateTime>) -> SensorResult<Bytes> {
        let url = self.snapshot_url(since);

        debug!(url = %url, "Fetching feed snapshot");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SensorError::Network(format!("Feed request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SensorError::Network(format!(
                "Feed returned status {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SensorError::Network(format!("Feed body read failed: {}", e)))?;

        info!(size = bytes.len(), "Fetched feed snapshot");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_snapshot_url_without_window() {
        let source =
            HttpFeedSource::new("https://feed.example.com/export/", Duration::from_secs(5))
                .unwrap();
        assert_eq!(source.snapshot_url(None), "https://feed.example.com/export");
    }

    #[test]
    fn test_snapshot_url_with_since_window() {
        let source =
            HttpFeedSource::new("https://feed.example.com/export", Duration::from_secs(5))
                .unwrap();
        let since = NaiveDate::from_ymd_opt(2020, 1, 6)
            .unwrap()
            .and_hms_opt(0, 30, 0)
            .unwrap();
        assert_eq!(
            source.snapshot_url(Some(since)),
            "https://feed.example.com/export?since=2020-01-06T00:30:00"
        );
    }
}
