//! Plain HTTP fetcher backed by reqwest.
//!
//! Enough for Statsguru result pages, which are server-rendered. Use
//! [`super::BrowserFetcher`] when a page needs JavaScript to fill its tables.

use super::fetcher::{FetchError, Fetcher, RawDocument};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Desktop browser user agent; the stats site serves a stripped page to bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// HTTP client for fetching result pages.
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Network(format!("building HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// GET `url` and return the page. Non-2xx responses are errors.
    ///
    /// The document carries the URL after redirects, so relative links on it
    /// resolve against the page actually served.
    pub async fn get(&self, url: &str, timeout_ms: u64) -> Result<RawDocument, FetchError> {
        let resp = self
            .client
            .get(url)
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await
            .map_err(|e| request_error(e, timeout_ms))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let final_url = resp.url().to_string();
        if final_url != url {
            debug!(from = %url, to = %final_url, "followed redirect");
        }
        let body = resp.text().await.map_err(|e| request_error(e, timeout_ms))?;
        Ok(RawDocument::new(final_url, body))
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<RawDocument, FetchError> {
        self.get(url, timeout.as_millis() as u64).await
    }
}

fn request_error(e: reqwest::Error, timeout_ms: u64) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(Duration::from_millis(timeout_ms))
    } else {
        FetchError::Network(e.to_string())
    }
}
