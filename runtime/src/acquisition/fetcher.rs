//! Fetch collaborator contract.

use async_trait::async_trait;
use std::time::Duration;

/// Rendered HTML plus the URL it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub url: String,
    pub html: String,
}

impl RawDocument {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

/// Why a fetch did not produce a document.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Network(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The shared browser/session is gone; nothing further can be fetched.
    #[error("fetch session closed: {0}")]
    SessionClosed(String),
}

impl FetchError {
    /// Only a dead session ends the run; everything else aborts one attempt.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FetchError::SessionClosed(_))
    }
}

/// Loads a page and returns its HTML.
///
/// Implementations are driven by one caller at a time; the driver never
/// issues concurrent fetches.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<RawDocument, FetchError>;
}

/// Run `fetcher.fetch` under a hard deadline.
///
/// Fetchers are asked to respect `timeout` themselves; this is the outer
/// bound in case one does not.
pub async fn fetch_with_timeout(
    fetcher: &dyn Fetcher,
    url: &str,
    timeout: Duration,
) -> Result<RawDocument, FetchError> {
    match tokio::time::timeout(timeout, fetcher.fetch(url, timeout)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(timeout)),
    }
}
