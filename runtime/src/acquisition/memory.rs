//! In-memory fetcher serving canned pages.
//!
//! Used to replay saved pages offline and to drive the crawler and driver in
//! tests without a network.

use super::fetcher::{FetchError, Fetcher, RawDocument};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Canned failure for a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Timeout,
    Status(u16),
    SessionClosed,
}

#[derive(Debug, Clone)]
enum Response {
    Page(String),
    Fail(Failure),
}

/// Serves pages from a URL -> HTML map and records every request.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    responses: HashMap<String, Response>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.responses.insert(url.into(), Response::Page(html.into()));
        self
    }

    pub fn with_failure(mut self, url: impl Into<String>, failure: Failure) -> Self {
        self.responses.insert(url.into(), Response::Fail(failure));
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<RawDocument, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        match self.responses.get(url) {
            Some(Response::Page(html)) => Ok(RawDocument::new(url, html.clone())),
            Some(Response::Fail(Failure::Timeout)) => Err(FetchError::Timeout(timeout)),
            Some(Response::Fail(Failure::Status(code))) => Err(FetchError::Status(*code)),
            Some(Response::Fail(Failure::SessionClosed)) => {
                Err(FetchError::SessionClosed("browser crashed".into()))
            }
            None => Err(FetchError::Status(404)),
        }
    }
}
