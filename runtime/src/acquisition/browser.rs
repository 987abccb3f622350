//! Headless Chrome fetcher using chromiumoxide.
//!
//! One browser and one tab are launched up front and reused for every fetch.
//! The tab sits behind a mutex, so only one caller drives it at a time.

use super::fetcher::{FetchError, Fetcher, RawDocument};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Launch options for [`BrowserFetcher`].
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Chrome binary; `None` lets chromiumoxide search the usual locations.
    pub executable: Option<PathBuf>,
    pub user_agent: String,
    /// Extra wait after the load event for late XHR-filled tables.
    pub settle: Duration,
}

/// Fetcher that renders pages in a shared headless tab.
pub struct BrowserFetcher {
    browser: Mutex<Browser>,
    page: Mutex<Page>,
    handle: JoinHandle<()>,
    settle: Duration,
}

impl BrowserFetcher {
    /// Launch a headless browser and open the tab used for all fetches.
    pub async fn launch(options: BrowserOptions) -> Result<Self, FetchError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-extensions")
            .arg("--mute-audio")
            .arg(format!("--user-agent={}", options.user_agent))
            .window_size(1920, 1080);
        if let Some(path) = &options.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| FetchError::SessionClosed(format!("browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::SessionClosed(format!("launching browser: {e}")))?;

        // The handler drives the CDP connection and must keep running.
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler: {e}");
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::SessionClosed(format!("opening tab: {e}")))?;

        info!("headless browser ready");
        Ok(Self {
            browser: Mutex::new(browser),
            page: Mutex::new(page),
            handle,
            settle: options.settle,
        })
    }

    async fn load(&self, page: &Page, url: &str) -> Result<RawDocument, FetchError> {
        page.goto(url)
            .await
            .map_err(|e| self.classify(format!("navigating to {url}: {e}")))?;
        // Network idle: wait for any navigation still in flight, then settle.
        page.wait_for_navigation()
            .await
            .map_err(|e| self.classify(format!("waiting for {url}: {e}")))?;
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        let html = page
            .content()
            .await
            .map_err(|e| self.classify(format!("reading {url}: {e}")))?;
        let final_url = page.url().await.ok().flatten().unwrap_or_else(|| url.to_string());
        Ok(RawDocument::new(final_url, html))
    }

    fn classify(&self, message: String) -> FetchError {
        if self.handle.is_finished() {
            FetchError::SessionClosed(message)
        } else {
            FetchError::Network(message)
        }
    }

    /// Close the browser and stop its handler task.
    ///
    /// A failed close is logged; the handler is stopped either way.
    pub async fn close(&self) {
        match close_result(self.browser.lock().await.close().await) {
            Ok(()) => debug!("headless browser closed"),
            Err(e) => warn!("{e}"),
        }
        self.handle.abort();
    }
}

fn close_result<T, E: std::fmt::Display>(result: Result<T, E>) -> Result<(), FetchError> {
    result
        .map(|_| ())
        .map_err(|e| FetchError::Network(format!("closing browser: {e}")))
}

#[async_trait]
impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<RawDocument, FetchError> {
        if self.handle.is_finished() {
            return Err(FetchError::SessionClosed("browser handler exited".into()));
        }
        let page = self.page.lock().await;
        match tokio::time::timeout(timeout, self.load(&page, url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(timeout)),
        }
    }
}
