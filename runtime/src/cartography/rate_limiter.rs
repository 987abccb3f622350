//! Request pacing for polite crawling.
//!
//! A minimum gap (plus random jitter) between consecutive requests and a
//! pause between tasks. `settle_ms` is applied by the fetcher itself, after
//! the load event and before the page is read.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Pacing settings, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Wait after a page has loaded before reading it.
    pub settle_ms: u64,
    /// Minimum gap between two requests.
    pub min_delay_ms: u64,
    /// Upper bound of the random extra added to `min_delay_ms`.
    pub jitter_ms: u64,
    /// Pause between two tasks.
    pub task_pause_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            settle_ms: 1000,
            min_delay_ms: 1000,
            jitter_ms: 1000,
            task_pause_ms: 1500,
        }
    }
}

impl PacingConfig {
    /// No waiting at all.
    pub fn none() -> Self {
        Self {
            settle_ms: 0,
            min_delay_ms: 0,
            jitter_ms: 0,
            task_pause_ms: 0,
        }
    }
}

/// Generate a random delay between min_ms and max_ms.
pub fn random_delay(min_ms: u64, max_ms: u64) -> Duration {
    if max_ms <= min_ms {
        return Duration::from_millis(min_ms);
    }
    let ms = rand::thread_rng().gen_range(min_ms..=max_ms);
    Duration::from_millis(ms)
}

/// Enforces the pacing waits. Shared by the driver and the crawler.
pub struct RateLimiter {
    config: PacingConfig,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(config: PacingConfig) -> Self {
        Self {
            config,
            last_request: Mutex::new(None),
        }
    }

    /// Wait until the next request may go out. The first request is immediate.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(at) = *last {
            let gap = random_delay(
                self.config.min_delay_ms,
                self.config.min_delay_ms + self.config.jitter_ms,
            );
            let elapsed = at.elapsed();
            if elapsed < gap {
                tokio::time::sleep(gap - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Pause between two tasks.
    pub async fn pause_between_tasks(&self) {
        sleep_ms(self.config.task_pause_ms).await;
    }
}

async fn sleep_ms(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
