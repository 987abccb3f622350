//! `statscrawl seasons|records|run`: execute a job list and export the dataset.

use crate::acquisition::browser::BrowserOptions;
use crate::acquisition::{BrowserFetcher, Fetcher, HttpClient};
use crate::audit::AuditLogger;
use crate::cli::output::{self, Styled};
use crate::config::Config;
use crate::dataset::{clean_dataset, player_profiles, ConsolidatedDataset};
use crate::driver::{Driver, Job};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Where the results of a run go.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Dataset JSON destination; stdout when `None`.
    pub out: Option<PathBuf>,
    /// Per-player profile JSON destination; skipped when `None`.
    pub players: Option<PathBuf>,
    /// Audit log path; the default log when `None`.
    pub audit_log: Option<PathBuf>,
    pub no_audit: bool,
    pub quiet: bool,
}

enum Session {
    Http(Arc<HttpClient>),
    Browser(Arc<BrowserFetcher>),
}

impl Session {
    async fn open(config: &Config) -> Result<Self> {
        if config.fetch.browser {
            let fetcher = BrowserFetcher::launch(BrowserOptions {
                executable: config.fetch.chrome_path.clone(),
                user_agent: config.fetch.user_agent.clone(),
                settle: Duration::from_millis(config.pacing.settle_ms),
            })
            .await
            .context("failed to start headless browser")?;
            Ok(Session::Browser(Arc::new(fetcher)))
        } else {
            let client =
                HttpClient::new(&config.fetch.user_agent).context("failed to build HTTP client")?;
            Ok(Session::Http(Arc::new(client)))
        }
    }

    fn fetcher(&self) -> Arc<dyn Fetcher> {
        match self {
            Session::Http(client) => client.clone() as Arc<dyn Fetcher>,
            Session::Browser(browser) => browser.clone(),
        }
    }

    async fn close(self) {
        if let Session::Browser(browser) = self {
            browser.close().await;
        }
    }
}

/// Run the jobs, write the audit trail, and export the dataset.
pub async fn run(config: &Config, jobs: Vec<Job>, options: &RunOptions) -> Result<()> {
    let s = Styled::new();
    let start = Instant::now();
    if !options.quiet {
        output::print_header(&s);
        eprintln!("  Running {} tasks...", jobs.len());
        eprintln!();
    }

    let mut audit = if options.no_audit {
        None
    } else {
        Some(match &options.audit_log {
            Some(path) => AuditLogger::open(path)?,
            None => AuditLogger::default_logger()?,
        })
    };

    let session = Session::open(config).await?;
    let driver = Driver::new(session.fetcher(), config);
    let report = driver.run(&jobs).await;
    session.close().await;

    if let Some(audit) = audit.as_mut() {
        for result in &report.results {
            audit
                .log_result(result)
                .context("failed to write audit event")?;
        }
    }

    let dataset = export_dataset(&report.consolidation.dataset, config);
    match &options.out {
        Some(path) => write_json(path, &dataset, "dataset")?,
        None => println!("{}", serde_json::to_string_pretty(&dataset)?),
    }
    if let Some(path) = &options.players {
        match player_profiles(&report.consolidation.dataset, &config.transform) {
            Some(profiles) => write_json(path, &profiles, "player profiles")?,
            None => warn!("no player tables to aggregate"),
        }
    }

    if !options.quiet {
        output::print_summary(&s, &report, start.elapsed().as_secs());
    }
    match report.fatal {
        Some(e) => Err(anyhow!(e).context(format!(
            "fetch session lost after {} of {} tasks",
            report.results.len(),
            jobs.len()
        ))),
        None => Ok(()),
    }
}

/// The dataset as exported: cleaned per category when transforms are enabled.
fn export_dataset(dataset: &ConsolidatedDataset, config: &Config) -> ConsolidatedDataset {
    let mut dataset = dataset.clone();
    if config.transform.enabled {
        clean_dataset(&mut dataset, &config.transform);
    }
    dataset
}

fn write_json(path: &Path, value: &impl Serialize, what: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write {what}: {}", path.display()))?;
    info!(path = %path.display(), "{what} written");
    Ok(())
}
