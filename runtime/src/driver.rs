//! Task driver: runs scrape tasks in order and collects their outcomes.
//!
//! Periodic tasks walk the URL variants until one yields rows. Paginated tasks
//! hand their start URL to the crawler. Tasks run strictly one after another
//! against the single shared fetcher.

use crate::acquisition::{fetch_with_timeout, FetchError, Fetcher};
use crate::cartography::crawler::{CrawlStatus, PaginationCrawler};
use crate::cartography::rate_limiter::RateLimiter;
use crate::cartography::url_variants::{UrlVariantResolver, VariantKind};
use crate::config::{Config, RecordSource, SeasonPlan};
use crate::dataset::{consolidate, Consolidation};
use crate::extraction::{extract_table, ExtractOptions, ExtractedTable};
use crate::types::ScrapeTask;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// One unit of scheduled work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Resolve URL variants for a (category, period) task.
    Periodic(ScrapeTask),
    /// Crawl a result list from a fixed start URL.
    Paginated { task: ScrapeTask, start_url: String },
}

impl Job {
    pub fn task(&self) -> &ScrapeTask {
        match self {
            Job::Periodic(task) | Job::Paginated { task, .. } => task,
        }
    }

    /// Season jobs, season by season, every category within a season.
    pub fn seasons(plan: &SeasonPlan) -> Vec<Job> {
        (plan.start..=plan.end)
            .flat_map(|season| {
                plan.categories
                    .iter()
                    .map(move |category| Job::Periodic(ScrapeTask::new(category.clone(), season)))
            })
            .collect()
    }

    /// One paginated job per record source.
    pub fn records(sources: &[RecordSource]) -> Vec<Job> {
        sources
            .iter()
            .map(|source| Job::Paginated {
                task: ScrapeTask::unscoped(source.category.clone()),
                start_url: source.url.clone(),
            })
            .collect()
    }
}

/// What happened to one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Rows were found. `variant` is `None` for crawled tasks.
    Extracted {
        url: String,
        variant: Option<VariantKind>,
        rows: usize,
    },
    /// Every candidate was fetched but none held a table with rows.
    NoData { attempted: Vec<String> },
    /// No usable page could be fetched.
    Aborted { url: String, reason: String },
}

impl TaskOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            TaskOutcome::Extracted { .. } => "extracted",
            TaskOutcome::NoData { .. } => "no_data",
            TaskOutcome::Aborted { .. } => "aborted",
        }
    }
}

/// A task, its outcome, and the table it produced.
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub task: ScrapeTask,
    pub outcome: TaskOutcome,
    /// Moved into the dataset by [`Driver::run`].
    pub table: Option<ExtractedTable>,
    pub elapsed: Duration,
}

/// Everything a run produced.
#[derive(Debug)]
pub struct RunReport {
    /// One entry per completed job, in job order. Tables have been moved out.
    pub results: Vec<TaskResult>,
    pub consolidation: Consolidation,
    /// Set when the fetch session died; jobs after that point never ran.
    pub fatal: Option<FetchError>,
}

impl RunReport {
    pub fn count(&self, label: &str) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome.label() == label)
            .count()
    }
}

/// Runs jobs sequentially against one fetcher.
pub struct Driver {
    fetcher: Arc<dyn Fetcher>,
    resolver: UrlVariantResolver,
    periodic: ExtractOptions,
    crawler: PaginationCrawler,
    rate_limiter: Arc<RateLimiter>,
    fetch_timeout: Duration,
}

impl Driver {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: &Config) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(config.pacing.clone()));
        let fetch_timeout = Duration::from_millis(config.fetch.timeout_ms);
        let crawler = PaginationCrawler::new(
            fetcher.clone(),
            rate_limiter.clone(),
            config.extraction.paginated.clone(),
            fetch_timeout,
            config.crawl.clone(),
        );
        Self {
            fetcher,
            resolver: UrlVariantResolver::new(config.template.clone()),
            periodic: config.extraction.periodic.clone(),
            crawler,
            rate_limiter,
            fetch_timeout,
        }
    }

    /// Try each URL variant in order; the first non-empty table wins.
    ///
    /// Fails only when the fetch session itself is lost.
    pub async fn run_periodic(&self, task: &ScrapeTask) -> Result<TaskResult, FetchError> {
        let started = Instant::now();
        let mut attempted = Vec::new();
        let mut fetched_any = false;
        let mut last_error = None;

        for variant in self.resolver.resolve(task) {
            self.rate_limiter.acquire().await;
            info!(task = %task, kind = ?variant.kind, url = %variant.url, "trying variant");
            attempted.push(variant.url.clone());

            let doc = match fetch_with_timeout(self.fetcher.as_ref(), &variant.url, self.fetch_timeout)
                .await
            {
                Ok(doc) => doc,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(task = %task, url = %variant.url, "fetch failed: {e}");
                    last_error = Some((variant.url, e.to_string()));
                    continue;
                }
            };
            fetched_any = true;

            match extract_table(&doc.html, &self.periodic) {
                Some(table) if !table.is_empty() => {
                    info!(task = %task, rows = table.len(), kind = ?variant.kind, "extracted");
                    return Ok(TaskResult {
                        task: task.clone(),
                        outcome: TaskOutcome::Extracted {
                            url: variant.url,
                            variant: Some(variant.kind),
                            rows: table.len(),
                        },
                        table: Some(table),
                        elapsed: started.elapsed(),
                    });
                }
                _ => info!(task = %task, kind = ?variant.kind, "no table for variant"),
            }
        }

        let outcome = match last_error {
            Some((url, reason)) if !fetched_any => TaskOutcome::Aborted { url, reason },
            _ => {
                warn!(task = %task, "no data for period");
                TaskOutcome::NoData { attempted }
            }
        };
        Ok(TaskResult {
            task: task.clone(),
            outcome,
            table: None,
            elapsed: started.elapsed(),
        })
    }

    /// Crawl a paginated result list into one table.
    ///
    /// Rows from an aborted crawl are discarded so partial lists never reach
    /// the dataset.
    pub async fn run_paginated(
        &self,
        task: &ScrapeTask,
        start_url: &str,
    ) -> Result<TaskResult, FetchError> {
        let started = Instant::now();
        info!(task = %task, url = %start_url, "crawling");
        let report = self.crawler.crawl(start_url).await?;
        if report.cycle_detected {
            info!(task = %task, pages = report.pages, "pagination looped back, stopping");
        }

        let (outcome, table) = match (report.status, report.table) {
            (CrawlStatus::Aborted { url, reason }, _) => {
                warn!(task = %task, url = %url, "crawl aborted: {reason}");
                (TaskOutcome::Aborted { url, reason }, None)
            }
            (CrawlStatus::Done, Some(table)) => {
                info!(task = %task, rows = table.len(), pages = report.pages, "aggregated");
                (
                    TaskOutcome::Extracted {
                        url: start_url.to_string(),
                        variant: None,
                        rows: table.len(),
                    },
                    Some(table),
                )
            }
            (CrawlStatus::Done, None) => {
                warn!(task = %task, "no rows on any page");
                (
                    TaskOutcome::NoData {
                        attempted: report.visited,
                    },
                    None,
                )
            }
        };

        Ok(TaskResult {
            task: task.clone(),
            outcome,
            table,
            elapsed: started.elapsed(),
        })
    }

    pub async fn run_job(&self, job: &Job) -> Result<TaskResult, FetchError> {
        match job {
            Job::Periodic(task) => self.run_periodic(task).await,
            Job::Paginated { task, start_url } => self.run_paginated(task, start_url).await,
        }
    }

    /// Run every job in order, then consolidate.
    ///
    /// Stops early only if the fetch session dies. Jobs finished before that
    /// still reach the report and the dataset.
    pub async fn run(&self, jobs: &[Job]) -> RunReport {
        let mut results = Vec::with_capacity(jobs.len());
        let mut tables = Vec::with_capacity(jobs.len());
        let mut fatal = None;

        for (i, job) in jobs.iter().enumerate() {
            if i > 0 {
                self.rate_limiter.pause_between_tasks().await;
            }
            match self.run_job(job).await {
                Ok(mut result) => {
                    tables.push((result.task.clone(), result.table.take()));
                    results.push(result);
                }
                Err(e) => {
                    error!(
                        task = %job.task(),
                        completed = results.len(),
                        remaining = jobs.len() - i,
                        "fetch session lost: {e}"
                    );
                    fatal = Some(e);
                    break;
                }
            }
        }

        RunReport {
            results,
            consolidation: consolidate(tables),
            fatal,
        }
    }
}
