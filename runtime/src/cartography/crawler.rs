//! Pagination crawler: follow "next page" links and aggregate table rows.

use crate::acquisition::{fetch_with_timeout, FetchError, Fetcher, RawDocument};
use crate::cartography::rate_limiter::RateLimiter;
use crate::extraction::{normalize, select_table, ExtractOptions, ExtractedTable};
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector"));
static NEXT_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)next|›|»").expect("next-link pattern"));

/// Crawl limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Leading path segments of the start URL a next link must stay under.
    pub scope_depth: usize,
    /// Hard cap on pages fetched per crawl.
    pub max_pages: Option<usize>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            scope_depth: 2,
            max_pages: None,
        }
    }
}

/// How a crawl ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlStatus {
    Done,
    /// A fetch failed; the rows gathered so far are kept in the report.
    Aborted { url: String, reason: String },
}

/// Result of one crawl.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Aggregated rows of every page, `None` if no page had a table.
    pub table: Option<ExtractedTable>,
    /// Pages fetched successfully.
    pub pages: usize,
    pub status: CrawlStatus,
    /// The chain pointed back at a page already seen.
    pub cycle_detected: bool,
    /// Every URL the crawl committed to fetching, in order.
    pub visited: Vec<String>,
}

/// Host plus path prefix that next links must stay within.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkScope {
    host: Option<String>,
    path_prefix: String,
}

impl LinkScope {
    /// Scope of `origin`: its host and its first `depth` directories.
    ///
    /// `https://host/ci/engine/stats/index.html` at depth 2 -> `/ci/engine/`.
    pub fn from_origin(origin: &Url, depth: usize) -> Self {
        let path = origin.path();
        let mut dirs: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if !path.ends_with('/') {
            dirs.pop();
        }
        dirs.truncate(depth);

        let path_prefix = if dirs.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", dirs.join("/"))
        };
        Self {
            host: origin.host_str().map(str::to_string),
            path_prefix,
        }
    }

    pub fn contains(&self, url: &Url) -> bool {
        url.host_str() == self.host.as_deref() && url.path().starts_with(&self.path_prefix)
    }
}

struct CrawlState {
    current_url: String,
    visited: HashSet<String>,
    order: Vec<String>,
    aggregated: ExtractedTable,
}

enum Phase {
    Fetching,
    Extracting(RawDocument),
    DecidingNext(Option<String>),
    Done,
    Aborted(String),
}

/// Follows a result set's pagination chain, one page at a time.
pub struct PaginationCrawler {
    fetcher: Arc<dyn Fetcher>,
    rate_limiter: Arc<RateLimiter>,
    options: ExtractOptions,
    timeout: Duration,
    config: CrawlConfig,
}

impl PaginationCrawler {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        rate_limiter: Arc<RateLimiter>,
        options: ExtractOptions,
        timeout: Duration,
        config: CrawlConfig,
    ) -> Self {
        Self {
            fetcher,
            rate_limiter,
            options,
            timeout,
            config,
        }
    }

    /// Crawl from `start_url` until the chain ends, loops, or a fetch fails.
    ///
    /// Only a lost fetch session is returned as `Err`; any other fetch failure
    /// ends the crawl with [`CrawlStatus::Aborted`].
    pub async fn crawl(&self, start_url: &str) -> Result<CrawlReport, FetchError> {
        let origin = match Url::parse(start_url) {
            Ok(url) => url,
            Err(e) => {
                warn!("invalid start URL {start_url}: {e}");
                return Ok(CrawlReport {
                    table: None,
                    pages: 0,
                    status: CrawlStatus::Aborted {
                        url: start_url.to_string(),
                        reason: format!("invalid URL: {e}"),
                    },
                    cycle_detected: false,
                    visited: Vec::new(),
                });
            }
        };
        let scope = LinkScope::from_origin(&origin, self.config.scope_depth);

        let start = origin.to_string();
        let mut state = CrawlState {
            current_url: start.clone(),
            visited: HashSet::from([start.clone()]),
            order: vec![start],
            aggregated: ExtractedTable::default(),
        };
        let mut pages = 0;
        let mut cycle_detected = false;
        let mut phase = Phase::Fetching;

        let status = loop {
            phase = match phase {
                Phase::Fetching => {
                    self.rate_limiter.acquire().await;
                    info!(page = pages + 1, url = %state.current_url, "fetching page");
                    match fetch_with_timeout(self.fetcher.as_ref(), &state.current_url, self.timeout)
                        .await
                    {
                        Ok(doc) => Phase::Extracting(doc),
                        Err(e) if e.is_fatal() => return Err(e),
                        Err(e) => {
                            warn!(url = %state.current_url, "page fetch failed: {e}");
                            Phase::Aborted(e.to_string())
                        }
                    }
                }
                Phase::Extracting(doc) => {
                    pages += 1;
                    let (table, next) = read_page(&doc, &self.options, &scope);
                    match table {
                        Some(table) => {
                            debug!(rows = table.len(), "page rows");
                            state.aggregated.append(table);
                        }
                        None => info!(url = %doc.url, "no table on page"),
                    }
                    Phase::DecidingNext(next)
                }
                Phase::DecidingNext(Some(next))
                    if next != state.current_url && !state.visited.contains(&next) =>
                {
                    if self.config.max_pages.is_some_and(|max| pages >= max) {
                        info!(pages, "page cap reached");
                        Phase::Done
                    } else {
                        state.visited.insert(next.clone());
                        state.order.push(next.clone());
                        state.current_url = next;
                        Phase::Fetching
                    }
                }
                Phase::DecidingNext(Some(next)) => {
                    debug!(url = %next, "next link already visited");
                    cycle_detected = true;
                    Phase::Done
                }
                Phase::DecidingNext(None) => Phase::Done,
                Phase::Done => break CrawlStatus::Done,
                Phase::Aborted(reason) => {
                    break CrawlStatus::Aborted {
                        url: state.current_url.clone(),
                        reason,
                    }
                }
            };
        };

        let table = (!state.aggregated.is_empty()).then_some(state.aggregated);
        Ok(CrawlReport {
            table,
            pages,
            status,
            cycle_detected,
            visited: state.order,
        })
    }
}

/// Extract the page's table and its next link in one parse.
fn read_page(
    doc: &RawDocument,
    options: &ExtractOptions,
    scope: &LinkScope,
) -> (Option<ExtractedTable>, Option<String>) {
    let document = Html::parse_document(&doc.html);
    let table = select_table(&document, &options.selection)
        .and_then(|c| normalize(&c, options.header_mode, &options.text_fields));
    let next = Url::parse(&doc.url)
        .ok()
        .and_then(|base| find_next_link(&document, &base, scope));
    (table, next)
}

/// First anchor whose text reads like "next" and whose target stays in scope.
pub fn find_next_link(document: &Html, base: &Url, scope: &LinkScope) -> Option<String> {
    document.select(&ANCHOR).find_map(|a| {
        let text: String = a.text().collect();
        if !NEXT_TEXT.is_match(&text) {
            return None;
        }
        let href = a.value().attr("href")?;
        let mut target = base.join(href).ok()?;
        target.set_fragment(None);
        scope.contains(&target).then(|| target.to_string())
    })
}
