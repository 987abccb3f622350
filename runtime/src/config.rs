//! Run configuration.
//!
//! Every component receives its settings from a [`Config`] value at
//! construction. Defaults reproduce the Chennai Super Kings IPL run
//! (team 4343, seasons 2007–2025). A JSON file may override any subset.

use crate::acquisition::http_client::DEFAULT_USER_AGENT;
use crate::cartography::crawler::CrawlConfig;
use crate::cartography::rate_limiter::PacingConfig;
use crate::cartography::url_variants::UrlTemplate;
use crate::dataset::TransformConfig;
use crate::extraction::ExtractOptions;
use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Extraction settings per page kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Season stats pages reached through URL variants.
    pub periodic: ExtractOptions,
    /// Paginated record lists.
    pub paginated: ExtractOptions,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            periodic: ExtractOptions::stats_page(),
            paginated: ExtractOptions::any_table(),
        }
    }
}

/// Fetch settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_ms: u64,
    pub user_agent: String,
    /// Render pages in headless Chrome instead of plain HTTP.
    pub browser: bool,
    pub chrome_path: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            browser: false,
            chrome_path: None,
        }
    }
}

/// Seasons and categories for periodic tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonPlan {
    pub start: i32,
    pub end: i32,
    pub categories: Vec<Category>,
}

impl Default for SeasonPlan {
    fn default() -> Self {
        Self {
            start: 2007,
            end: 2025,
            categories: vec![Category::Batting, Category::Bowling, Category::Fielding],
        }
    }
}

/// A paginated record list and the category it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSource {
    pub category: Category,
    pub url: String,
}

fn default_records() -> Vec<RecordSource> {
    vec![
        RecordSource {
            category: Category::TeamResults,
            url: "https://stats.espncricinfo.com/ci/engine/team/335974.html?class=6;\
                  home_or_away=1;home_or_away=2;home_or_away=3;result=1;result=2;result=3;\
                  result=5;template=results;type=team;view=results"
                .to_string(),
        },
        RecordSource {
            category: Category::Partnership,
            url: "https://stats.espncricinfo.com/ci/engine/stats/index.html?class=6;\
                  home_or_away=1;home_or_away=2;home_or_away=3;home_or_away=4;result=1;\
                  result=2;result=3;result=5;spanmin1=13+mar+2008;spanval1=span;team=4343;\
                  template=results;type=fow"
                .to_string(),
        },
    ]
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub template: UrlTemplate,
    pub extraction: ExtractionConfig,
    pub pacing: PacingConfig,
    pub fetch: FetchConfig,
    pub crawl: CrawlConfig,
    pub seasons: SeasonPlan,
    pub records: Vec<RecordSource>,
    /// Column cleanup and per-player aggregation applied on export.
    pub transform: TransformConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: UrlTemplate::default(),
            extraction: ExtractionConfig::default(),
            pacing: PacingConfig::default(),
            fetch: FetchConfig::default(),
            crawl: CrawlConfig::default(),
            seasons: SeasonPlan::default(),
            records: default_records(),
            transform: TransformConfig::default(),
        }
    }
}

impl Config {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `~/.statscrawl/config.json`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".statscrawl")
            .join("config.json")
    }

    /// Load `path` if given, else the default file if it exists, else defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::load(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
