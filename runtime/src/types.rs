//! Core task types: record categories, periods and scrape tasks.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Kind of statistics table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Batting,
    Bowling,
    Fielding,
    TeamResults,
    Partnership,
    /// Any other `type=` value the site understands.
    Custom(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Batting => "batting",
            Category::Bowling => "bowling",
            Category::Fielding => "fielding",
            Category::TeamResults => "team_results",
            Category::Partnership => "partnership",
            Category::Custom(name) => name,
        }
    }

    /// Value of the `type=` query parameter for this category.
    pub fn query_type(&self) -> &str {
        match self {
            Category::TeamResults => "team",
            Category::Partnership => "fow",
            other => other.as_str(),
        }
    }
}

impl FromStr for Category {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Ok(match name.as_str() {
            "batting" => Category::Batting,
            "bowling" => Category::Bowling,
            "fielding" => Category::Fielding,
            "team_results" | "team" => Category::TeamResults,
            "partnership" | "fow" => Category::Partnership,
            _ => Category::Custom(name),
        })
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(category) => category,
            Err(never) => match never {},
        }
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A season: a calendar year, or a free-form identifier such as `2009/10`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Period {
    Year(i32),
    Label(String),
}

impl Period {
    /// `2015` -> `"16"`: last two digits of the following year. `None` for
    /// labels and for a year with no successor.
    pub fn next_year_suffix(&self) -> Option<String> {
        match self {
            Period::Year(y) => Some(format!("{:02}", y.checked_add(1)?.rem_euclid(100))),
            Period::Label(_) => None,
        }
    }
}

impl FromStr for Period {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<i32>() {
            Ok(year) => Period::Year(year),
            Err(_) => Period::Label(s.to_string()),
        })
    }
}

impl From<i32> for Period {
    fn from(year: i32) -> Self {
        Period::Year(year)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Year(y) => write!(f, "{y}"),
            Period::Label(s) => f.write_str(s),
        }
    }
}

/// Key used for period-less tasks in the consolidated dataset.
pub const ALL_PERIODS: &str = "all";

/// One unit of work: a category, optionally scoped to a period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScrapeTask {
    pub category: Category,
    pub period: Option<Period>,
}

impl ScrapeTask {
    pub fn new(category: Category, period: impl Into<Period>) -> Self {
        Self {
            category,
            period: Some(period.into()),
        }
    }

    pub fn unscoped(category: Category) -> Self {
        Self {
            category,
            period: None,
        }
    }

    pub fn period_key(&self) -> String {
        self.period
            .as_ref()
            .map_or_else(|| ALL_PERIODS.to_string(), Period::to_string)
    }
}

impl fmt::Display for ScrapeTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.period {
            Some(p) => write!(f, "{} {p}", self.category),
            None => write!(f, "{}", self.category),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_and_query_type() {
        assert_eq!("Batting".parse::<Category>().unwrap(), Category::Batting);
        assert_eq!("fow".parse::<Category>().unwrap(), Category::Partnership);
        assert_eq!(Category::Partnership.query_type(), "fow");
        assert_eq!(Category::TeamResults.query_type(), "team");
        assert_eq!(
            "aggregate".parse::<Category>().unwrap(),
            Category::Custom("aggregate".into())
        );
    }

    #[test]
    fn test_category_serde_as_string() {
        let json = serde_json::to_string(&Category::TeamResults).unwrap();
        assert_eq!(json, "\"team_results\"");
        let back: Category = serde_json::from_str("\"fielding\"").unwrap();
        assert_eq!(back, Category::Fielding);
    }

    #[test]
    fn test_period_suffix() {
        assert_eq!(Period::Year(2015).next_year_suffix().as_deref(), Some("16"));
        assert_eq!(Period::Year(2099).next_year_suffix().as_deref(), Some("00"));
        assert_eq!(Period::Label("2009/10".into()).next_year_suffix(), None);
        assert_eq!(Period::Year(i32::MAX).next_year_suffix(), None);
        assert_eq!(Period::Year(-1).next_year_suffix().as_deref(), Some("00"));
    }

    #[test]
    fn test_period_key() {
        assert_eq!(ScrapeTask::new(Category::Batting, 2015).period_key(), "2015");
        assert_eq!(ScrapeTask::unscoped(Category::Partnership).period_key(), "all");
    }
}
