//! Group extracted tables by category and period.
//!
//! Pure grouping: values pass through untouched. A category that ends up with
//! no non-empty table is left out of the dataset and reported instead.

use crate::extraction::ExtractedTable;
use crate::types::{Category, ScrapeTask};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// category -> period key -> table. Only non-empty tables are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConsolidatedDataset {
    categories: BTreeMap<Category, BTreeMap<String, ExtractedTable>>,
}

impl ConsolidatedDataset {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.keys()
    }

    pub fn contains(&self, category: &Category) -> bool {
        self.categories.contains_key(category)
    }

    /// All period tables of one category.
    pub fn periods(&self, category: &Category) -> Option<&BTreeMap<String, ExtractedTable>> {
        self.categories.get(category)
    }

    pub fn table(&self, category: &Category, period_key: &str) -> Option<&ExtractedTable> {
        self.categories.get(category)?.get(period_key)
    }

    /// Total rows across every table.
    pub fn total_rows(&self) -> usize {
        self.categories
            .values()
            .flat_map(BTreeMap::values)
            .map(ExtractedTable::len)
            .sum()
    }

    /// Every table with its category and period key, mutably.
    pub fn tables_mut(
        &mut self,
    ) -> impl Iterator<Item = (&Category, &String, &mut ExtractedTable)> {
        self.categories.iter_mut().flat_map(|(category, periods)| {
            periods
                .iter_mut()
                .map(move |(period, table)| (category, period, table))
        })
    }

    pub fn into_inner(self) -> BTreeMap<Category, BTreeMap<String, ExtractedTable>> {
        self.categories
    }
}

/// Output of [`consolidate`].
#[derive(Debug, Clone, Default)]
pub struct Consolidation {
    pub dataset: ConsolidatedDataset,
    /// Categories seen in the input that produced no rows at all.
    pub empty_categories: Vec<Category>,
}

/// Group task results into a dataset.
///
/// The first table for a (category, period) pair wins; later duplicates are
/// logged and discarded.
pub fn consolidate<I>(results: I) -> Consolidation
where
    I: IntoIterator<Item = (ScrapeTask, Option<ExtractedTable>)>,
{
    let mut seen = BTreeSet::new();
    let mut categories: BTreeMap<Category, BTreeMap<String, ExtractedTable>> = BTreeMap::new();

    for (task, table) in results {
        seen.insert(task.category.clone());
        let Some(table) = table.filter(|t| !t.is_empty()) else {
            continue;
        };

        let periods = categories.entry(task.category.clone()).or_default();
        let key = task.period_key();
        if periods.contains_key(&key) {
            warn!(task = %task, "duplicate result for period, keeping the first");
            continue;
        }
        periods.insert(key, table);
    }

    let empty_categories: Vec<Category> = seen
        .into_iter()
        .filter(|c| !categories.contains_key(c))
        .collect();
    for category in &empty_categories {
        warn!(%category, "no data for category");
    }
    for (category, periods) in &categories {
        info!(%category, periods = periods.len(), "consolidated");
    }

    Consolidation {
        dataset: ConsolidatedDataset { categories },
        empty_categories,
    }
}
