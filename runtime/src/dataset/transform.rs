//! Post-run transforms over a consolidated dataset.
//!
//! Three stages, each usable on its own:
//! - [`clean_dataset`] applies per-category column rules (drops, renames,
//!   blank-column removal, a season column, column moves) to every table;
//! - [`aggregate_players`] folds one category's season tables into one row
//!   per player;
//! - [`merge_players`] outer-joins per-category aggregates on the player name.
//!
//! [`player_profiles`] chains the last two over a cleaned dataset.

use super::ConsolidatedDataset;
use crate::extraction::{ExtractedTable, Record};
use crate::types::{Category, ALL_PERIODS};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

static SEASON_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}").expect("season pattern"));

pub const SEASONS_PLAYED: &str = "Seasons_Played";
pub const SPAN_YEARS: &str = "Span_Years";

/// How one category's season tables fold into per-player rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateRules {
    /// Summed across seasons.
    pub sum: Vec<String>,
    /// Averaged across the seasons that have a numeric value.
    pub mean: Vec<String>,
    /// Bowling figures `W/R`; the best across seasons is kept.
    pub best_figures: Vec<String>,
    /// Scores such as `88*`; the highest is kept, not out winning ties.
    pub high_score: Vec<String>,
}

/// Column rules for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnRules {
    /// Removed before anything else.
    pub drop: Vec<String>,
    /// Old name -> new name.
    pub renames: BTreeMap<String, String>,
    /// Moved after every other column, in this order.
    pub move_to_end: Vec<String>,
    /// Appended to this category's field names that collide in the player
    /// merge. Defaults to `_<category>`.
    pub merge_suffix: Option<String>,
    pub aggregate: AggregateRules,
}

/// Transform settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub enabled: bool,
    /// Join key for aggregation and merging.
    pub player_field: String,
    /// Column added to every season table, right after the player column.
    pub season_field: String,
    /// Remove columns whose every value is blank.
    pub drop_empty_columns: bool,
    /// Rules per category; categories without rules pass through untouched.
    pub categories: BTreeMap<Category, ColumnRules>,
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn renames(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

impl Default for TransformConfig {
    fn default() -> Self {
        let batting = ColumnRules {
            drop: strings(&["col15"]),
            renames: renames(&[
                ("100", "Hundreds"),
                ("50", "Fifties"),
                ("0", "Ducks"),
                ("4s", "Fours"),
                ("6s", "Sixes"),
            ]),
            move_to_end: strings(&["Ducks", "Fifties", "Hundreds"]),
            merge_suffix: Some("_bat".into()),
            aggregate: AggregateRules {
                sum: strings(&[
                    "Mat", "Inns", "NO", "Runs", "BF", "Fours", "Sixes", "Ducks", "Fifties",
                    "Hundreds",
                ]),
                mean: strings(&["Ave", "SR"]),
                best_figures: Vec::new(),
                high_score: strings(&["HS"]),
            },
        };
        let bowling = ColumnRules {
            drop: strings(&["col14"]),
            renames: renames(&[("4", "4_Wkts"), ("5", "5_Wkts")]),
            move_to_end: strings(&["4_Wkts", "5_Wkts"]),
            merge_suffix: Some("_bowl".into()),
            aggregate: AggregateRules {
                sum: strings(&["Mat", "Inns", "Overs", "Mdns", "Runs", "Wkts", "4_Wkts", "5_Wkts"]),
                mean: strings(&["Ave", "Econ", "SR"]),
                best_figures: strings(&["BBI"]),
                high_score: Vec::new(),
            },
        };
        let fielding = ColumnRules {
            drop: strings(&["col11"]),
            renames: renames(&[
                ("Ct Wk", "Ct_Wk"),
                ("Ct Fi", "Ct_Fi"),
                ("Mat", "Mat_field"),
                ("Inns", "Inns_field"),
            ]),
            move_to_end: Vec::new(),
            merge_suffix: Some("_field".into()),
            aggregate: AggregateRules {
                sum: strings(&["Mat_field", "Inns_field", "Dis", "Ct", "St", "Ct_Wk", "Ct_Fi"]),
                ..AggregateRules::default()
            },
        };

        Self {
            enabled: true,
            player_field: "Player".into(),
            season_field: "Season".into(),
            drop_empty_columns: true,
            categories: BTreeMap::from([
                (Category::Batting, batting),
                (Category::Bowling, bowling),
                (Category::Fielding, fielding),
            ]),
        }
    }
}

/// Bowling figures: wickets taken for runs conceded.
///
/// Ordered best-last: more wickets is better, then fewer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Figures {
    pub wickets: u32,
    pub runs: u32,
}

impl Figures {
    /// Parse `W/R`. Anything else (`-`, blank) is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let (wickets, runs) = s.trim().split_once('/')?;
        Some(Self {
            wickets: wickets.trim().parse().ok()?,
            runs: runs.trim().parse().ok()?,
        })
    }
}

impl Ord for Figures {
    fn cmp(&self, other: &Self) -> Ordering {
        self.wickets
            .cmp(&other.wickets)
            .then_with(|| other.runs.cmp(&self.runs))
    }
}

impl PartialOrd for Figures {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Figures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.wickets, self.runs)
    }
}

/// `88*` -> (88, not out).
fn parse_score(s: &str) -> Option<(u32, bool)> {
    let s = s.trim();
    let not_out = s.ends_with('*');
    let runs = s.trim_end_matches('*').parse().ok()?;
    Some((runs, not_out))
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whole numbers without a fraction, everything else to two places.
fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{v:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn season_of(period: &str) -> Option<&str> {
    if period == ALL_PERIODS {
        return None;
    }
    SEASON_YEAR.find(period).map(|m| m.as_str())
}

fn span(seasons: &BTreeSet<i32>) -> String {
    match (seasons.first(), seasons.last()) {
        (Some(first), Some(last)) if first == last => first.to_string(),
        (Some(first), Some(last)) => format!("{first}-{last}"),
        _ => "-".to_string(),
    }
}

fn remove_field(table: &mut ExtractedTable, name: &str) -> bool {
    let Some(at) = table.fields.iter().position(|f| f == name) else {
        return false;
    };
    table.fields.remove(at);
    for row in &mut table.rows {
        row.remove(name);
    }
    table.text_fields.retain(|f| f != name);
    true
}

fn rename_field(table: &mut ExtractedTable, from: &str, to: &str) {
    let Some(at) = table.fields.iter().position(|f| f == from) else {
        return;
    };
    if table.fields.iter().any(|f| f == to) {
        warn!(from, to, "rename target already present, keeping the old name");
        return;
    }
    table.fields[at] = to.to_string();
    for row in &mut table.rows {
        if let Some(value) = row.remove(from) {
            row.insert(to.to_string(), value);
        }
    }
    for field in &mut table.text_fields {
        if field == from {
            *field = to.to_string();
        }
    }
}

fn move_to_end(table: &mut ExtractedTable, name: &str) {
    if let Some(at) = table.fields.iter().position(|f| f == name) {
        let field = table.fields.remove(at);
        table.fields.push(field);
    }
}

/// Add a constant column right after `anchor`, or first if `anchor` is absent.
fn insert_after(table: &mut ExtractedTable, name: &str, value: &str, anchor: &str) {
    if table.fields.iter().any(|f| f == name) {
        return;
    }
    let at = table
        .fields
        .iter()
        .position(|f| f == anchor)
        .map_or(0, |i| i + 1);
    table.fields.insert(at, name.to_string());
    for row in &mut table.rows {
        row.insert(name.to_string(), value.to_string());
    }
}

/// Apply one category's column rules to one table.
pub fn clean_table(
    table: &mut ExtractedTable,
    rules: &ColumnRules,
    season: Option<&str>,
    config: &TransformConfig,
) {
    for name in &rules.drop {
        remove_field(table, name);
    }
    for (from, to) in &rules.renames {
        rename_field(table, from, to);
    }
    if config.drop_empty_columns && !table.is_empty() {
        let blank: Vec<String> = table
            .fields
            .iter()
            .filter(|f| {
                table
                    .rows
                    .iter()
                    .all(|row| row.get(*f).map_or(true, |v| v.trim().is_empty()))
            })
            .cloned()
            .collect();
        for name in &blank {
            remove_field(table, name);
        }
    }
    if let Some(season) = season {
        insert_after(table, &config.season_field, season, &config.player_field);
    }
    for name in &rules.move_to_end {
        move_to_end(table, name);
    }
}

/// Clean every table of every category that has rules.
///
/// Season tables get the season column; `all` tables do not.
pub fn clean_dataset(dataset: &mut ConsolidatedDataset, config: &TransformConfig) {
    for (category, period, table) in dataset.tables_mut() {
        let Some(rules) = config.categories.get(category) else {
            continue;
        };
        clean_table(table, rules, season_of(period), config);
        debug!(%category, period = %period, fields = table.fields.len(), "cleaned table");
    }
}

#[derive(Default)]
struct PlayerRows<'a> {
    seasons: BTreeSet<i32>,
    rows: Vec<&'a Record>,
}

fn group_by_player<'a>(
    periods: &'a BTreeMap<String, ExtractedTable>,
    player_field: &str,
) -> BTreeMap<String, PlayerRows<'a>> {
    let mut players: BTreeMap<String, PlayerRows<'a>> = BTreeMap::new();
    for (period, table) in periods {
        let Some(season) = season_of(period) else {
            continue;
        };
        let season = season.parse::<i32>().ok();
        for row in &table.rows {
            let Some(name) = row
                .get(player_field)
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
            else {
                continue;
            };
            let entry = players.entry(name.to_string()).or_default();
            entry.seasons.extend(season);
            entry.rows.push(row);
        }
    }
    players
}

fn column<'a>(rows: &'a [&'a Record], field: &'a str) -> impl Iterator<Item = &'a String> + 'a {
    rows.iter().filter_map(move |r| r.get(field))
}

/// One row per player across every season table of a category.
///
/// Output columns: the player, `Seasons_Played`, `Span_Years`, then the rule
/// columns present in at least one season. `None` if no season table has a
/// named player.
pub fn aggregate_players(
    periods: &BTreeMap<String, ExtractedTable>,
    rules: &AggregateRules,
    player_field: &str,
) -> Option<ExtractedTable> {
    let players = group_by_player(periods, player_field);
    if players.is_empty() {
        return None;
    }

    let present: BTreeSet<&str> = periods
        .values()
        .flat_map(|t| t.fields.iter().map(String::as_str))
        .collect();
    let keep = |names: &[String]| -> Vec<String> {
        names
            .iter()
            .filter(|n| present.contains(n.as_str()))
            .cloned()
            .collect()
    };
    let sum = keep(&rules.sum);
    let mean = keep(&rules.mean);
    let best = keep(&rules.best_figures);
    let high = keep(&rules.high_score);

    let mut fields = strings(&[player_field, SEASONS_PLAYED, SPAN_YEARS]);
    fields.extend(sum.iter().chain(&mean).chain(&best).chain(&high).cloned());

    let rows = players
        .into_iter()
        .map(|(name, group)| {
            let mut record = Record::new();
            record.insert(player_field.to_string(), name);
            record.insert(SEASONS_PLAYED.to_string(), group.seasons.len().to_string());
            record.insert(SPAN_YEARS.to_string(), span(&group.seasons));

            for field in &sum {
                let total: f64 = column(&group.rows, field)
                    .filter_map(|v| parse_number(v))
                    .sum();
                record.insert(field.clone(), format_number(total));
            }
            for field in &mean {
                let nums: Vec<f64> = column(&group.rows, field)
                    .filter_map(|v| parse_number(v))
                    .collect();
                let value = if nums.is_empty() {
                    "-".to_string()
                } else {
                    format!("{:.2}", nums.iter().sum::<f64>() / nums.len() as f64)
                };
                record.insert(field.clone(), value);
            }
            for field in &best {
                let value = column(&group.rows, field)
                    .filter_map(|v| Figures::parse(v))
                    .max()
                    .map_or_else(|| "-".to_string(), |f| f.to_string());
                record.insert(field.clone(), value);
            }
            for field in &high {
                let value = column(&group.rows, field)
                    .filter_map(|v| parse_score(v).map(|score| (score, v.trim())))
                    .max_by_key(|(score, _)| *score)
                    .map_or_else(|| "-".to_string(), |(_, raw)| raw.to_string());
                record.insert(field.clone(), value);
            }
            record
        })
        .collect();

    let mut text_fields = vec![SPAN_YEARS.to_string()];
    text_fields.extend(best.iter().chain(&high).cloned());
    Some(ExtractedTable {
        fields,
        rows,
        text_fields,
        dropped_rows: 0,
    })
}

/// Outer join of `(suffix, table)` pairs on `key`, rows sorted by key.
///
/// A field already taken by an earlier table is renamed with that table's
/// suffix. Cells a player has no value for are `""`.
pub fn merge_players(tables: &[(&str, &ExtractedTable)], key: &str) -> ExtractedTable {
    let mut fields = vec![key.to_string()];
    let mut text_fields: Vec<String> = Vec::new();
    let mut merged: BTreeMap<String, Record> = BTreeMap::new();

    for (suffix, table) in tables {
        let mut mapping: BTreeMap<&str, String> = BTreeMap::new();
        for field in table.fields.iter().filter(|f| *f != key) {
            let mut name = field.clone();
            if fields.contains(&name) {
                name = format!("{field}{suffix}");
            }
            let base = name.clone();
            let mut n = 2;
            while fields.contains(&name) {
                name = format!("{base}_{n}");
                n += 1;
            }
            fields.push(name.clone());
            mapping.insert(field, name);
        }
        for field in &table.text_fields {
            if let Some(name) = mapping.get(field.as_str()) {
                text_fields.push(name.clone());
            }
        }

        for row in &table.rows {
            let Some(player) = row.get(key).map(|p| p.trim()).filter(|p| !p.is_empty()) else {
                continue;
            };
            let record = merged
                .entry(player.to_string())
                .or_insert_with(|| Record::from([(key.to_string(), player.to_string())]));
            for (field, name) in &mapping {
                if let Some(value) = row.get(*field) {
                    record.insert(name.clone(), value.clone());
                }
            }
        }
    }

    let rows = merged
        .into_values()
        .map(|mut record| {
            for field in &fields {
                record.entry(field.clone()).or_default();
            }
            record
        })
        .collect();

    ExtractedTable {
        fields,
        rows,
        text_fields,
        dropped_rows: 0,
    }
}

/// Aggregate every configured category and join the results per player.
///
/// `Seasons_Played` and `Span_Years` are computed once over the seasons a
/// player appears in across all categories.
pub fn player_profiles(
    dataset: &ConsolidatedDataset,
    config: &TransformConfig,
) -> Option<ExtractedTable> {
    let key = config.player_field.as_str();
    let mut seasons: BTreeMap<String, BTreeSet<i32>> = BTreeMap::new();
    let mut parts: Vec<(String, ExtractedTable)> = Vec::new();

    for (category, rules) in &config.categories {
        let Some(periods) = dataset.periods(category) else {
            continue;
        };
        for (player, group) in group_by_player(periods, key) {
            seasons.entry(player).or_default().extend(group.seasons);
        }
        let Some(mut table) = aggregate_players(periods, &rules.aggregate, key) else {
            continue;
        };
        remove_field(&mut table, SEASONS_PLAYED);
        remove_field(&mut table, SPAN_YEARS);
        let suffix = rules
            .merge_suffix
            .clone()
            .unwrap_or_else(|| format!("_{}", category.as_str()));
        parts.push((suffix, table));
    }
    if parts.is_empty() {
        return None;
    }

    let refs: Vec<(&str, &ExtractedTable)> =
        parts.iter().map(|(s, t)| (s.as_str(), t)).collect();
    let mut profile = merge_players(&refs, key);

    profile.fields.insert(1, SEASONS_PLAYED.to_string());
    profile.fields.insert(2, SPAN_YEARS.to_string());
    profile.text_fields.insert(0, SPAN_YEARS.to_string());
    for row in &mut profile.rows {
        let played = row.get(key).and_then(|p| seasons.get(p));
        let (count, years) = played.map_or((0, "-".to_string()), |s| (s.len(), span(s)));
        row.insert(SEASONS_PLAYED.to_string(), count.to_string());
        row.insert(SPAN_YEARS.to_string(), years);
    }
    info!(players = profile.len(), "player profiles built");
    Some(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::consolidate;
    use crate::types::ScrapeTask;

    fn table(fields: &[&str], rows: &[&[&str]]) -> ExtractedTable {
        ExtractedTable {
            fields: strings(fields),
            rows: rows
                .iter()
                .map(|r| {
                    fields
                        .iter()
                        .zip(r.iter())
                        .map(|(f, v)| (f.to_string(), v.to_string()))
                        .collect()
                })
                .collect(),
            text_fields: Vec::new(),
            dropped_rows: 0,
        }
    }

    fn bowling(rows: &[&[&str]]) -> ExtractedTable {
        table(&["Player", "Overs", "Runs", "Wkts", "BBI", "Econ"], rows)
    }

    #[test]
    fn test_figures_ordering() {
        let f = |s| Figures::parse(s).unwrap();
        assert!(f("5/21") > f("4/10"));
        assert!(f("4/10") > f("4/22"));
        assert_eq!(f(" 3/7 "), Figures { wickets: 3, runs: 7 });
        assert_eq!(Figures::parse("-"), None);
        assert_eq!(Figures::parse(""), None);

        let best = ["4/22", "5/21", "-", "4/10"]
            .iter()
            .filter_map(|s| Figures::parse(s))
            .max()
            .unwrap();
        assert_eq!(best.to_string(), "5/21");
    }

    #[test]
    fn test_clean_batting_table() {
        let config = TransformConfig::default();
        let rules = &config.categories[&Category::Batting];
        let mut t = table(
            &["Player", "Runs", "100", "50", "0", "4s", "col15", "col16"],
            &[
                &["MS Dhoni", "455", "0", "2", "1", "30", "", ""],
                &["SK Raina", "421", "1", "3", "0", "40", "x", ""],
            ],
        );

        clean_table(&mut t, rules, Some("2015"), &config);

        assert_eq!(
            t.fields,
            vec!["Player", "Season", "Runs", "Fours", "Ducks", "Fifties", "Hundreds"]
        );
        assert_eq!(t.value(1, "Hundreds"), Some("1"));
        assert_eq!(t.value(0, "Season"), Some("2015"));
        assert_eq!(t.value(0, "Fours"), Some("30"));
        assert!(t.rows.iter().all(|r| r.len() == t.fields.len()));
    }

    #[test]
    fn test_clean_dataset_skips_season_for_all_period() {
        let mut dataset = consolidate(vec![
            (
                ScrapeTask::new(Category::Fielding, 2019),
                Some(table(&["Player", "Ct Wk", "Mat"], &[&["MS Dhoni", "9", "15"]])),
            ),
            (
                ScrapeTask::unscoped(Category::Fielding),
                Some(table(&["Player", "Ct Wk"], &[&["MS Dhoni", "120"]])),
            ),
            (
                ScrapeTask::new(Category::Partnership, 2019),
                Some(table(&["Partners", "4s"], &[&["a & b", "3"]])),
            ),
        ])
        .dataset;

        clean_dataset(&mut dataset, &TransformConfig::default());

        let season = dataset.table(&Category::Fielding, "2019").unwrap();
        assert_eq!(season.fields, vec!["Player", "Season", "Ct_Wk", "Mat_field"]);
        let all = dataset.table(&Category::Fielding, "all").unwrap();
        assert_eq!(all.fields, vec!["Player", "Ct_Wk"]);
        let untouched = dataset.table(&Category::Partnership, "2019").unwrap();
        assert_eq!(untouched.fields, vec!["Partners", "4s"]);
    }

    #[test]
    fn test_aggregate_bowling_across_seasons() {
        let periods = BTreeMap::from([
            (
                "2015".to_string(),
                bowling(&[
                    &["DJ Bravo", "50.2", "420", "26", "4/22", "8.34"],
                    &["R Ashwin", "52", "340", "10", "3/14", "6.53"],
                ]),
            ),
            (
                "2016".to_string(),
                bowling(&[&["DJ Bravo", "40", "300", "14", "5/21", "7.50"]]),
            ),
            ("all".to_string(), bowling(&[&["Ignored", "1", "1", "1", "9/1", "1"]])),
        ]);
        let rules = &TransformConfig::default().categories[&Category::Bowling].aggregate;

        let agg = aggregate_players(&periods, rules, "Player").unwrap();

        assert_eq!(
            agg.fields,
            vec!["Player", "Seasons_Played", "Span_Years", "Overs", "Runs", "Wkts", "Econ", "BBI"]
        );
        assert_eq!(agg.len(), 2);
        assert_eq!(agg.value(0, "Player"), Some("DJ Bravo"));
        assert_eq!(agg.value(0, "Wkts"), Some("40"));
        assert_eq!(agg.value(0, "Runs"), Some("720"));
        assert_eq!(agg.value(0, "Overs"), Some("90.2"));
        assert_eq!(agg.value(0, "Econ"), Some("7.92"));
        assert_eq!(agg.value(0, "BBI"), Some("5/21"));
        assert_eq!(agg.value(0, "Seasons_Played"), Some("2"));
        assert_eq!(agg.value(0, "Span_Years"), Some("2015-2016"));
        assert_eq!(agg.value(1, "Span_Years"), Some("2015"));
        assert!(agg.text_fields.contains(&"BBI".to_string()));
    }

    #[test]
    fn test_high_score_prefers_not_out_on_ties() {
        let periods = BTreeMap::from([
            (
                "2010".to_string(),
                table(&["Player", "HS", "Ave"], &[&["M Vijay", "88", "30.5"]]),
            ),
            (
                "2011".to_string(),
                table(&["Player", "HS", "Ave"], &[&["M Vijay", "88*", "-"]]),
            ),
            (
                "2012".to_string(),
                table(&["Player", "HS", "Ave"], &[&["M Vijay", "74", "20.5"]]),
            ),
        ]);
        let rules = AggregateRules {
            mean: strings(&["Ave"]),
            high_score: strings(&["HS"]),
            ..AggregateRules::default()
        };
        let agg = aggregate_players(&periods, &rules, "Player").unwrap();
        assert_eq!(agg.value(0, "HS"), Some("88*"));
        assert_eq!(agg.value(0, "Ave"), Some("25.50"));
    }

    #[test]
    fn test_merge_is_outer_join_with_suffixes() {
        let bat = table(&["Player", "Runs"], &[&["MS Dhoni", "455"], &["F du Plessis", "396"]]);
        let bowl = table(
            &["Player", "Runs", "Wkts"],
            &[&["DJ Bravo", "420", "26"], &["MS Dhoni", "0", "0"]],
        );

        let merged = merge_players(&[("_bat", &bat), ("_bowl", &bowl)], "Player");

        assert_eq!(merged.fields, vec!["Player", "Runs", "Runs_bowl", "Wkts"]);
        let players: Vec<_> = merged.rows.iter().map(|r| r["Player"].as_str()).collect();
        assert_eq!(players, vec!["DJ Bravo", "F du Plessis", "MS Dhoni"]);
        assert_eq!(merged.value(0, "Runs"), Some(""));
        assert_eq!(merged.value(0, "Runs_bowl"), Some("420"));
        assert_eq!(merged.value(2, "Runs"), Some("455"));
        assert_eq!(merged.value(1, "Wkts"), Some(""));
    }

    #[test]
    fn test_player_profiles_span_all_categories() {
        let mut dataset = consolidate(vec![
            (
                ScrapeTask::new(Category::Batting, 2018),
                Some(table(&["Player", "Runs", "HS"], &[&["SR Watson", "555", "117*"]])),
            ),
            (
                ScrapeTask::new(Category::Bowling, 2019),
                Some(bowling(&[&["SR Watson", "10", "90", "3", "2/29", "9.00"]])),
            ),
            (
                ScrapeTask::new(Category::Fielding, 2020),
                Some(table(&["Player", "Mat", "Ct"], &[&["SR Watson", "11", "4"]])),
            ),
        ])
        .dataset;
        let config = TransformConfig::default();
        clean_dataset(&mut dataset, &config);

        let profile = player_profiles(&dataset, &config).unwrap();

        assert_eq!(profile.len(), 1);
        assert_eq!(&profile.fields[..3], &["Player", "Seasons_Played", "Span_Years"]);
        assert_eq!(profile.value(0, "Seasons_Played"), Some("3"));
        assert_eq!(profile.value(0, "Span_Years"), Some("2018-2020"));
        assert_eq!(profile.value(0, "Runs"), Some("555"));
        assert_eq!(profile.value(0, "Runs_bowl"), Some("90"));
        assert_eq!(profile.value(0, "HS"), Some("117*"));
        assert_eq!(profile.value(0, "Mat_field"), Some("11"));
        assert!(!profile.fields.iter().any(|f| f == "Season"));
    }
}
