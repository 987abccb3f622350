//! Turn a selected cell matrix into field names and keyed records.

use super::selector::{Cell, TableCandidate};
use super::{ExtractedTable, Record};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Where the header row comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMode {
    /// First row holding `th` cells; data rows are the later rows with `td`.
    #[default]
    Marked,
    /// First non-empty row, whatever its cells are.
    FirstRow,
}

/// Normalize a candidate table.
///
/// Data rows whose cell count is within one of the header width are kept,
/// padded with `""` or truncated to fit; any other row is dropped and counted.
/// Values of fields named in `text_fields` (case-insensitive) are trimmed and
/// the fields are recorded in [`ExtractedTable::text_fields`].
///
/// Returns `None` if no header is found or no data row survives.
pub fn normalize(
    candidate: &TableCandidate,
    header_mode: HeaderMode,
    text_fields: &[String],
) -> Option<ExtractedTable> {
    let (header, data) = split_rows(&candidate.rows, header_mode)?;
    if header.is_empty() {
        return None;
    }
    let fields = field_names(header);

    let mut rows = Vec::new();
    let mut dropped = 0;
    for cells in data {
        if cells.is_empty() {
            continue;
        }
        if cells.len().abs_diff(fields.len()) > 1 {
            dropped += 1;
            continue;
        }
        let record: Record = fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.clone(), cells.get(i).cloned().unwrap_or_default()))
            .collect();
        rows.push(record);
    }

    if dropped > 0 {
        debug!(dropped, width = fields.len(), "dropped malformed rows");
    }
    if rows.is_empty() {
        return None;
    }

    let mut table = ExtractedTable {
        fields,
        rows,
        text_fields: Vec::new(),
        dropped_rows: dropped,
    };
    pin_text_fields(&mut table, text_fields);
    Some(table)
}

fn split_rows(rows: &[Vec<Cell>], mode: HeaderMode) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    match mode {
        HeaderMode::Marked => {
            let at = rows
                .iter()
                .position(|row| row.iter().any(|c| c.is_header))?;
            let header = rows[at].iter().map(|c| c.text.clone()).collect();
            let data = rows[at + 1..]
                .iter()
                .filter(|row| row.iter().any(|c| !c.is_header))
                .map(|row| {
                    row.iter()
                        .filter(|c| !c.is_header)
                        .map(|c| c.text.clone())
                        .collect()
                })
                .collect();
            Some((header, data))
        }
        HeaderMode::FirstRow => {
            let mut non_empty = rows
                .iter()
                .filter(|row| !row.is_empty())
                .map(|row| row.iter().map(|c| c.text.clone()).collect::<Vec<_>>());
            let header = non_empty.next()?;
            Some((header, non_empty.collect()))
        }
    }
}

/// Blank names become `colN` (1-based); repeats get a `_2`, `_3`, ... suffix.
fn field_names(header: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    header
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let base = if name.trim().is_empty() {
                format!("col{}", i + 1)
            } else {
                name.trim().to_string()
            };
            let mut candidate = base.clone();
            let mut n = 2;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{base}_{n}");
                n += 1;
            }
            candidate
        })
        .collect()
}

fn pin_text_fields(table: &mut ExtractedTable, names: &[String]) {
    let pinned: Vec<String> = table
        .fields
        .iter()
        .filter(|field| names.iter().any(|n| n.eq_ignore_ascii_case(field)))
        .cloned()
        .collect();

    for field in &pinned {
        for row in &mut table.rows {
            if let Some(value) = row.get_mut(field) {
                let trimmed = value.trim();
                if trimmed.len() != value.len() {
                    *value = trimmed.to_string();
                }
            }
        }
    }
    table.text_fields = pinned;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn th(text: &str) -> Cell {
        Cell {
            text: text.to_string(),
            is_header: true,
        }
    }

    fn td(text: &str) -> Cell {
        Cell {
            text: text.to_string(),
            is_header: false,
        }
    }

    fn candidate(rows: Vec<Vec<Cell>>) -> TableCandidate {
        let col_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        TableCandidate {
            index: 0,
            score: rows.len() * col_count.max(1),
            rows,
            col_count,
        }
    }

    fn header(n: usize) -> Vec<Cell> {
        (0..n).map(|i| th(&format!("F{i}"))).collect()
    }

    fn data(n: usize) -> Vec<Cell> {
        (0..n).map(|i| td(&format!("v{i}"))).collect()
    }

    #[test]
    fn test_tolerance_law() {
        let c = candidate(vec![header(8), data(8), data(9), data(7), data(6), data(10)]);
        let table = normalize(&c, HeaderMode::Marked, &[]).unwrap();

        assert_eq!(table.fields.len(), 8);
        assert_eq!(table.len(), 3);
        assert_eq!(table.dropped_rows, 2);
        // 9 cells truncated to 8.
        assert_eq!(table.value(1, "F7"), Some("v7"));
        assert!(!table.rows[1].values().any(|v| v == "v8"));
        // 7 cells padded.
        assert_eq!(table.value(2, "F7"), Some(""));
        for row in &table.rows {
            assert_eq!(row.len(), 8);
        }
    }

    #[test]
    fn test_blank_and_duplicate_fields() {
        let c = candidate(vec![
            vec![th("Player"), th(""), th("Runs"), th("Runs"), th(" ")],
            data(5),
        ]);
        let table = normalize(&c, HeaderMode::Marked, &[]).unwrap();
        assert_eq!(table.fields, vec!["Player", "col2", "Runs", "Runs_2", "col5"]);
    }

    #[test]
    fn test_marked_header_skips_leading_rows() {
        let c = candidate(vec![
            vec![td("Records / Chennai Super Kings")],
            header(3),
            data(3),
            vec![th("sub"), th("total")],
        ]);
        let table = normalize(&c, HeaderMode::Marked, &[]).unwrap();
        assert_eq!(table.fields, vec!["F0", "F1", "F2"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_marked_without_header_cells() {
        let c = candidate(vec![data(4), data(4)]);
        assert!(normalize(&c, HeaderMode::Marked, &[]).is_none());
    }

    #[test]
    fn test_first_row_header() {
        let c = candidate(vec![
            vec![],
            vec![td("Team"), td("Result")],
            vec![th("CSK"), td("won")],
        ]);
        let table = normalize(&c, HeaderMode::FirstRow, &[]).unwrap();
        assert_eq!(table.fields, vec!["Team", "Result"]);
        assert_eq!(table.value(0, "Team"), Some("CSK"));
    }

    #[test]
    fn test_no_surviving_rows() {
        let c = candidate(vec![header(8), data(3), data(12)]);
        assert!(normalize(&c, HeaderMode::Marked, &[]).is_none());
    }

    #[test]
    fn test_text_field_keeps_literal_value() {
        let c = candidate(vec![
            vec![th("Player"), th("Wkts"), th("BBI")],
            vec![td("R Ashwin"), td("20"), td(" 5/21 ")],
        ]);
        let table = normalize(&c, HeaderMode::Marked, &["bbi".to_string()]).unwrap();

        assert_eq!(table.value(0, "BBI"), Some("5/21"));
        assert_eq!(table.text_fields, vec!["BBI"]);
    }

    #[test]
    fn test_text_fields_are_configurable() {
        let c = candidate(vec![
            vec![th("Player"), th("BBM"), th("BBI")],
            vec![td("R Jadeja"), td("4/16"), td("3/10")],
        ]);
        let table = normalize(&c, HeaderMode::Marked, &["BBM".to_string()]).unwrap();
        assert_eq!(table.text_fields, vec!["BBM"]);
    }
}
