//! Pick the primary data table out of a document.
//!
//! Every `<table>` is scored as `rows * max(cols, 1)`; the highest score among
//! tables meeting the mode's thresholds wins, first in document order on ties.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

static TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("table selector"));
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("tr selector"));
static CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td, th").expect("cell selector"));

/// Which rows count towards a table's column width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnBasis {
    /// Only rows holding at least one `td`.
    DataRows,
    /// Every row.
    AllRows,
}

/// Thresholds a table must meet to be a candidate. Both are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionMode {
    pub min_rows: usize,
    pub min_cols: usize,
    pub col_basis: ColumnBasis,
}

impl SelectionMode {
    /// Stats grids: more than five rows and more than five columns.
    pub fn stats_page() -> Self {
        Self {
            min_rows: 6,
            min_cols: 6,
            col_basis: ColumnBasis::DataRows,
        }
    }

    /// Any table with at least one row.
    pub fn any_table() -> Self {
        Self {
            min_rows: 1,
            min_cols: 0,
            col_basis: ColumnBasis::AllRows,
        }
    }

    fn accepts(&self, rows: usize, cols: usize) -> bool {
        rows >= self.min_rows && cols >= self.min_cols
    }
}

impl Default for SelectionMode {
    fn default() -> Self {
        Self::stats_page()
    }
}

/// One cell of a candidate table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    /// `th` rather than `td`.
    pub is_header: bool,
}

/// A table that won selection, read into a cell matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCandidate {
    /// Position among the document's tables.
    pub index: usize,
    pub rows: Vec<Vec<Cell>>,
    pub col_count: usize,
    pub score: usize,
}

impl TableCandidate {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Select the highest-scoring table that satisfies `mode`.
///
/// Returns `None` when the document has no tables or none qualifies.
pub fn select_table(document: &Html, mode: &SelectionMode) -> Option<TableCandidate> {
    let mut best: Option<(usize, ElementRef<'_>, usize, usize)> = None;

    for (index, table) in document.select(&TABLE).enumerate() {
        let (rows, cols) = measure(table, mode.col_basis);
        let score = rows * cols.max(1);
        debug!(index, rows, cols, score, "table candidate");

        if score == 0 || !mode.accepts(rows, cols) {
            continue;
        }
        // Strictly greater keeps the earliest table on ties.
        if best.as_ref().map_or(true, |(_, _, _, s)| score > *s) {
            best = Some((index, table, cols, score));
        }
    }

    let (index, table, col_count, score) = best?;
    Some(TableCandidate {
        index,
        rows: read_cells(table),
        col_count,
        score,
    })
}

fn measure(table: ElementRef<'_>, basis: ColumnBasis) -> (usize, usize) {
    let mut rows = 0;
    let mut cols = 0;
    for row in table.select(&ROW) {
        rows += 1;
        let counts = match basis {
            ColumnBasis::AllRows => true,
            ColumnBasis::DataRows => row.select(&CELL).any(|c| c.value().name() == "td"),
        };
        if counts {
            cols = cols.max(row.select(&CELL).count());
        }
    }
    (rows, cols)
}

fn read_cells(table: ElementRef<'_>) -> Vec<Vec<Cell>> {
    table
        .select(&ROW)
        .map(|row| {
            row.select(&CELL)
                .map(|cell| Cell {
                    text: cell.text().collect::<String>().trim().to_string(),
                    is_header: cell.value().name() == "th",
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A table with a `th` header row and `rows` data rows of `cols` cells.
    fn grid(rows: usize, cols: usize, tag: &str) -> String {
        let mut html = format!("<table class=\"{tag}\"><tr>");
        for c in 0..cols {
            html.push_str(&format!("<th>H{c}</th>"));
        }
        html.push_str("</tr>");
        for r in 0..rows {
            html.push_str("<tr>");
            for c in 0..cols {
                html.push_str(&format!("<td>{r}-{c}</td>"));
            }
            html.push_str("</tr>");
        }
        html.push_str("</table>");
        html
    }

    fn doc(tables: &[String]) -> Html {
        Html::parse_document(&format!("<html><body>{}</body></html>", tables.concat()))
    }

    #[test]
    fn test_picks_largest_qualifying_table() {
        let d = doc(&[grid(3, 3, "nav"), grid(20, 14, "stats"), grid(8, 6, "side")]);
        let chosen = select_table(&d, &SelectionMode::stats_page()).unwrap();
        assert_eq!(chosen.index, 1);
        assert_eq!(chosen.row_count(), 21);
        assert_eq!(chosen.col_count, 14);
        assert_eq!(chosen.score, 21 * 14);
    }

    #[test]
    fn test_never_picks_smaller_score() {
        let shapes = [(7, 9), (12, 6), (6, 20), (30, 2), (9, 9)];
        let tables: Vec<String> = shapes.iter().map(|(r, c)| grid(*r, *c, "t")).collect();
        let d = doc(&tables);
        let mode = SelectionMode::stats_page();
        let chosen = select_table(&d, &mode).unwrap();

        for (rows, cols) in shapes {
            let (rows, cols) = (rows + 1, cols);
            if mode.accepts(rows, cols) {
                assert!(chosen.score >= rows * cols);
            }
        }
    }

    #[test]
    fn test_tie_keeps_first_in_document_order() {
        let d = doc(&[grid(10, 8, "first"), grid(10, 8, "second")]);
        let chosen = select_table(&d, &SelectionMode::stats_page()).unwrap();
        assert_eq!(chosen.index, 0);
    }

    #[test]
    fn test_thresholds_filter_small_tables() {
        let d = doc(&[grid(3, 3, "small"), grid(10, 4, "narrow")]);
        assert!(select_table(&d, &SelectionMode::stats_page()).is_none());

        let lenient = select_table(&d, &SelectionMode::any_table()).unwrap();
        assert_eq!(lenient.index, 1);
    }

    #[test]
    fn test_no_tables() {
        let d = Html::parse_document("<html><body><div>no tables</div></body></html>");
        assert!(select_table(&d, &SelectionMode::any_table()).is_none());
    }

    #[test]
    fn test_data_row_basis_ignores_wide_header() {
        // Header spans 9 cells but data rows only have 4.
        let mut html = String::from("<table><tr>");
        for c in 0..9 {
            html.push_str(&format!("<th>{c}</th>"));
        }
        html.push_str("</tr>");
        for _ in 0..8 {
            html.push_str("<tr><td>a</td><td>b</td><td>c</td><td>d</td></tr>");
        }
        html.push_str("</table>");
        let d = doc(&[html]);

        assert!(select_table(&d, &SelectionMode::stats_page()).is_none());
        let all = select_table(&d, &SelectionMode::any_table()).unwrap();
        assert_eq!(all.col_count, 9);
    }

    #[test]
    fn test_cells_are_trimmed_and_marked() {
        let d = doc(&["<table><tr><th> Player </th></tr><tr><td>\n MS Dhoni \n</td></tr></table>"
            .to_string()]);
        let chosen = select_table(&d, &SelectionMode::any_table()).unwrap();
        assert_eq!(
            chosen.rows[0][0],
            Cell {
                text: "Player".into(),
                is_header: true
            }
        );
        assert_eq!(chosen.rows[1][0].text, "MS Dhoni");
        assert!(!chosen.rows[1][0].is_header);
    }
}
