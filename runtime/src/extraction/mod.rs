//! Table extraction: pick the data table out of a page and normalize its rows.
//!
//! A page usually carries several tables (navigation, filters, the stats grid
//! itself). [`selector`] scores them and keeps the biggest one that clears the
//! caller's thresholds; [`normalizer`] turns the chosen cell matrix into a
//! header plus keyed records.

pub mod normalizer;
pub mod selector;

use scraper::Html;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

pub use normalizer::{normalize, HeaderMode};
pub use selector::{select_table, Cell, ColumnBasis, SelectionMode, TableCandidate};

/// One normalized data row: field name -> cell text.
pub type Record = BTreeMap<String, String>;

/// A normalized table: ordered field names plus one record per data row.
///
/// Every record holds exactly the keys in `fields`; missing cells are `""`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedTable {
    /// Distinct field names in column order.
    pub fields: Vec<String>,
    /// Data rows keyed by field name.
    pub rows: Vec<Record>,
    /// Fields whose values must be written as literal text by exporters.
    pub text_fields: Vec<String>,
    /// Rows discarded for having the wrong number of cells.
    pub dropped_rows: usize,
}

impl ExtractedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `field` in row `row`, if both exist.
    pub fn value(&self, row: usize, field: &str) -> Option<&str> {
        self.rows.get(row)?.get(field).map(String::as_str)
    }

    /// Append another page's rows.
    ///
    /// Same schema concatenates. A diverging schema is re-keyed by field name:
    /// unseen fields are appended after the existing ones and every row is
    /// padded with `""` so the key-set invariant keeps holding.
    pub fn append(&mut self, other: ExtractedTable) {
        if self.fields.is_empty() {
            let dropped = self.dropped_rows;
            *self = other;
            self.dropped_rows += dropped;
            return;
        }

        if other.fields != self.fields {
            let added: Vec<String> = other
                .fields
                .iter()
                .filter(|f| !self.fields.contains(f))
                .cloned()
                .collect();
            for row in &mut self.rows {
                for field in &added {
                    row.insert(field.clone(), String::new());
                }
            }
            self.fields.extend(added);
        }

        for mut row in other.rows {
            for field in &self.fields {
                row.entry(field.clone()).or_default();
            }
            self.rows.push(row);
        }

        for field in other.text_fields {
            if !self.text_fields.contains(&field) {
                self.text_fields.push(field);
            }
        }
        self.dropped_rows += other.dropped_rows;
    }
}

// Rows are written as objects whose keys follow `fields`, not map order.
impl Serialize for ExtractedTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<OrderedRecord<'_>> = self
            .rows
            .iter()
            .map(|record| OrderedRecord {
                fields: &self.fields,
                record,
            })
            .collect();

        let mut state = serializer.serialize_struct("ExtractedTable", 3)?;
        state.serialize_field("fields", &self.fields)?;
        state.serialize_field("text_fields", &self.text_fields)?;
        state.serialize_field("rows", &rows)?;
        state.end()
    }
}

struct OrderedRecord<'a> {
    fields: &'a [String],
    record: &'a Record,
}

impl Serialize for OrderedRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in self.fields {
            let value = self.record.get(field).map(String::as_str).unwrap_or("");
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

/// How to pick and read the table on one kind of page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    pub selection: SelectionMode,
    pub header_mode: HeaderMode,
    /// Field names (case-insensitive) whose values stay literal text.
    pub text_fields: Vec<String>,
}

impl ExtractOptions {
    /// Season stats pages: a large grid with a `th` header row.
    pub fn stats_page() -> Self {
        Self {
            selection: SelectionMode::stats_page(),
            header_mode: HeaderMode::Marked,
            text_fields: vec!["BBI".to_string()],
        }
    }

    /// Record lists: take the biggest table, first row is the header.
    pub fn any_table() -> Self {
        Self {
            selection: SelectionMode::any_table(),
            header_mode: HeaderMode::FirstRow,
            text_fields: Vec::new(),
        }
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::stats_page()
    }
}

/// Parse `html`, select the primary table and normalize it.
///
/// `None` means the page had no qualifying table or nothing survived
/// normalization; callers treat that as "no data", not as a failure.
pub fn extract_table(html: &str, options: &ExtractOptions) -> Option<ExtractedTable> {
    let document = Html::parse_document(html);
    let candidate = select_table(&document, &options.selection)?;
    normalize(&candidate, options.header_mode, &options.text_fields)
}
