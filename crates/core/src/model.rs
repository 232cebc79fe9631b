//! Sheets, records and the fixed ledger row layout.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One tab of the spreadsheet, functioning as a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetInfo {
    /// Numeric tab identifier, required for deletion.
    pub sheet_id: i64,
    /// Display name, used in every range.
    pub title: String,
    /// Position of the tab within the spreadsheet.
    pub index: usize,
    /// Raw header row, empty for a blank tab.
    pub headers: Vec<String>,
}

/// One data row of a sheet, keyed by header.
///
/// The row index is the record's only identity: record `i` is the `i`-th row
/// below the header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "rowIndex")]
    pub row_index: usize,
    #[serde(flatten)]
    pub values: IndexMap<String, String>,
}

impl Record {
    /// Create an empty record at `row_index`.
    pub fn new(row_index: usize) -> Self {
        Record {
            row_index,
            values: IndexMap::new(),
        }
    }

    /// Build a record from a raw row. Missing trailing cells become empty
    /// strings and cells beyond the header width are dropped. When two
    /// headers are identical the later cell wins.
    pub fn from_row(row_index: usize, headers: &[String], row: &[String]) -> Self {
        let values = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.clone(), row.get(i).cloned().unwrap_or_default()))
            .collect();
        Record { row_index, values }
    }

    /// Build a record from `(header, value)` pairs, keeping their order.
    pub fn from_pairs<K, V>(row_index: usize, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Record {
            row_index,
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value for `header`, if the record has that key.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.values.get(header).map(String::as_str)
    }

    /// Set `header` to `value`, appending the key if it is new.
    pub fn set(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.values.insert(header.into(), value.into());
    }

    /// Overlay `other`'s values: existing keys are overwritten in place and
    /// new keys are appended. The row index is left unchanged.
    pub fn merge(&mut self, other: &Record) {
        for (header, value) in &other.values {
            self.values.insert(header.clone(), value.clone());
        }
    }

    /// Cell values in key order, as written to the spreadsheet.
    pub fn to_row(&self) -> Vec<String> {
        self.values.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Headers plus records of one sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetData {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl SheetData {
    /// Split raw rows into the header row and keyed records.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let mut rows = rows.into_iter();
        let Some(headers) = rows.next() else {
            return SheetData::default();
        };
        let records = rows
            .enumerate()
            .map(|(i, row)| Record::from_row(i, &headers, &row))
            .collect();
        SheetData { headers, records }
    }

    /// Record at `row_index`, if present.
    pub fn record(&self, row_index: usize) -> Option<&Record> {
        self.records.get(row_index)
    }

    /// Apply `update`'s values to the record at `row_index` the way a
    /// re-read would see them after a keyed write: each value lands under the
    /// header of the same name and every other cell keeps its contents. Keys
    /// that are not headers are ignored. Missing records up to `row_index`
    /// are created empty.
    pub fn apply_record(&mut self, row_index: usize, update: &Record) {
        while self.records.len() <= row_index {
            let next = self.next_record(&[]);
            self.records.push(next);
        }
        let record = &mut self.records[row_index];
        for (header, value) in &update.values {
            if self.headers.contains(header) {
                record.set(header.clone(), value.clone());
            }
        }
    }

    /// Column position of `header`. With duplicate headers the last one
    /// wins, matching [`Record::from_row`].
    pub fn column_of(&self, header: &str) -> Option<usize> {
        column_of(&self.headers, header)
    }

    /// Build the record a positional row would become when appended after
    /// the current records.
    pub fn next_record(&self, row: &[String]) -> Record {
        Record::from_row(self.records.len(), &self.headers, row)
    }
}

/// Column position of `header` within `headers`, the last one winning when
/// a header repeats.
pub fn column_of(headers: &[String], header: &str) -> Option<usize> {
    headers.iter().rposition(|h| h == header)
}

/// The fixed five-column income/expense row layout used by appends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub date: String,
    pub description: String,
    pub amount: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
}

impl LedgerEntry {
    /// Number of columns an entry occupies.
    pub const WIDTH: usize = 5;

    /// Positional cells: date, description, amount, type, category.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date.clone(),
            self.description.clone(),
            self.amount.clone(),
            self.kind.clone(),
            self.category.clone(),
        ]
    }
}
