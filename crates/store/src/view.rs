//! Sheet data read through its canonical column mapping.

use gsheet_core::{Record, SheetData};
use gsheet_mapping::{ColumnMapping, FieldKey};
use std::collections::BTreeMap;

/// Sheet data paired with the canonical mapping of its header row.
#[derive(Debug, Clone)]
pub struct SheetView {
    data: SheetData,
    mapping: ColumnMapping,
}

impl SheetView {
    pub fn new(data: SheetData) -> Self {
        let mapping = ColumnMapping::from_headers(&data.headers);
        SheetView { data, mapping }
    }

    pub fn data(&self) -> &SheetData {
        &self.data
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn records(&self) -> &[Record] {
        &self.data.records
    }

    /// Value of `key` in the record at `row_index`.
    pub fn field(&self, row_index: usize, key: FieldKey) -> Option<&str> {
        let record = self.data.record(row_index)?;
        self.mapping.read_record(&self.data.headers, record, key)
    }

    /// Every mapped field of the record at `row_index`.
    pub fn fields(&self, row_index: usize) -> Option<BTreeMap<FieldKey, String>> {
        let record = self.data.record(row_index)?;
        Some(
            self.mapping
                .iter()
                .filter_map(|(key, index)| {
                    let header = self.data.headers.get(index)?;
                    Some((key, record.get(header).unwrap_or_default().to_string()))
                })
                .collect(),
        )
    }

    pub fn into_data(self) -> SheetData {
        self.data
    }
}
