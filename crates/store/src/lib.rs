//! # gsheet-store
//!
//! Treats each tab of a spreadsheet as a table of records.
//!
//! Rows are read through a [`SheetsTransport`], the first row of a tab is its
//! header row, and every row below it becomes a [`Record`] keyed by header.
//! Writes are translated back into A1 ranges: record `i` lives on spreadsheet
//! row `i + 2`.
//!
//! ```
//! use gsheet_core::MemoryTransport;
//! use gsheet_store::SheetRecordStore;
//! use std::sync::Arc;
//!
//! let transport = MemoryTransport::new().with_sheet("Gelirler", vec![vec!["Tarih", "Tutar"]]);
//! let _store = SheetRecordStore::new(Arc::new(transport));
//! ```

mod view;

pub use view::SheetView;

use futures::future::join_all;
use gsheet_core::a1;
use gsheet_core::model::column_of;
use gsheet_core::{
    BatchReply, BatchRequest, LedgerEntry, Record, SheetData, SheetInfo, SheetsTransport,
    StoreError, StoreResult, Template,
};
use std::sync::Arc;

/// Record-level access to one spreadsheet.
#[derive(Clone)]
pub struct SheetRecordStore {
    transport: Arc<dyn SheetsTransport>,
}

impl SheetRecordStore {
    /// Create a store over `transport`.
    pub fn new(transport: Arc<dyn SheetsTransport>) -> Self {
        SheetRecordStore { transport }
    }

    /// Every tab with its header row, as of the time of the call.
    ///
    /// Header rows are fetched concurrently.
    pub async fn list_sheets(&self) -> StoreResult<Vec<SheetInfo>> {
        let properties = self.transport.spreadsheet_metadata().await?;

        let header_reads = properties
            .iter()
            .map(|p| async move { self.transport.get_values(&a1::header_range(&p.title)).await });
        let header_rows = join_all(header_reads).await;

        properties
            .into_iter()
            .zip(header_rows)
            .map(|(p, rows)| {
                let headers = rows?.into_iter().next().unwrap_or_default();
                Ok(SheetInfo {
                    sheet_id: p.sheet_id,
                    title: p.title,
                    index: p.index,
                    headers,
                })
            })
            .collect()
    }

    /// [`Self::list_sheets`] for presentation code: any failure, including
    /// a missing credential, is logged and yields an empty list.
    pub async fn list_sheets_or_empty(&self) -> Vec<SheetInfo> {
        match self.list_sheets().await {
            Ok(sheets) => sheets,
            Err(e) => {
                tracing::warn!("listing sheets failed, showing none: {e}");
                Vec::new()
            }
        }
    }

    /// Header row and records of `sheet_name`.
    pub async fn get_sheet_data(&self, sheet_name: &str) -> StoreResult<SheetData> {
        let rows = self
            .transport
            .get_values(&a1::sheet_range(sheet_name))
            .await?;
        let data = SheetData::from_rows(rows);
        tracing::debug!(
            sheet = sheet_name,
            records = data.records.len(),
            "loaded sheet data"
        );
        Ok(data)
    }

    /// Sheet data together with its canonical column mapping.
    pub async fn get_sheet_view(&self, sheet_name: &str) -> StoreResult<SheetView> {
        Ok(SheetView::new(self.get_sheet_data(sheet_name).await?))
    }

    /// Append a ledger row (date, description, amount, type, category) after
    /// the last row of `sheet_name`, whatever the sheet's own headers are.
    pub async fn append_record(&self, sheet_name: &str, entry: &LedgerEntry) -> StoreResult<()> {
        let range = a1::columns_range(sheet_name, 0, LedgerEntry::WIDTH - 1)?;
        self.append_row(&range, entry.to_row()).await
    }

    /// Write `record`'s values into the record at `row_index`, each under the
    /// header of the same name.
    ///
    /// The write spans column A through the right-most header `record`
    /// names. Cells inside that span that `record` does not name are
    /// rewritten with their current contents, and cells to the right are not
    /// touched. Keys that are not headers of the sheet are rejected.
    pub async fn update_record(
        &self,
        sheet_name: &str,
        row_index: usize,
        record: &Record,
    ) -> StoreResult<()> {
        if record.is_empty() {
            return Err(StoreError::invalid_input("record has no values to write"));
        }

        let headers = self
            .transport
            .get_values(&a1::header_range(sheet_name))
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();
        let cells = record
            .values
            .iter()
            .map(|(header, value)| {
                column_of(&headers, header)
                    .map(|col| (col, value))
                    .ok_or_else(|| {
                        StoreError::invalid_input(format!(
                            "'{header}' is not a column of {sheet_name}"
                        ))
                    })
            })
            .collect::<StoreResult<Vec<_>>>()?;

        let width = cells.iter().map(|(col, _)| col + 1).max().unwrap_or(1);
        let range = a1::record_range(sheet_name, row_index, width)?;

        let mut row = if cells.len() < width {
            self.transport
                .get_values(&range)
                .await?
                .into_iter()
                .next()
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        row.resize(width, String::new());
        for (col, value) in cells {
            row[col].clone_from(value);
        }

        tracing::debug!(sheet = sheet_name, row_index, %range, "updating record");
        self.transport.update_values(&range, vec![row]).await
    }

    /// Create a tab and, when `headers` is non-empty, write them as its
    /// first row.
    pub async fn create_sheet(&self, name: &str, headers: &[String]) -> StoreResult<SheetInfo> {
        if name.trim().is_empty() {
            return Err(StoreError::invalid_input("sheet name must not be empty"));
        }

        let replies = self
            .transport
            .batch_update(vec![BatchRequest::AddSheet {
                title: name.to_string(),
            }])
            .await?;
        let properties = match replies.into_iter().next() {
            Some(BatchReply::AddSheet(properties)) => properties,
            _ => {
                return Err(StoreError::transport(
                    "addSheet reply carried no sheet properties",
                ))
            }
        };

        if !headers.is_empty() {
            let range = a1::cell_range(name, 0, 1)?;
            self.append_row(&range, headers.to_vec()).await?;
        }

        tracing::info!(sheet = name, sheet_id = properties.sheet_id, "created sheet");
        Ok(SheetInfo {
            sheet_id: properties.sheet_id,
            title: properties.title,
            index: properties.index,
            headers: headers.to_vec(),
        })
    }

    /// [`Self::create_sheet`] with a template's header row.
    pub async fn create_sheet_from_template(
        &self,
        name: &str,
        template: Template,
    ) -> StoreResult<SheetInfo> {
        self.create_sheet(name, &template.header_row()).await
    }

    /// Remove the tab with numeric id `sheet_id`.
    pub async fn delete_sheet(&self, sheet_id: i64) -> StoreResult<()> {
        self.transport
            .batch_update(vec![BatchRequest::DeleteSheet { sheet_id }])
            .await?;
        tracing::info!(sheet_id, "deleted sheet");
        Ok(())
    }

    async fn append_row(&self, range: &str, row: Vec<String>) -> StoreResult<()> {
        self.transport.append_values(range, vec![row]).await
    }
}
