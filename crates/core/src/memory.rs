//! In-process spreadsheet implementing [`SheetsTransport`].
//!
//! Follows the spreadsheet service's value semantics closely enough to run
//! the record store without network access: appends land after the last
//! non-empty row, updates overwrite exactly the addressed cells, and reads
//! drop trailing empty cells. Failures can be injected for tests.

use crate::a1::A1Range;
use crate::error::{StoreError, StoreResult};
use crate::transport::{BatchReply, BatchRequest, SheetProperties, SheetsTransport};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct MemorySheet {
    properties: SheetProperties,
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Default)]
struct Inner {
    sheets: Vec<MemorySheet>,
    next_sheet_id: i64,
    write_log: Vec<String>,
    fail_writes: usize,
}

/// A spreadsheet held in memory.
#[derive(Debug)]
pub struct MemoryTransport {
    inner: Mutex<Inner>,
    authorized: AtomicBool,
    write_delay_ms: AtomicU64,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    /// Create an empty, authorized spreadsheet.
    pub fn new() -> Self {
        MemoryTransport {
            inner: Mutex::new(Inner::default()),
            authorized: AtomicBool::new(true),
            write_delay_ms: AtomicU64::new(0),
        }
    }

    /// Add a tab holding `rows` (header row first).
    #[must_use]
    pub fn with_sheet(mut self, title: &str, rows: Vec<Vec<&str>>) -> Self {
        {
            let inner = self.inner.get_mut();
            let sheet_id = inner.next_sheet_id;
            inner.next_sheet_id += 1;
            let index = inner.sheets.len();
            inner.sheets.push(MemorySheet {
                properties: SheetProperties {
                    sheet_id,
                    title: title.to_string(),
                    index,
                },
                rows: rows
                    .into_iter()
                    .map(|row| row.into_iter().map(str::to_string).collect())
                    .collect(),
            });
        }
        self
    }

    /// A spreadsheet holding a short ledger (`Gelirler`) and a project list
    /// (`Proje Takip`), for running the front ends without credentials.
    pub fn sample() -> Self {
        Self::new()
            .with_sheet(
                "Gelirler",
                vec![
                    vec!["Tarih", "Açıklama", "Tutar", "Tür", "Kategori"],
                    vec!["2024-01-05", "Hakediş 1", "100000", "Gelir", "Proje"],
                    vec!["2024-02-01", "Ofis kirası", "15000", "Gider", "Ofis"],
                    vec!["2024-02-03", "Çimento", "42000", "Gider", "Malzeme"],
                ],
            )
            .with_sheet(
                "Proje Takip",
                vec![
                    vec![
                        "Proje Adı",
                        "Proje Kodu",
                        "Proje Türü",
                        "Lokasyon",
                        "İşveren",
                        "Yüklenici",
                        "Müşavir",
                        "Durum",
                    ],
                    vec![
                        "GUEST HOUSE",
                        "GH",
                        "KAMU BİNASI",
                        "BAĞDAT",
                        "IRAK HÜKUNETİ",
                        "GÖRKEM İNŞAAT",
                        "Firma1",
                        "Devam Ediyor",
                    ],
                ],
            )
    }

    /// Toggle credential validity. While unauthorized every call fails with
    /// `AuthRequired`.
    pub fn set_authorized(&self, authorized: bool) {
        self.authorized.store(authorized, Ordering::SeqCst);
    }

    /// Make the next `count` write calls fail with a transport error.
    pub async fn fail_next_writes(&self, count: usize) {
        self.inner.lock().await.fail_writes = count;
    }

    /// Delay every write call by `delay` before it takes effect.
    pub fn set_write_delay(&self, delay: Duration) {
        self.write_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Raw rows of a tab, header row included.
    pub async fn rows(&self, title: &str) -> Option<Vec<Vec<String>>> {
        let inner = self.inner.lock().await;
        inner
            .sheets
            .iter()
            .find(|s| s.properties.title == title)
            .map(|s| s.rows.clone())
    }

    /// Ranges targeted by successful value writes, in order.
    pub async fn write_log(&self) -> Vec<String> {
        self.inner.lock().await.write_log.clone()
    }

    fn check_auth(&self) -> StoreResult<()> {
        if self.authorized.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::AuthRequired)
        }
    }

    async fn before_write(&self) -> StoreResult<()> {
        self.check_auth()?;
        let delay = self.write_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        let mut inner = self.inner.lock().await;
        if inner.fail_writes > 0 {
            inner.fail_writes -= 1;
            return Err(StoreError::transport("injected write failure"));
        }
        Ok(())
    }
}

impl Inner {
    fn sheet_mut(&mut self, range: &A1Range) -> StoreResult<&mut MemorySheet> {
        self.sheets
            .iter_mut()
            .find(|s| s.properties.title == range.sheet)
            .ok_or_else(|| StoreError::not_found(format!("Unable to parse range: {range}")))
    }
}

fn write_cells(grid: &mut Vec<Vec<String>>, top: usize, left: usize, rows: Vec<Vec<String>>) {
    for (r, row) in rows.into_iter().enumerate() {
        let target_row = top + r;
        if grid.len() <= target_row {
            grid.resize_with(target_row + 1, Vec::new);
        }
        let cells = &mut grid[target_row];
        for (c, value) in row.into_iter().enumerate() {
            let target_col = left + c;
            if cells.len() <= target_col {
                cells.resize(target_col + 1, String::new());
            }
            cells[target_col] = value;
        }
    }
}

fn trim_trailing_empty(mut rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    for row in &mut rows {
        while row.last().is_some_and(String::is_empty) {
            row.pop();
        }
    }
    while rows.last().is_some_and(Vec::is_empty) {
        rows.pop();
    }
    rows
}

#[async_trait]
impl SheetsTransport for MemoryTransport {
    async fn spreadsheet_metadata(&self) -> StoreResult<Vec<SheetProperties>> {
        self.check_auth()?;
        let inner = self.inner.lock().await;
        Ok(inner.sheets.iter().map(|s| s.properties.clone()).collect())
    }

    async fn get_values(&self, range: &str) -> StoreResult<Vec<Vec<String>>> {
        self.check_auth()?;
        let parsed = A1Range::parse(range)?;
        let mut inner = self.inner.lock().await;
        let sheet = inner.sheet_mut(&parsed)?;

        let first_row = parsed.first_row();
        let last_row = parsed.last_row();
        let first_col = parsed.first_col();
        let last_col = parsed.end.and_then(|b| b.col);

        let rows = sheet
            .rows
            .iter()
            .enumerate()
            .filter(|(i, _)| *i >= first_row && last_row.map_or(true, |last| *i <= last))
            .map(|(_, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(c, _)| *c >= first_col && last_col.map_or(true, |last| *c <= last))
                    .map(|(_, v)| v.clone())
                    .collect()
            })
            .collect();

        Ok(trim_trailing_empty(rows))
    }

    async fn append_values(&self, range: &str, rows: Vec<Vec<String>>) -> StoreResult<()> {
        self.before_write().await?;
        let parsed = A1Range::parse(range)?;
        let mut inner = self.inner.lock().await;
        let sheet = inner.sheet_mut(&parsed)?;

        let top = sheet
            .rows
            .iter()
            .rposition(|row| row.iter().any(|v| !v.is_empty()))
            .map_or(0, |last| last + 1);
        tracing::debug!(range, rows = rows.len(), top, "memory append");
        write_cells(&mut sheet.rows, top, parsed.first_col(), rows);
        inner.write_log.push(range.to_string());
        Ok(())
    }

    async fn update_values(&self, range: &str, rows: Vec<Vec<String>>) -> StoreResult<()> {
        self.before_write().await?;
        let parsed = A1Range::parse(range)?;

        if let Some(end) = parsed.end {
            let height = rows.len();
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            let fits_rows = end
                .row
                .map_or(true, |last| parsed.first_row() + height <= last + 1);
            let fits_cols = end
                .col
                .map_or(true, |last| parsed.first_col() + width <= last + 1);
            if !fits_rows || !fits_cols {
                return Err(StoreError::transport(format!(
                    "HTTP 400 - data does not fit range {range}"
                )));
            }
        }

        let mut inner = self.inner.lock().await;
        let sheet = inner.sheet_mut(&parsed)?;
        tracing::debug!(range, rows = rows.len(), "memory update");
        write_cells(&mut sheet.rows, parsed.first_row(), parsed.first_col(), rows);
        inner.write_log.push(range.to_string());
        Ok(())
    }

    async fn batch_update(&self, requests: Vec<BatchRequest>) -> StoreResult<Vec<BatchReply>> {
        self.before_write().await?;
        let mut inner = self.inner.lock().await;
        let mut replies = Vec::with_capacity(requests.len());
        tracing::debug!(requests = requests.len(), "memory batch update");

        for request in requests {
            match request {
                BatchRequest::AddSheet { title } => {
                    if inner.sheets.iter().any(|s| s.properties.title == title) {
                        return Err(StoreError::transport(format!(
                            "HTTP 400 - A sheet with the name \"{title}\" already exists"
                        )));
                    }
                    let properties = SheetProperties {
                        sheet_id: inner.next_sheet_id,
                        title,
                        index: inner.sheets.len(),
                    };
                    inner.next_sheet_id += 1;
                    inner.sheets.push(MemorySheet {
                        properties: properties.clone(),
                        rows: Vec::new(),
                    });
                    replies.push(BatchReply::AddSheet(properties));
                }
                BatchRequest::DeleteSheet { sheet_id } => {
                    let pos = inner
                        .sheets
                        .iter()
                        .position(|s| s.properties.sheet_id == sheet_id)
                        .ok_or_else(|| {
                            StoreError::not_found(format!("No grid with id: {sheet_id}"))
                        })?;
                    inner.sheets.remove(pos);
                    for (i, sheet) in inner.sheets.iter_mut().enumerate() {
                        sheet.properties.index = i;
                    }
                    replies.push(BatchReply::Empty);
                }
            }
        }

        Ok(replies)
    }
}
