//! The I/O boundary between the record store and a spreadsheet service.

use crate::error::StoreResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Tab properties as reported by spreadsheet metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
    #[serde(default)]
    pub index: usize,
}

/// Structural change applied through a batch update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchRequest {
    AddSheet { title: String },
    DeleteSheet { sheet_id: i64 },
}

/// Per-request reply of a batch update, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchReply {
    /// Properties of the tab created by [`BatchRequest::AddSheet`].
    AddSheet(SheetProperties),
    /// Requests that produce no reply body.
    Empty,
}

/// Authenticated read/write access to one spreadsheet.
///
/// Ranges use A1 notation (see [`crate::a1`]). Every call may fail with
/// `AuthRequired`, `Transport` or `NotFound`; implementations never retry.
#[async_trait]
pub trait SheetsTransport: Send + Sync {
    /// Properties of every tab, in tab order.
    async fn spreadsheet_metadata(&self) -> StoreResult<Vec<SheetProperties>>;

    /// Cell values of `range`, row-major. Trailing empty cells and rows may
    /// be omitted.
    async fn get_values(&self, range: &str) -> StoreResult<Vec<Vec<String>>>;

    /// Append `rows` after the last non-empty row of the table found in
    /// `range`.
    async fn append_values(&self, range: &str, rows: Vec<Vec<String>>) -> StoreResult<()>;

    /// Overwrite exactly the cells of `range` with `rows`.
    async fn update_values(&self, range: &str, rows: Vec<Vec<String>>) -> StoreResult<()>;

    /// Apply structural changes and return one reply per request.
    async fn batch_update(&self, requests: Vec<BatchRequest>) -> StoreResult<Vec<BatchReply>>;
}
