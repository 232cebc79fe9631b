//! Error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gsheet_core::StoreError;
use serde_json::json;
use thiserror::Error;

/// Errors a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The sheet exists but has no record at this index.
    #[error("no record {row} in sheet '{sheet}'")]
    RecordNotFound { sheet: String, row: usize },

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    ///
    /// - Missing or rejected credential: 401 Unauthorized
    /// - Unknown sheet or record: 404 Not Found
    /// - Unaddressable or malformed input: 400 Bad Request
    /// - Anything the spreadsheet service failed at: 502 Bad Gateway
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::AuthRequired) => StatusCode::UNAUTHORIZED,
            Self::Store(StoreError::NotFound(_)) | Self::RecordNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            Self::Store(StoreError::InvalidInput(_) | StoreError::ColumnOutOfRange { .. })
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!("request failed: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
