//! # gsheet-server
//!
//! JSON HTTP API over the optimistic sheet cache.
//!
//! | Method | Path | |
//! |---|---|---|
//! | GET | `/health` | liveness and version |
//! | GET | `/templates` | template names and header rows |
//! | GET | `/sheets` | every sheet; empty when the listing fails |
//! | POST | `/sheets` | create a sheet from headers or a template |
//! | DELETE | `/sheets/:id` | delete a sheet by numeric id |
//! | GET | `/sheets/:name` | headers and records (`?refresh=true` refetches) |
//! | GET | `/sheets/:name/fields` | canonical fields of every record |
//! | GET | `/sheets/:name/state` | cache mutation state |
//! | POST | `/sheets/:name/entries` | append a ledger row |
//! | PUT | `/sheets/:name/records/:row` | change fields of one record |
//! | POST | `/session/refresh` | ask the credential provider for a new token |

mod error;
mod handlers;

pub use error::ApiError;

use axum::routing::{get, post, put};
use axum::Router;
use gsheet_cache::SheetCache;
use gsheet_http::CredentialProvider;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub cache: SheetCache,
    /// Absent when the server runs without remote credentials.
    pub credentials: Option<Arc<dyn CredentialProvider>>,
}

impl AppState {
    pub fn new(cache: SheetCache) -> Self {
        AppState {
            cache,
            credentials: None,
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

/// Create the application router.
///
/// This is separated from `main()` to allow testing.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/templates", get(handlers::templates))
        .route(
            "/sheets",
            get(handlers::list_sheets).post(handlers::create_sheet),
        )
        .route(
            "/sheets/:name",
            get(handlers::get_sheet).delete(handlers::delete_sheet),
        )
        .route("/sheets/:name/fields", get(handlers::get_fields))
        .route("/sheets/:name/state", get(handlers::get_state))
        .route("/sheets/:name/entries", post(handlers::append_entry))
        .route("/sheets/:name/records/:row", put(handlers::update_record))
        .route("/session/refresh", post(handlers::refresh_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
