use crate::{ApiError, AppState};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use gsheet_cache::MutationState;
use gsheet_core::{LedgerEntry, Record, SheetData, SheetInfo, StoreError, Template};
use gsheet_mapping::FieldKey;
use gsheet_store::SheetView;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

type ApiResult<T> = Result<T, ApiError>;

/// Health check response.
#[derive(Serialize, Deserialize)]
pub struct Health {
    /// Server status ("ok" when healthy).
    pub status: String,
    /// Server version from Cargo.toml.
    pub version: String,
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn templates() -> Json<IndexMap<&'static str, &'static [&'static str]>> {
    Json(
        Template::ALL
            .iter()
            .map(|t| (t.name(), t.headers()))
            .collect(),
    )
}

pub async fn list_sheets(State(state): State<AppState>) -> Json<Vec<SheetInfo>> {
    Json(state.cache.list_sheets().await)
}

#[derive(Deserialize)]
pub struct CreateSheet {
    name: String,
    #[serde(default)]
    template: Option<String>,
    #[serde(default)]
    headers: Vec<String>,
}

pub async fn create_sheet(
    State(state): State<AppState>,
    Json(body): Json<CreateSheet>,
) -> ApiResult<(StatusCode, Json<SheetInfo>)> {
    let store = state.cache.store();
    let info = match body.template {
        Some(template) => {
            if !body.headers.is_empty() {
                return Err(ApiError::BadRequest(
                    "give either a template or headers, not both".to_string(),
                ));
            }
            store
                .create_sheet_from_template(&body.name, template.parse()?)
                .await?
        }
        None => store.create_sheet(&body.name, &body.headers).await?,
    };
    Ok((StatusCode::CREATED, Json(info)))
}

pub async fn delete_sheet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let sheet_id: i64 = id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("sheet id must be numeric: {id}")))?;

    let store = state.cache.store();
    let title = store
        .list_sheets()
        .await?
        .into_iter()
        .find(|s| s.sheet_id == sheet_id)
        .map(|s| s.title);
    store.delete_sheet(sheet_id).await?;
    if let Some(title) = title {
        state.cache.invalidate(&title).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct SheetQuery {
    #[serde(default)]
    refresh: bool,
}

pub async fn get_sheet(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<SheetQuery>,
) -> ApiResult<Json<SheetData>> {
    let data = if query.refresh {
        state.cache.load(&name).await?
    } else {
        state.cache.get_or_load(&name).await?
    };
    Ok(Json(data))
}

#[derive(Serialize)]
pub struct RecordFields {
    #[serde(rename = "rowIndex")]
    row_index: usize,
    fields: BTreeMap<FieldKey, String>,
}

/// Records projected onto canonical field keys.
pub async fn get_fields(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<RecordFields>>> {
    let view = SheetView::new(state.cache.get_or_load(&name).await?);
    let records = (0..view.records().len())
        .filter_map(|row_index| {
            Some(RecordFields {
                row_index,
                fields: view.fields(row_index)?,
            })
        })
        .collect();
    Ok(Json(records))
}

#[derive(Serialize)]
pub struct SheetState {
    sheet: String,
    /// `null` when the sheet is not cached.
    state: Option<MutationState>,
}

pub async fn get_state(State(state): State<AppState>, Path(name): Path<String>) -> Json<SheetState> {
    let current = state.cache.state(&name).await;
    Json(SheetState {
        sheet: name,
        state: current,
    })
}

pub async fn append_entry(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(entry): Json<LedgerEntry>,
) -> ApiResult<(StatusCode, Json<LedgerEntry>)> {
    state.cache.get_or_load(&name).await?;
    state
        .cache
        .append_record(&name, entry.clone())
        .await
        .outcome()
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Merge the given fields into the record and write the whole row back.
pub async fn update_record(
    State(state): State<AppState>,
    Path((name, row)): Path<(String, usize)>,
    Json(fields): Json<IndexMap<String, String>>,
) -> ApiResult<Json<Record>> {
    if fields.is_empty() {
        return Err(StoreError::invalid_input("no fields to update").into());
    }

    let data = state.cache.get_or_load(&name).await?;
    let Some(current) = data.record(row) else {
        return Err(ApiError::RecordNotFound { sheet: name, row });
    };
    if let Some(unknown) = fields.keys().find(|h| !data.headers.contains(*h)) {
        return Err(ApiError::BadRequest(format!(
            "sheet '{name}' has no column '{unknown}'"
        )));
    }

    let mut record = current.clone();
    record.merge(&Record::from_pairs(row, fields));
    state
        .cache
        .update_record(&name, row, record.clone())
        .await
        .outcome()
        .await?;
    Ok(Json(record))
}

#[derive(Serialize)]
pub struct Session {
    authenticated: bool,
}

pub async fn refresh_session(State(state): State<AppState>) -> ApiResult<Json<Session>> {
    let authenticated = match &state.credentials {
        Some(credentials) => credentials.refresh().await?.is_some(),
        None => true,
    };
    Ok(Json(Session { authenticated }))
}
