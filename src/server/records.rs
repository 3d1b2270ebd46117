use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, header::CONTENT_TYPE},
    response::Html,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    error::Result,
    fetch,
    iris::{self, Iris, summary::Summary},
    sql::parser::parse_filters,
};

use super::{ApiError, AppState};

const HOME_PAGE: &str = "<h1>Iris dataset api</h1>\
<h2>Available endpoints:</h2>\
<p>GET /records - query stored data, filter with where=column&lt;operator&gt;value</p>\
<p>GET /records/all - all stored data</p>\
<p>POST /records, POST /records/unique - insert CSV or JSON rows</p>\
<p>DELETE /records, DELETE /records/all - delete rows</p>\
<p>GET /records/sync?url=... - download and insert new rows</p>\
<p>GET /records/summary - column statistics</p>";

/// Query parameters of `GET /records/sync`
#[derive(Debug, Deserialize)]
pub(super) struct SyncParams {
    url: Option<String>,
}

/// Every `where` occurrence, in request order
fn where_params(params: &[(String, String)]) -> Vec<&str> {
    params
        .iter()
        .filter(|(key, _)| key == "where")
        .map(|(_, value)| value.as_str())
        .collect()
}

/// Reads the request body as CSV when declared `text/csv`, JSON otherwise
fn parse_body(headers: &HeaderMap, body: &str) -> Result<Vec<Iris>> {
    let is_csv = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().to_ascii_lowercase().starts_with("text/csv"));
    if is_csv { iris::from_csv(body) } else { iris::from_json(body) }
}

async fn insert(
    state: &AppState,
    records: Vec<Iris>,
    unique: bool,
) -> std::result::Result<String, ApiError> {
    let count = state
        .with_store(move |store| store.insert_records(&records, unique))
        .await?;
    Ok(format!("Inserted {} rows.", count))
}

/// `GET /`
pub(super) async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}

/// `GET /records` -- rows matching every `where` filter
pub(super) async fn get_records(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> std::result::Result<Json<Vec<Iris>>, ApiError> {
    let filters = parse_filters(&where_params(&params))?;
    let rows = state
        .with_store(move |store| store.select_records(&filters))
        .await?;
    Ok(Json(rows))
}

/// `GET /records/all`
pub(super) async fn get_all_records(
    State(state): State<AppState>,
) -> std::result::Result<Json<Vec<Iris>>, ApiError> {
    let rows = state.with_store(|store| store.select_records(&[])).await?;
    Ok(Json(rows))
}

/// `POST /records`
pub(super) async fn post_records(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> std::result::Result<String, ApiError> {
    let records = parse_body(&headers, &body)?;
    insert(&state, records, false).await
}

/// `POST /records/unique`
pub(super) async fn post_unique_records(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> std::result::Result<String, ApiError> {
    let records = parse_body(&headers, &body)?;
    insert(&state, records, true).await
}

/// `DELETE /records` -- without `where` nothing is deleted
pub(super) async fn delete_records(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> std::result::Result<String, ApiError> {
    let filters = parse_filters(&where_params(&params))?;
    let count = state
        .with_store(move |store| store.delete_records(&filters))
        .await?;
    Ok(format!("Deleted {} rows", count))
}

/// `DELETE /records/all`
pub(super) async fn delete_all_records(
    State(state): State<AppState>,
) -> std::result::Result<String, ApiError> {
    let count = state.with_store(|store| store.delete_all_records()).await?;
    Ok(format!("Deleted {} rows", count))
}

/// `GET /records/sync` -- download CSV and insert the rows not yet stored
pub(super) async fn sync_records(
    State(state): State<AppState>,
    Query(params): Query<SyncParams>,
) -> std::result::Result<String, ApiError> {
    let url = params
        .url
        .unwrap_or_else(|| state.config.sync.default_url.clone());
    info!(%url, "syncing iris data");
    let data = fetch::download_url_data(&state.client, &url).await?;
    let records = iris::from_csv(&data)?;
    insert(&state, records, true).await
}

/// `GET /records/summary`
pub(super) async fn summarize_records(
    State(state): State<AppState>,
) -> std::result::Result<Json<Summary>, ApiError> {
    let summary = state.with_store(|store| store.summary()).await?;
    Ok(Json(summary))
}
