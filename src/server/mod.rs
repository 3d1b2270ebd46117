//! HTTP API for the Iris dataset
//!
//! ## Endpoints
//!
//! - `GET    /records`          - query stored rows (`where` filters, repeatable)
//! - `GET    /records/all`      - all stored rows
//! - `POST   /records`          - insert CSV or JSON rows
//! - `POST   /records/unique`   - insert rows not already stored
//! - `DELETE /records`          - delete rows matching `where` filters
//! - `DELETE /records/all`      - delete every row
//! - `GET    /records/sync`     - download a CSV and insert new rows
//! - `GET    /records/summary`  - per-column statistics

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{error, warn};

use crate::{
    config::Config,
    error::{Error, Result},
    iris::store::IrisStore,
    sql::engine::sqlite::SqliteEngine,
};

mod records;

// ── Shared state ────────────────────────────────────────────────────────

/// Shared state for the API handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            client: reqwest::Client::new(),
        }
    }

    /// Runs `op` against a fresh connection on the blocking pool.
    ///
    /// The connection is opened per call and closed when `op` returns,
    /// whether it succeeded or not.
    pub async fn with_store<T, F>(&self, op: F) -> std::result::Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut IrisStore<SqliteEngine>) -> Result<T> + Send + 'static,
    {
        let path = self.config.database.path.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut store = IrisStore::new(SqliteEngine::open(&path)?)?;
            op(&mut store)
        })
        .await
        .map_err(|e| Error::Internal(format!("storage task failed: {}", e)))?;
        Ok(result?)
    }
}

// ── Router creation ─────────────────────────────────────────────────────

/// Build the axum router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(records::home))
        .route(
            "/records",
            get(records::get_records)
                .post(records::post_records)
                .delete(records::delete_records),
        )
        .route(
            "/records/all",
            get(records::get_all_records).delete(records::delete_all_records),
        )
        .route("/records/unique", post(records::post_unique_records))
        .route("/records/sync", get(records::sync_records))
        .route("/records/summary", get(records::summarize_records))
        .with_state(state)
}

// ── Error type ──────────────────────────────────────────────────────────

/// Request-boundary wrapper turning crate errors into HTTP responses
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        ApiError(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        } else {
            warn!(error = %self.0, "rejected request");
        }
        (status, self.0.to_string()).into_response()
    }
}
