//! Transaction API routes
//!
//! `POST /api/v1/transactions` — submit 1..=1000 records for one table in
//! `strict` or `partial` mode. A strict-mode decline is returned as a normal
//! outcome payload carrying an `error` marker, matching the bulk report
//! shape, rather than as an HTTP error.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use crate::api::response::ApiResponse;
use crate::error::AppError;
use crate::features::FeatureState;

use super::commands::{self, ProcessTransactionCommand};

/// Creates the transactions router
pub fn transactions_routes() -> Router<FeatureState> {
    Router::new().route("/", post(process_transaction))
}

/// Submit a transaction
///
/// # Request Body
///
/// ```json
/// {
///   "table": "hired_employees",
///   "mode": "partial",
///   "rows": [
///     {"id": "1", "name": "Alice", "datetime": "2021-01-01T00:00:00Z",
///      "department_id": "1", "job_id": "2"}
///   ]
/// }
/// ```
#[tracing::instrument(skip(state, command), fields(table = %command.table, mode = %command.mode))]
async fn process_transaction(
    State(state): State<FeatureState>,
    Json(command): Json<ProcessTransactionCommand>,
) -> Result<Response, AppError> {
    let chunk_size = state.config.ingest.chunk_size;
    let outcome = commands::process::handle(state.db.clone(), chunk_size, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(outcome))).into_response())
}
