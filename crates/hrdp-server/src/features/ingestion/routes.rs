//! Bulk ingestion API routes
//!
//! `POST /api/v1/ingestion/runs` — ingest the conventional bulk files from
//! the configured data directory (or a directory named in the body) and
//! return per-table reports.

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

use super::commands::{self, RunIngestionCommand};

/// Creates the ingestion router
pub fn ingestion_routes() -> Router<FeatureState> {
    Router::new().route("/runs", post(run_ingestion))
}

/// Start a bulk ingestion run. The body is optional; an empty object uses
/// the configured data directory.
#[tracing::instrument(skip(state, command))]
async fn run_ingestion(
    State(state): State<FeatureState>,
    command: Option<Json<RunIngestionCommand>>,
) -> Result<Response, AppError> {
    let Json(command) = command.unwrap_or_default();

    let report = commands::run::handle(
        state.db.clone(),
        state.config.ingest.chunk_size,
        state.config.ingest.data_dir.clone(),
        command,
    )
    .await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(report))).into_response())
}
