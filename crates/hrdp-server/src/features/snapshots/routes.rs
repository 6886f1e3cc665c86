//! Snapshot API routes
//!
//! - `POST /api/v1/snapshots/:table` — export a new immutable version
//! - `GET  /api/v1/snapshots/:table` — list stored versions
//! - `POST /api/v1/snapshots/:table/:version/restore` — restore a version

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::api::response::ApiResponse;
use crate::error::AppError;
use crate::features::FeatureState;
use crate::ingest::record::TargetTable;

use super::commands::{self, RestoreSnapshotCommand};
use super::queries;

/// Creates the snapshots router
pub fn snapshots_routes() -> Router<FeatureState> {
    Router::new()
        .route("/:table", post(export_snapshot).get(list_snapshots))
        .route("/:table/:version/restore", post(restore_snapshot))
}

fn parse_table(raw: &str) -> Result<TargetTable, AppError> {
    raw.parse::<TargetTable>()
        .map_err(|e| AppError::Validation(e.to_string()))
}

/// Export a table to a fresh snapshot version
#[tracing::instrument(skip(state))]
async fn export_snapshot(
    State(state): State<FeatureState>,
    Path(table): Path<String>,
) -> Result<Response, AppError> {
    let table = parse_table(&table)?;
    let metadata =
        commands::export::handle(state.db.clone(), &state.config.snapshots.root, table).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(metadata))).into_response())
}

/// List a table's stored snapshot versions
#[tracing::instrument(skip(state))]
async fn list_snapshots(
    State(state): State<FeatureState>,
    Path(table): Path<String>,
) -> Result<Response, AppError> {
    let table = parse_table(&table)?;
    let summaries = queries::list::handle(&state.config.snapshots.root, table)?;

    Ok((StatusCode::OK, Json(ApiResponse::success(summaries))).into_response())
}

/// Restore a stored snapshot version into its table
#[tracing::instrument(skip(state, command))]
async fn restore_snapshot(
    State(state): State<FeatureState>,
    Path((table, version)): Path<(String, String)>,
    command: Option<Json<RestoreSnapshotCommand>>,
) -> Result<Response, AppError> {
    let table = parse_table(&table)?;
    let Json(command) = command.unwrap_or_default();

    let outcome = commands::restore::handle(
        state.db.clone(),
        &state.config.snapshots.root,
        table,
        &version,
        command.mode,
        state.config.ingest.chunk_size,
    )
    .await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(outcome))).into_response())
}
