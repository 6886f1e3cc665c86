//! Rejection ledger API routes
//!
//! `GET /api/v1/rejections` — audit listing with optional `run_id`,
//! `table` and `reason` filters plus `page`/`per_page` pagination.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::api::response::ApiResponse;
use crate::error::AppError;
use crate::features::FeatureState;

use super::queries::{self, ListRejectionsQuery};

/// Creates the rejections router
pub fn rejections_routes() -> Router<FeatureState> {
    Router::new().route("/", get(list_rejections))
}

/// List ledger entries for audit
#[tracing::instrument(skip(state, query))]
async fn list_rejections(
    State(state): State<FeatureState>,
    Query(query): Query<ListRejectionsQuery>,
) -> Result<Response, AppError> {
    let response = queries::list::handle(state.db.clone(), query).await?;

    let meta = json!({ "pagination": response.pagination });
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success_with_meta(response.items, meta)),
    )
        .into_response())
}
