//! Feature modules implementing the HRDP API
//!
//! Each feature is a vertical slice with its own commands and/or queries and
//! routes:
//!
//! - **ingestion**: bulk file ingestion runs
//! - **transactions**: strict/partial batch submissions
//! - **snapshots**: table export/restore for disaster recovery
//! - **rejections**: audit listing over the data-quality ledger

use std::sync::Arc;

use axum::Router;

use crate::config::Config;

pub mod ingestion;
pub mod rejections;
pub mod snapshots;
pub mod transactions;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool
    pub db: sqlx::PgPool,
    /// Loaded server configuration (data dir, snapshot root, chunk size)
    pub config: Arc<Config>,
}

/// Creates the main API router with all feature routes mounted
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/ingestion", ingestion::ingestion_routes())
        .nest("/transactions", transactions::transactions_routes())
        .nest("/snapshots", snapshots::snapshots_routes())
        .nest("/rejections", rejections::rejections_routes())
        .with_state(state)
}
