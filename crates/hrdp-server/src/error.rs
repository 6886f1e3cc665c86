//! Server-specific error types
//!
//! Every feature error funnels into [`AppError`], which renders the
//! standard JSON error envelope. Row-level data problems never reach this
//! type; they are reported inside successful outcome payloads.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ErrorResponse;
use crate::features::rejections::queries::ListRejectionsError;
use crate::features::snapshots::SnapshotError;
use crate::features::transactions::commands::ProcessTransactionError;
use crate::ingest::IngestError;

/// Result type alias for server operations
pub type ServerResult<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HRDP error: {0}")]
    Common(#[from] hrdp_common::HrdpError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "A database error occurred".to_string(),
                )
            },
            AppError::NotFound(ref message) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", message.clone())
            },
            AppError::Validation(ref message) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message.clone())
            },
            AppError::Conflict(ref message) => {
                (StatusCode::CONFLICT, "CONFLICT", message.clone())
            },
            AppError::Internal(ref message) => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            },
            AppError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An IO error occurred".to_string(),
                )
            },
            AppError::Common(ref e) => {
                tracing::error!("HRDP error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    e.to_string(),
                )
            },
        };

        let error = ErrorResponse::new(code, message);
        (status, Json(error)).into_response()
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            // Normally absorbed into a per-file report; if it surfaces here
            // it is a caller problem, not a server fault.
            IngestError::InvalidHeaders { .. } => AppError::Validation(err.to_string()),
            IngestError::UnsupportedTable(_) => AppError::Validation(err.to_string()),
            IngestError::Database(e) => AppError::Database(e),
            IngestError::Io(e) => AppError::Io(e),
            IngestError::Csv(e) => AppError::Internal(format!("CSV error: {e}")),
            IngestError::Common(e) => AppError::Common(e),
        }
    }
}

impl From<ProcessTransactionError> for AppError {
    fn from(err: ProcessTransactionError) -> Self {
        match err {
            ProcessTransactionError::RowCountOutOfRange { .. } => {
                AppError::Validation(err.to_string())
            },
            ProcessTransactionError::Ingest(e) => e.into(),
            ProcessTransactionError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<SnapshotError> for AppError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::VersionExists { .. } => AppError::Conflict(err.to_string()),
            SnapshotError::NotFound { .. } => AppError::NotFound(err.to_string()),
            SnapshotError::Corrupt(_) => AppError::Internal(err.to_string()),
            SnapshotError::Avro(e) => AppError::Internal(format!("Avro error: {e}")),
            SnapshotError::Io(e) => AppError::Io(e),
            SnapshotError::Serialization(e) => {
                AppError::Internal(format!("serialization error: {e}"))
            },
            SnapshotError::Database(e) => AppError::Database(e),
            SnapshotError::Ingest(e) => e.into(),
        }
    }
}

impl From<ListRejectionsError> for AppError {
    fn from(err: ListRejectionsError) -> Self {
        match err {
            ListRejectionsError::InvalidPage | ListRejectionsError::InvalidPerPage => {
                AppError::Validation(err.to_string())
            },
            ListRejectionsError::Database(e) => AppError::Database(e),
        }
    }
}
