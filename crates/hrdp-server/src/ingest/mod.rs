//! Ingestion pipeline
//!
//! Shared machinery for loading hiring data into the relational store:
//!
//! - [`parser`] — delimiter/header-tolerant reading of bulk files
//! - [`normalize`] — raw field values to typed values
//! - [`rules`] — ordered per-table validation chains
//! - [`integrity`] — batch-scoped foreign-key existence checks
//! - [`ledger`] — the append-only data-quality rejection ledger
//! - [`loader`] — chunked, idempotent batch inserts
//! - [`pipeline`] — the bulk file orchestrator
//!
//! The API transaction path (`features::transactions`) reuses everything
//! here except the file parser, so a malformed record is rejected with the
//! same reason code no matter how it arrived.

use thiserror::Error;

pub mod integrity;
pub mod ledger;
pub mod loader;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod record;
pub mod rules;

pub use pipeline::{BulkIngestor, IngestionReport, TableReport};
pub use record::{
    CatalogRow, Classified, HiredEmployeeRow, RawRecord, ReasonCounts, RejectReason, TargetTable,
};

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Errors raised by the ingestion pipeline. Row-level data problems are not
/// errors; they are [`record::RejectReason`] values carried in outcomes.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The input's header row does not cover the expected field names. Fatal
    /// for the whole file, recoverable for the run.
    #[error("input headers do not cover the expected fields (resolved: {resolved:?})")]
    InvalidHeaders { resolved: Vec<String> },

    #[error("operation does not apply to table {0}")]
    UnsupportedTable(record::TargetTable),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Common(#[from] hrdp_common::HrdpError),
}
