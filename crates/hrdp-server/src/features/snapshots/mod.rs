//! Table snapshot feature
//!
//! Point-in-time columnar export and restore of the core tables, for
//! disaster recovery. Exports are immutable and write-once: each one gets a
//! fresh version directory keyed by UTC timestamp plus run id, and an
//! existing version path is never overwritten.

use thiserror::Error;

use crate::ingest::record::TargetTable;
use crate::ingest::IngestError;

pub mod commands;
pub mod queries;
pub mod records;
pub mod routes;

pub use records::{SnapshotFiles, SnapshotMetadata, SnapshotRows};
pub use routes::snapshots_routes;

/// Errors raised by snapshot export and restore.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Write-once guard: the version directory already exists.
    #[error("snapshot {table}/{version} already exists")]
    VersionExists { table: TargetTable, version: String },

    #[error("snapshot {table}/{version} not found")]
    NotFound { table: TargetTable, version: String },

    #[error("snapshot data is corrupt: {0}")]
    Corrupt(String),

    #[error("Avro error: {0}")]
    Avro(#[from] apache_avro::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}
