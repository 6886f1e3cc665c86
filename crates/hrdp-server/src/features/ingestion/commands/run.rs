//! Run bulk ingestion command
//!
//! Triggers a full bulk run over a data directory: departments, jobs and
//! hired employees, in that order, all under one run id.

use std::path::PathBuf;

use serde::Deserialize;
use sqlx::PgPool;

use crate::ingest::{BulkIngestor, IngestError, IngestionReport};

/// Command to start a bulk ingestion run
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunIngestionCommand {
    /// Overrides the configured data directory when set.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Handler function for bulk ingestion runs
#[tracing::instrument(skip(pool, command))]
pub async fn handle(
    pool: PgPool,
    chunk_size: usize,
    default_data_dir: PathBuf,
    command: RunIngestionCommand,
) -> Result<IngestionReport, IngestError> {
    let data_dir = command.data_dir.unwrap_or(default_data_dir);

    let ingestor = BulkIngestor::with_chunk_size(pool, chunk_size);
    let report = ingestor.ingest_all(&data_dir).await?;

    tracing::info!(
        run_id = %report.run_id,
        tables = report.results.len(),
        "Bulk ingestion run finished"
    );

    Ok(report)
}
