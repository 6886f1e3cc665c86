//! Export snapshot command
//!
//! Serializes a table's current rows into a fresh, immutable version
//! directory: `<root>/<table>/<stamp>_<run_id>/{data.avro, metadata.json}`.

use std::path::Path;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::ingest::record::{CatalogRow, HiredEmployeeRow, TargetTable};

use super::super::records::{
    write_data_file, SnapshotFiles, SnapshotMetadata, SnapshotRows, DATA_FILE_NAME,
    METADATA_FILE_NAME, SNAPSHOT_FORMAT,
};
use super::super::SnapshotError;

/// Handler function for snapshot exports.
#[tracing::instrument(skip(pool, root), fields(table = %table))]
pub async fn handle(
    pool: PgPool,
    root: &Path,
    table: TargetTable,
) -> Result<SnapshotMetadata, SnapshotError> {
    let run_id = Uuid::new_v4().to_string();
    let stamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
    let version = format!("{stamp}_{run_id}");

    let table_dir = root.join(table.as_str());
    std::fs::create_dir_all(&table_dir)?;

    // Write-once: creation must fail if the version path already exists.
    let version_dir = table_dir.join(&version);
    if let Err(e) = std::fs::create_dir(&version_dir) {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
            return Err(SnapshotError::VersionExists { table, version });
        }
        return Err(e.into());
    }

    let rows = fetch_rows(&pool, table).await?;
    let row_count = rows.len() as u64;

    write_data_file(&version_dir.join(DATA_FILE_NAME), table, &rows)?;

    let metadata = SnapshotMetadata {
        table,
        version: version.clone(),
        run_id,
        created_at_utc: stamp,
        row_count,
        format: SNAPSHOT_FORMAT.to_string(),
        files: SnapshotFiles::conventional(),
    };
    std::fs::write(
        version_dir.join(METADATA_FILE_NAME),
        serde_json::to_string_pretty(&metadata)?,
    )?;

    tracing::info!(
        table = %table,
        version = %metadata.version,
        row_count,
        "Snapshot exported"
    );

    Ok(metadata)
}

async fn fetch_rows(pool: &PgPool, table: TargetTable) -> Result<SnapshotRows, SnapshotError> {
    match table {
        TargetTable::Departments => {
            let rows: Vec<CatalogRow> =
                sqlx::query_as("SELECT id, name FROM departments ORDER BY id")
                    .fetch_all(pool)
                    .await?;
            Ok(SnapshotRows::Catalog(rows))
        },
        TargetTable::Jobs => {
            let rows: Vec<CatalogRow> = sqlx::query_as("SELECT id, name FROM jobs ORDER BY id")
                .fetch_all(pool)
                .await?;
            Ok(SnapshotRows::Catalog(rows))
        },
        TargetTable::HiredEmployees => {
            let rows: Vec<HiredEmployeeRow> = sqlx::query_as(
                "SELECT id, name, hired_at, department_id, job_id \
                 FROM hired_employees ORDER BY id",
            )
            .fetch_all(pool)
            .await?;
            Ok(SnapshotRows::HiredEmployees(rows))
        },
    }
}
