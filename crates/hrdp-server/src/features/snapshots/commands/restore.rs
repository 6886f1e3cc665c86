//! Restore snapshot command
//!
//! Loads a stored version back into its table. `replace` clears the target
//! (resetting identity sequencing) before inserting; `append` inserts
//! directly. Rows are inserted in file order with plain inserts: restore
//! performs no idempotency de-duplication and assumes a clean or
//! intentionally replaced target.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::ingest::loader::{self, ConflictPolicy};
use crate::ingest::record::TargetTable;

use super::super::records::{read_data_file, SnapshotRows, DATA_FILE_NAME};
use super::super::SnapshotError;

/// How to treat existing rows in the target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestoreMode {
    /// Truncate the table (RESTART IDENTITY CASCADE) before inserting.
    #[default]
    Replace,
    /// Insert into the table as-is.
    Append,
}

impl fmt::Display for RestoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreMode::Replace => f.write_str("replace"),
            RestoreMode::Append => f.write_str("append"),
        }
    }
}

/// Command body for a restore request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestoreSnapshotCommand {
    #[serde(default)]
    pub mode: RestoreMode,
}

/// Result of a restore
#[derive(Debug, Clone, Serialize)]
pub struct RestoreOutcome {
    pub table: TargetTable,
    pub version: String,
    pub mode: RestoreMode,
    pub restored_rows: u64,
}

/// Handler function for snapshot restores.
#[tracing::instrument(skip(pool, root), fields(table = %table, version = %version, mode = %mode))]
pub async fn handle(
    pool: PgPool,
    root: &Path,
    table: TargetTable,
    version: &str,
    mode: RestoreMode,
    chunk_size: usize,
) -> Result<RestoreOutcome, SnapshotError> {
    let data_path = root.join(table.as_str()).join(version).join(DATA_FILE_NAME);
    if !data_path.is_file() {
        return Err(SnapshotError::NotFound {
            table,
            version: version.to_string(),
        });
    }

    let rows = read_data_file(&data_path, table)?;
    let restored_rows = rows.len() as u64;

    let mut tx = pool.begin().await?;

    if mode == RestoreMode::Replace {
        let truncate = format!("TRUNCATE TABLE {} RESTART IDENTITY CASCADE", table.as_str());
        sqlx::query(&truncate).execute(&mut *tx).await?;
    }

    match &rows {
        SnapshotRows::Catalog(rows) => {
            loader::load_catalog(&mut tx, table, rows, chunk_size, ConflictPolicy::Fail).await?;
        },
        SnapshotRows::HiredEmployees(rows) => {
            loader::load_hired_employees(&mut tx, rows, chunk_size, ConflictPolicy::Fail).await?;
        },
    }

    tx.commit().await?;

    tracing::info!(
        table = %table,
        version = %version,
        restored_rows,
        "Snapshot restored"
    );

    Ok(RestoreOutcome {
        table,
        version: version.to_string(),
        mode,
        restored_rows,
    })
}
