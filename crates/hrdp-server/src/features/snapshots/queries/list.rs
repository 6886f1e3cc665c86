//! List snapshots query
//!
//! Enumerates the stored versions of one table by walking the artifact
//! layout and reading each version's metadata descriptor.

use std::path::Path;

use serde::Serialize;

use crate::ingest::record::TargetTable;

use super::super::records::{SnapshotMetadata, METADATA_FILE_NAME};
use super::super::SnapshotError;

/// One stored snapshot version
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotSummary {
    pub version: String,
    pub row_count: u64,
    pub created_at_utc: String,
}

/// Handler function for listing a table's snapshots, newest version first.
#[tracing::instrument(skip(root), fields(table = %table))]
pub fn handle(root: &Path, table: TargetTable) -> Result<Vec<SnapshotSummary>, SnapshotError> {
    let table_dir = root.join(table.as_str());
    if !table_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut summaries = Vec::new();
    for entry in std::fs::read_dir(&table_dir)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }

        let metadata_path = entry.path().join(METADATA_FILE_NAME);
        let metadata = std::fs::read_to_string(&metadata_path)
            .ok()
            .and_then(|raw| serde_json::from_str::<SnapshotMetadata>(&raw).ok());

        match metadata {
            Some(metadata) => summaries.push(SnapshotSummary {
                version: metadata.version,
                row_count: metadata.row_count,
                created_at_utc: metadata.created_at_utc,
            }),
            None => {
                tracing::warn!(
                    path = %metadata_path.display(),
                    "Skipping snapshot version with unreadable metadata"
                );
            },
        }
    }

    // Versions start with a UTC stamp, so the lexicographic order is the
    // chronological order.
    summaries.sort_by(|a, b| b.version.cmp(&a.version));
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::snapshots::records::{SnapshotFiles, SNAPSHOT_FORMAT};

    fn write_version(root: &Path, table: &str, version: &str, row_count: u64) {
        let dir = root.join(table).join(version);
        std::fs::create_dir_all(&dir).unwrap();
        let metadata = SnapshotMetadata {
            table: TargetTable::Departments,
            version: version.to_string(),
            run_id: "run".to_string(),
            created_at_utc: version.split('_').next().unwrap_or("").to_string(),
            row_count,
            format: SNAPSHOT_FORMAT.to_string(),
            files: SnapshotFiles::conventional(),
        };
        std::fs::write(
            dir.join(METADATA_FILE_NAME),
            serde_json::to_string_pretty(&metadata).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn test_missing_table_dir_is_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let summaries = handle(dir.path(), TargetTable::Departments).unwrap();
        assert!(summaries.is_empty());
    }

    #[test]
    fn test_versions_listed_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        write_version(dir.path(), "departments", "20210101T000000Z_a", 1);
        write_version(dir.path(), "departments", "20220101T000000Z_b", 2);

        let summaries = handle(dir.path(), TargetTable::Departments).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].version, "20220101T000000Z_b");
        assert_eq!(summaries[0].row_count, 2);
        assert_eq!(summaries[1].version, "20210101T000000Z_a");
    }

    #[test]
    fn test_unreadable_metadata_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_version(dir.path(), "departments", "20210101T000000Z_a", 1);
        let broken = dir.path().join("departments").join("20230101T000000Z_x");
        std::fs::create_dir_all(&broken).unwrap();
        std::fs::write(broken.join(METADATA_FILE_NAME), "not json").unwrap();

        let summaries = handle(dir.path(), TargetTable::Departments).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].version, "20210101T000000Z_a");
    }
}
