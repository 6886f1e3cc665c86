//! Snapshot artifact schemas and serialization
//!
//! Each snapshot is a versioned directory holding an Avro data file plus a
//! JSON metadata descriptor. The Avro schemas are fixed per table;
//! timestamps travel as ISO-8601 strings and optional foreign keys as
//! nullable unions, so artifacts stay portable across stores.

use std::path::Path;

use apache_avro::{from_value, Codec, Reader, Schema, Writer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ingest::record::{CatalogRow, HiredEmployeeRow, TargetTable};

use super::SnapshotError;

pub const DATA_FILE_NAME: &str = "data.avro";
pub const METADATA_FILE_NAME: &str = "metadata.json";
pub const SNAPSHOT_FORMAT: &str = "avro";

const DEPARTMENTS_SCHEMA: &str = r#"
{
    "type": "record",
    "name": "departments_record",
    "fields": [
        {"name": "id", "type": "int"},
        {"name": "name", "type": "string"}
    ]
}
"#;

const JOBS_SCHEMA: &str = r#"
{
    "type": "record",
    "name": "jobs_record",
    "fields": [
        {"name": "id", "type": "int"},
        {"name": "name", "type": "string"}
    ]
}
"#;

const HIRED_EMPLOYEES_SCHEMA: &str = r#"
{
    "type": "record",
    "name": "hired_employees_record",
    "fields": [
        {"name": "id", "type": "int"},
        {"name": "name", "type": "string"},
        {"name": "hired_at", "type": "string"},
        {"name": "department_id", "type": ["null", "int"], "default": null},
        {"name": "job_id", "type": ["null", "int"], "default": null}
    ]
}
"#;

/// The fixed Avro schema for one table's snapshot data file.
pub fn avro_schema(table: TargetTable) -> Result<Schema, SnapshotError> {
    let raw = match table {
        TargetTable::Departments => DEPARTMENTS_SCHEMA,
        TargetTable::Jobs => JOBS_SCHEMA,
        TargetTable::HiredEmployees => HIRED_EMPLOYEES_SCHEMA,
    };
    Ok(Schema::parse_str(raw)?)
}

/// Snapshot descriptor persisted as `metadata.json` and echoed to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub table: TargetTable,
    pub version: String,
    pub run_id: String,
    pub created_at_utc: String,
    pub row_count: u64,
    pub format: String,
    pub files: SnapshotFiles,
}

/// File manifest inside a snapshot directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFiles {
    pub data: String,
    pub metadata: String,
}

impl SnapshotFiles {
    pub fn conventional() -> Self {
        Self {
            data: DATA_FILE_NAME.to_string(),
            metadata: METADATA_FILE_NAME.to_string(),
        }
    }
}

/// The rows of one table, as captured by or fed into a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotRows {
    Catalog(Vec<CatalogRow>),
    HiredEmployees(Vec<HiredEmployeeRow>),
}

impl SnapshotRows {
    pub fn len(&self) -> usize {
        match self {
            SnapshotRows::Catalog(rows) => rows.len(),
            SnapshotRows::HiredEmployees(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CatalogRecord {
    id: i32,
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct HiredEmployeeRecord {
    id: i32,
    name: String,
    hired_at: String,
    department_id: Option<i32>,
    job_id: Option<i32>,
}

/// Serialize rows into the Avro data file at `path`.
pub fn write_data_file(
    path: &Path,
    table: TargetTable,
    rows: &SnapshotRows,
) -> Result<(), SnapshotError> {
    let schema = avro_schema(table)?;
    let mut writer = Writer::with_codec(&schema, Vec::new(), Codec::Null);

    match rows {
        SnapshotRows::Catalog(rows) => {
            for row in rows {
                writer.append_ser(CatalogRecord {
                    id: row.id,
                    name: row.name.clone(),
                })?;
            }
        },
        SnapshotRows::HiredEmployees(rows) => {
            for row in rows {
                writer.append_ser(HiredEmployeeRecord {
                    id: row.id,
                    name: row.name.clone(),
                    hired_at: row.hired_at.to_rfc3339(),
                    department_id: row.department_id,
                    job_id: row.job_id,
                })?;
            }
        },
    }

    let bytes = writer.into_inner()?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Deserialize the Avro data file at `path`, preserving file order.
pub fn read_data_file(path: &Path, table: TargetTable) -> Result<SnapshotRows, SnapshotError> {
    let bytes = std::fs::read(path)?;
    let reader = Reader::new(&bytes[..])?;

    match table {
        TargetTable::Departments | TargetTable::Jobs => {
            let mut rows = Vec::new();
            for value in reader {
                let value = value?;
                let record: CatalogRecord = from_value(&value)?;
                rows.push(CatalogRow {
                    id: record.id,
                    name: record.name,
                });
            }
            Ok(SnapshotRows::Catalog(rows))
        },
        TargetTable::HiredEmployees => {
            let mut rows = Vec::new();
            for value in reader {
                let value = value?;
                let record: HiredEmployeeRecord = from_value(&value)?;
                let hired_at = DateTime::parse_from_rfc3339(&record.hired_at)
                    .map_err(|e| {
                        SnapshotError::Corrupt(format!(
                            "bad hired_at '{}': {}",
                            record.hired_at, e
                        ))
                    })?
                    .with_timezone(&Utc);
                rows.push(HiredEmployeeRow {
                    id: record.id,
                    name: record.name,
                    hired_at,
                    department_id: record.department_id,
                    job_id: record.job_id,
                });
            }
            Ok(SnapshotRows::HiredEmployees(rows))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_schemas_parse() {
        for table in TargetTable::ALL {
            avro_schema(table).unwrap();
        }
    }

    #[test]
    fn test_catalog_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DATA_FILE_NAME);

        let rows = SnapshotRows::Catalog(vec![
            CatalogRow { id: 1, name: "Engineering".to_string() },
            CatalogRow { id: 2, name: "Sales".to_string() },
        ]);

        write_data_file(&path, TargetTable::Departments, &rows).unwrap();
        let restored = read_data_file(&path, TargetTable::Departments).unwrap();
        assert_eq!(restored, rows);
    }

    #[test]
    fn test_hired_employees_round_trip_preserves_order_and_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DATA_FILE_NAME);

        let rows = SnapshotRows::HiredEmployees(vec![
            HiredEmployeeRow {
                id: 2,
                name: "Bob".to_string(),
                hired_at: Utc.with_ymd_and_hms(2021, 6, 1, 9, 30, 0).unwrap(),
                department_id: Some(1),
                job_id: None,
            },
            HiredEmployeeRow {
                id: 1,
                name: "Alice".to_string(),
                hired_at: Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
                department_id: None,
                job_id: Some(4),
            },
        ]);

        write_data_file(&path, TargetTable::HiredEmployees, &rows).unwrap();
        let restored = read_data_file(&path, TargetTable::HiredEmployees).unwrap();
        // File order, not id order, is the restore order.
        assert_eq!(restored, rows);
    }

    #[test]
    fn test_empty_table_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DATA_FILE_NAME);

        let rows = SnapshotRows::Catalog(Vec::new());
        write_data_file(&path, TargetTable::Jobs, &rows).unwrap();
        let restored = read_data_file(&path, TargetTable::Jobs).unwrap();
        assert!(restored.is_empty());
    }

    #[test]
    fn test_metadata_serialization_shape() {
        let metadata = SnapshotMetadata {
            table: TargetTable::Departments,
            version: "20210101T000000Z_abc".to_string(),
            run_id: "abc".to_string(),
            created_at_utc: "20210101T000000Z".to_string(),
            row_count: 2,
            format: SNAPSHOT_FORMAT.to_string(),
            files: SnapshotFiles::conventional(),
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["table"], "departments");
        assert_eq!(json["format"], "avro");
        assert_eq!(json["files"]["data"], "data.avro");

        let parsed: SnapshotMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.row_count, 2);
    }
}
