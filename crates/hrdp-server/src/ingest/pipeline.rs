//! Bulk file ingestion orchestrator
//!
//! Drives parsing, validation, referential checks, the rejection ledger and
//! the batch loader over whole files. All tables of one run share a run id,
//! and each table is processed inside its own database transaction: either
//! all of a table's inserts and ledger rows commit together, or none do.
//!
//! Unlike the API transaction path, the bulk path always writes every
//! rejection to the ledger, tagged with the source file's name.

use std::fs::File;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::integrity::{load_existing_refs, reference_violation};
use super::ledger;
use super::loader::{self, ConflictPolicy, DEFAULT_CHUNK_SIZE};
use super::parser::RecordReader;
use super::record::{
    CatalogRow, Classified, RawRecord, ReasonCounts, RejectReason, TargetTable,
};
use super::rules::{classify_department, classify_hired_employee, classify_job};
use super::{IngestError, Result};

/// Per-table outcome of a bulk run.
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub run_id: String,
    pub source: String,
    pub table: TargetTable,
    /// Rows attempted by the loader; conflicting ids are silently skipped,
    /// so this is an upper bound on rows actually added.
    pub inserted: u64,
    pub rejected: u64,
    pub reasons: ReasonCounts,
}

/// Outcome of ingesting a whole data directory under one run id.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionReport {
    pub run_id: String,
    pub results: Vec<TableReport>,
}

/// Orchestrates bulk ingestion against a connection pool.
#[derive(Debug, Clone)]
pub struct BulkIngestor {
    db: PgPool,
    chunk_size: usize,
}

struct Tally {
    rejected: u64,
    reasons: ReasonCounts,
}

impl Tally {
    fn new() -> Self {
        Self { rejected: 0, reasons: ReasonCounts::new() }
    }

    fn bump(&mut self, reason: RejectReason) {
        self.rejected += 1;
        self.reasons.bump(reason);
    }
}

impl BulkIngestor {
    pub fn new(db: PgPool) -> Self {
        Self { db, chunk_size: DEFAULT_CHUNK_SIZE }
    }

    pub fn with_chunk_size(db: PgPool, chunk_size: usize) -> Self {
        Self { db, chunk_size }
    }

    /// Ingest the three conventional files from `data_dir` in
    /// foreign-key-safe order, all under one fresh run id.
    #[tracing::instrument(skip(self), fields(data_dir = %data_dir.display()))]
    pub async fn ingest_all(&self, data_dir: &Path) -> Result<IngestionReport> {
        let run_id = Uuid::new_v4().to_string();
        tracing::info!(run_id = %run_id, "Starting bulk ingestion run");

        let mut results = Vec::with_capacity(TargetTable::ALL.len());
        for table in TargetTable::ALL {
            let path = data_dir.join(table.bulk_file_name());
            results.push(self.ingest_file(table, &path, &run_id).await?);
        }

        Ok(IngestionReport { run_id, results })
    }

    /// Ingest one file into one table, inside one transaction.
    #[tracing::instrument(skip(self), fields(table = %table, path = %path.display()))]
    pub async fn ingest_file(
        &self,
        table: TargetTable,
        path: &Path,
        run_id: &str,
    ) -> Result<TableReport> {
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut tx = self.db.begin().await?;
        let mut tally = Tally::new();

        let reader = match RecordReader::from_path(path, table.expected_fields()) {
            Ok(reader) => reader,
            Err(IngestError::InvalidHeaders { resolved }) => {
                // Fatal for the file, not for the run: zero rows processed,
                // one aggregate ledger entry.
                let mut raw = RawRecord::new();
                raw.insert(
                    "resolved_headers".to_string(),
                    Value::Array(resolved.into_iter().map(Value::String).collect()),
                );
                ledger::record(&mut tx, run_id, &source, table, RejectReason::InvalidHeaders, &raw)
                    .await?;
                tally.bump(RejectReason::InvalidHeaders);
                tx.commit().await?;

                tracing::warn!(source = %source, "Rejected whole file: invalid headers");
                return Ok(self.report(run_id, source, table, 0, tally));
            },
            Err(e) => return Err(e),
        };

        let inserted = match table {
            TargetTable::Departments | TargetTable::Jobs => {
                let classify: fn(&RawRecord) -> Classified<CatalogRow> =
                    if table == TargetTable::Departments {
                        classify_department
                    } else {
                        classify_job
                    };
                self.run_catalog(&mut tx, reader, table, classify, run_id, &source, &mut tally)
                    .await?
            },
            TargetTable::HiredEmployees => {
                self.run_hired(&mut tx, reader, run_id, &source, &mut tally).await?
            },
        };

        tx.commit().await?;

        tracing::info!(
            run_id = %run_id,
            source = %source,
            inserted,
            rejected = tally.rejected,
            "Finished table ingestion"
        );

        Ok(self.report(run_id, source, table, inserted as u64, tally))
    }

    fn report(
        &self,
        run_id: &str,
        source: String,
        table: TargetTable,
        inserted: u64,
        tally: Tally,
    ) -> TableReport {
        TableReport {
            run_id: run_id.to_string(),
            source,
            table,
            inserted,
            rejected: tally.rejected,
            reasons: tally.reasons,
        }
    }

    async fn run_catalog(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reader: RecordReader<File>,
        table: TargetTable,
        classify: fn(&RawRecord) -> Classified<CatalogRow>,
        run_id: &str,
        source: &str,
        tally: &mut Tally,
    ) -> Result<usize> {
        let mut valid = Vec::new();

        for result in reader {
            let raw = result?;
            match classify(&raw) {
                Classified::Valid(row) => valid.push(row),
                Classified::Rejected { reason, raw } => {
                    ledger::record(tx, run_id, source, table, reason, &raw).await?;
                    tally.bump(reason);
                },
            }
        }

        loader::load_catalog(tx, table, &valid, self.chunk_size, ConflictPolicy::SkipExisting)
            .await
    }

    async fn run_hired(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reader: RecordReader<File>,
        run_id: &str,
        source: &str,
        tally: &mut Tally,
    ) -> Result<usize> {
        let table = TargetTable::HiredEmployees;
        let mut rows = Vec::new();
        let mut raws = Vec::new();

        for result in reader {
            let raw = result?;
            match classify_hired_employee(&raw) {
                Classified::Valid(row) => {
                    rows.push(row);
                    raws.push(raw);
                },
                Classified::Rejected { reason, raw } => {
                    ledger::record(tx, run_id, source, table, reason, &raw).await?;
                    tally.bump(reason);
                },
            }
        }

        // Existence lookups are scoped to the ids this batch references,
        // never the whole table.
        let refs = load_existing_refs(tx, &rows).await?;

        let mut insertable = Vec::with_capacity(rows.len());
        for (row, raw) in rows.into_iter().zip(raws) {
            match reference_violation(&row, &refs) {
                Some(reason) => {
                    ledger::record(tx, run_id, source, table, reason, &raw).await?;
                    tally.bump(reason);
                },
                None => insertable.push(row),
            }
        }

        loader::load_hired_employees(tx, &insertable, self.chunk_size, ConflictPolicy::SkipExisting)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_report_serialization() {
        let mut reasons = ReasonCounts::new();
        reasons.bump(RejectReason::DepartmentFkNotFound);

        let report = TableReport {
            run_id: "run".to_string(),
            source: "hired_employees.csv".to_string(),
            table: TargetTable::HiredEmployees,
            inserted: 0,
            rejected: 1,
            reasons,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["table"], "hired_employees");
        assert_eq!(json["reasons"]["department_fk_not_found"], 1);
        assert_eq!(json["inserted"], 0);
    }

    #[test]
    fn test_tally_counts_reasons_and_total() {
        let mut tally = Tally::new();
        tally.bump(RejectReason::InvalidId);
        tally.bump(RejectReason::InvalidId);
        tally.bump(RejectReason::EmptyName);
        assert_eq!(tally.rejected, 3);
        assert_eq!(tally.reasons.get(RejectReason::InvalidId), 2);
    }
}
