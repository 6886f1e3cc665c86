//! Process transaction command
//!
//! Accepts a bounded batch of raw records for one table and applies one of
//! two commit policies over a single validation pass:
//!
//! - `strict`: all-or-nothing. Any rejected row declines the whole
//!   submission; nothing is inserted and nothing is written to the ledger.
//! - `partial`: best-effort. Valid rows are inserted, every rejected row is
//!   counted and written to the rejection ledger.
//!
//! Validation is the same rule chain the bulk path runs, so a malformed
//! record reports the same reason code through either entry point.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::ingest::integrity::{load_existing_refs, reference_violation};
use crate::ingest::ledger;
use crate::ingest::loader::{self, ConflictPolicy};
use crate::ingest::record::{
    CatalogRow, Classified, RawRecord, ReasonCounts, RejectReason, TargetTable,
};
use crate::ingest::rules::{classify_department, classify_hired_employee, classify_job};
use crate::ingest::IngestError;

/// Hard cap on rows per submission.
pub const MAX_TRANSACTION_ROWS: usize = 1000;

/// Ledger source tag for this path, distinct from bulk file names.
pub const API_TRANSACTION_SOURCE: &str = "api_transaction";

/// Commit policy for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionMode {
    #[default]
    Strict,
    Partial,
}

impl fmt::Display for TransactionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionMode::Strict => f.write_str("strict"),
            TransactionMode::Partial => f.write_str("partial"),
        }
    }
}

/// Command to process one transaction submission
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessTransactionCommand {
    pub table: TargetTable,
    #[serde(default)]
    pub mode: TransactionMode,
    pub rows: Vec<RawRecord>,
}

/// Result reported back to the caller. A strict-mode decline is a normal
/// outcome carrying the `error` marker, not a transport failure.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionOutcome {
    pub run_id: String,
    pub table: TargetTable,
    pub mode: TransactionMode,
    pub received: u64,
    pub inserted: u64,
    pub rejected: u64,
    pub reasons: ReasonCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Errors that can occur when processing a transaction
#[derive(Debug, Error)]
pub enum ProcessTransactionError {
    #[error("a transaction must contain between 1 and {max} rows, got {got}")]
    RowCountOutOfRange { got: usize, max: usize },

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ProcessTransactionCommand {
    /// Validates the submission envelope (the rows themselves are judged by
    /// the rule chains, not here).
    pub fn validate(&self) -> Result<(), ProcessTransactionError> {
        if self.rows.is_empty() || self.rows.len() > MAX_TRANSACTION_ROWS {
            return Err(ProcessTransactionError::RowCountOutOfRange {
                got: self.rows.len(),
                max: MAX_TRANSACTION_ROWS,
            });
        }
        Ok(())
    }
}

/// Handler function for transaction submissions.
#[tracing::instrument(
    skip(pool, command),
    fields(table = %command.table, mode = %command.mode, received = command.rows.len())
)]
pub async fn handle(
    pool: PgPool,
    chunk_size: usize,
    command: ProcessTransactionCommand,
) -> Result<TransactionOutcome, ProcessTransactionError> {
    command.validate()?;

    let run_id = Uuid::new_v4().to_string();
    let received = command.rows.len() as u64;
    let table = command.table;
    let mode = command.mode;

    let mut tx = pool.begin().await.map_err(ProcessTransactionError::Database)?;

    // Single classification pass; the commit policy is applied afterwards.
    let mut rejects: Vec<(RejectReason, RawRecord)> = Vec::new();
    let inserted: u64;

    match table {
        TargetTable::Departments | TargetTable::Jobs => {
            let classify: fn(&RawRecord) -> Classified<CatalogRow> =
                if table == TargetTable::Departments {
                    classify_department
                } else {
                    classify_job
                };

            let mut valid: Vec<CatalogRow> = Vec::new();
            for raw in &command.rows {
                match classify(raw) {
                    Classified::Valid(row) => valid.push(row),
                    Classified::Rejected { reason, raw } => rejects.push((reason, raw)),
                }
            }

            if mode == TransactionMode::Strict && !rejects.is_empty() {
                tx.rollback().await.map_err(ProcessTransactionError::Database)?;
                return Ok(declined(run_id, table, mode, received, rejects));
            }

            inserted =
                loader::load_catalog(&mut tx, table, &valid, chunk_size, ConflictPolicy::SkipExisting)
                    .await? as u64;
        },
        TargetTable::HiredEmployees => {
            let mut rows = Vec::new();
            let mut raws = Vec::new();
            for raw in &command.rows {
                match classify_hired_employee(raw) {
                    Classified::Valid(row) => {
                        rows.push(row);
                        raws.push(raw.clone());
                    },
                    Classified::Rejected { reason, raw } => rejects.push((reason, raw)),
                }
            }

            // Referential pass over the structurally valid rows only; at
            // most one existence query per foreign table.
            let refs = load_existing_refs(&mut tx, &rows).await?;

            let mut insertable = Vec::with_capacity(rows.len());
            for (row, raw) in rows.into_iter().zip(raws) {
                match reference_violation(&row, &refs) {
                    Some(reason) => rejects.push((reason, raw)),
                    None => insertable.push(row),
                }
            }

            if mode == TransactionMode::Strict && !rejects.is_empty() {
                tx.rollback().await.map_err(ProcessTransactionError::Database)?;
                return Ok(declined(run_id, table, mode, received, rejects));
            }

            inserted = loader::load_hired_employees(
                &mut tx,
                &insertable,
                chunk_size,
                ConflictPolicy::SkipExisting,
            )
            .await? as u64;
        },
    }

    // Best-effort mode logs what it dropped; strict mode only reaches this
    // point with a clean batch.
    if mode == TransactionMode::Partial {
        for (reason, raw) in &rejects {
            ledger::record(&mut tx, &run_id, API_TRANSACTION_SOURCE, table, *reason, raw).await?;
        }
    }

    tx.commit().await.map_err(ProcessTransactionError::Database)?;

    let mut reasons = ReasonCounts::new();
    for (reason, _) in &rejects {
        reasons.bump(*reason);
    }

    tracing::info!(
        run_id = %run_id,
        inserted,
        rejected = rejects.len(),
        "Transaction committed"
    );

    Ok(TransactionOutcome {
        run_id,
        table,
        mode,
        received,
        inserted,
        rejected: rejects.len() as u64,
        reasons,
        error: None,
    })
}

fn declined(
    run_id: String,
    table: TargetTable,
    mode: TransactionMode,
    received: u64,
    rejects: Vec<(RejectReason, RawRecord)>,
) -> TransactionOutcome {
    let mut reasons = ReasonCounts::new();
    for (reason, _) in &rejects {
        reasons.bump(*reason);
    }

    tracing::info!(
        run_id = %run_id,
        rejected = rejects.len(),
        "Transaction declined in strict mode"
    );

    TransactionOutcome {
        run_id,
        table,
        mode,
        received,
        inserted: 0,
        rejected: rejects.len() as u64,
        reasons,
        error: Some("submission declined in strict mode: one or more rows failed validation".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn command(rows: usize) -> ProcessTransactionCommand {
        ProcessTransactionCommand {
            table: TargetTable::Departments,
            mode: TransactionMode::Strict,
            rows: (0..rows)
                .map(|i| {
                    let mut raw = RawRecord::new();
                    raw.insert("id".into(), json!(i.to_string()));
                    raw.insert("department".into(), json!("Engineering"));
                    raw
                })
                .collect(),
        }
    }

    #[test]
    fn test_row_count_bounds() {
        assert!(command(1).validate().is_ok());
        assert!(command(MAX_TRANSACTION_ROWS).validate().is_ok());
        assert!(matches!(
            command(0).validate(),
            Err(ProcessTransactionError::RowCountOutOfRange { got: 0, .. })
        ));
        assert!(matches!(
            command(MAX_TRANSACTION_ROWS + 1).validate(),
            Err(ProcessTransactionError::RowCountOutOfRange { got: 1001, .. })
        ));
    }

    #[test]
    fn test_mode_defaults_to_strict() {
        let parsed: ProcessTransactionCommand = serde_json::from_value(json!({
            "table": "jobs",
            "rows": [{"id": "1", "job": "Analyst"}]
        }))
        .unwrap();
        assert_eq!(parsed.mode, TransactionMode::Strict);
        assert_eq!(parsed.table, TargetTable::Jobs);
    }

    #[test]
    fn test_unknown_table_fails_deserialization() {
        let result = serde_json::from_value::<ProcessTransactionCommand>(json!({
            "table": "persons",
            "rows": [{"id": "1"}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_declined_outcome_shape() {
        let mut raw = RawRecord::new();
        raw.insert("id".into(), json!("x"));
        let outcome = declined(
            "run".to_string(),
            TargetTable::Departments,
            TransactionMode::Strict,
            3,
            vec![(RejectReason::InvalidId, raw)],
        );
        assert_eq!(outcome.inserted, 0);
        assert_eq!(outcome.rejected, 1);
        assert_eq!(outcome.reasons.get(RejectReason::InvalidId), 1);
        assert!(outcome.error.is_some());

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["mode"], "strict");
        assert_eq!(json["reasons"]["invalid_id"], 1);
        assert!(json.get("error").is_some());
    }

    #[test]
    fn test_committed_outcome_omits_error_marker() {
        let outcome = TransactionOutcome {
            run_id: "run".to_string(),
            table: TargetTable::Jobs,
            mode: TransactionMode::Partial,
            received: 2,
            inserted: 2,
            rejected: 0,
            reasons: ReasonCounts::new(),
            error: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["mode"], "partial");
    }
}
