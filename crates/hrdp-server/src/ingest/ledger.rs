//! Data-quality rejection ledger
//!
//! Every rejected record becomes one row in `dq_rejections`, identified by
//! `(run_id, row_hash, reason)`. Re-recording the same rejection within a
//! run is a silent no-op via the unique constraint, so retried files and
//! duplicated bad rows never inflate the audit trail.

use serde_json::Value;
use sqlx::{Postgres, Transaction};

use hrdp_common::stable_row_hash;

use super::record::{RawRecord, RejectReason, TargetTable};
use super::Result;

/// Record one rejection. Duplicate `(run_id, row_hash, reason)` conflicts
/// are absorbed; any other database failure propagates to the surrounding
/// transaction.
pub async fn record(
    tx: &mut Transaction<'_, Postgres>,
    run_id: &str,
    source: &str,
    table: TargetTable,
    reason: RejectReason,
    raw: &RawRecord,
) -> Result<()> {
    let row_hash = stable_row_hash(raw)?;

    sqlx::query(
        r#"
        INSERT INTO dq_rejections (run_id, row_hash, source, table_name, reason, row_data)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT ON CONSTRAINT uq_dq_rejections_run_hash_reason DO NOTHING
        "#,
    )
    .bind(run_id)
    .bind(&row_hash)
    .bind(source)
    .bind(table.as_str())
    .bind(reason.as_str())
    .bind(Value::Object(raw.clone()))
    .execute(&mut **tx)
    .await?;

    tracing::debug!(
        run_id = %run_id,
        table = %table,
        reason = %reason,
        row_hash = %row_hash,
        "Recorded rejection"
    );

    Ok(())
}
