//! Chunked batch inserts
//!
//! Rows are written in consecutive chunks of at most `chunk_size` rows, one
//! multi-row statement per chunk, sequentially inside the caller's
//! transaction. Chunking caps statement size for large bulk files; it does
//! not introduce parallelism.
//!
//! The returned count is the number of rows *attempted*. With
//! [`ConflictPolicy::SkipExisting`] a pre-existing id is silently skipped,
//! so callers must treat the count as an upper bound on rows actually
//! inserted.

use sqlx::{Postgres, QueryBuilder, Transaction};

use super::record::{CatalogRow, HiredEmployeeRow, TargetTable};
use super::{IngestError, Result};

/// Default number of rows per insert statement.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// What to do when an inserted id already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// `ON CONFLICT (id) DO NOTHING`: idempotent ingestion inserts.
    SkipExisting,
    /// Plain insert: conflicts fail the statement. Used by snapshot restore,
    /// which assumes a clean or intentionally replaced target.
    Fail,
}

impl ConflictPolicy {
    fn sql_suffix(&self) -> &'static str {
        match self {
            ConflictPolicy::SkipExisting => " ON CONFLICT (id) DO NOTHING",
            ConflictPolicy::Fail => "",
        }
    }
}

/// Insert department or job rows. Returns the number of rows attempted.
pub async fn load_catalog(
    tx: &mut Transaction<'_, Postgres>,
    table: TargetTable,
    rows: &[CatalogRow],
    chunk_size: usize,
    policy: ConflictPolicy,
) -> Result<usize> {
    let insert_prefix = match table {
        TargetTable::Departments => "INSERT INTO departments (id, name) ",
        TargetTable::Jobs => "INSERT INTO jobs (id, name) ",
        TargetTable::HiredEmployees => return Err(IngestError::UnsupportedTable(table)),
    };

    for chunk in rows.chunks(chunk_size.max(1)) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(insert_prefix);
        builder.push_values(chunk, |mut b, row| {
            b.push_bind(row.id).push_bind(&row.name);
        });
        builder.push(policy.sql_suffix());
        builder.build().execute(&mut **tx).await?;
    }

    Ok(rows.len())
}

/// Insert hired-employee rows. Returns the number of rows attempted.
pub async fn load_hired_employees(
    tx: &mut Transaction<'_, Postgres>,
    rows: &[HiredEmployeeRow],
    chunk_size: usize,
    policy: ConflictPolicy,
) -> Result<usize> {
    for chunk in rows.chunks(chunk_size.max(1)) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO hired_employees (id, name, hired_at, department_id, job_id) ",
        );
        builder.push_values(chunk, |mut b, row| {
            b.push_bind(row.id)
                .push_bind(&row.name)
                .push_bind(row.hired_at)
                .push_bind(row.department_id)
                .push_bind(row.job_id);
        });
        builder.push(policy.sql_suffix());
        builder.build().execute(&mut **tx).await?;
    }

    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_partitioning_covers_all_rows() {
        let rows: Vec<i32> = (0..1234).collect();
        let chunks: Vec<&[i32]> = rows.chunks(DEFAULT_CHUNK_SIZE).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 500);
        assert_eq!(chunks[1].len(), 500);
        assert_eq!(chunks[2].len(), 234);
        assert_eq!(chunks.iter().map(|c| c.len()).sum::<usize>(), rows.len());
    }

    #[test]
    fn test_conflict_policy_sql() {
        assert_eq!(
            ConflictPolicy::SkipExisting.sql_suffix(),
            " ON CONFLICT (id) DO NOTHING"
        );
        assert_eq!(ConflictPolicy::Fail.sql_suffix(), "");
    }
}
