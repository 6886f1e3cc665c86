//! Referential integrity checking
//!
//! Foreign-key existence is resolved with one set-membership query per
//! referenced table, scoped to the ids actually present in the batch. Two
//! queries bound the cost of a run regardless of row count; a batch that
//! references nothing issues no queries at all.

use std::collections::HashSet;

use sqlx::{Postgres, Transaction};

use super::record::{HiredEmployeeRow, RejectReason};
use super::Result;

/// The referenced ids that exist in the store, per foreign table.
#[derive(Debug, Default)]
pub struct ExistingRefs {
    pub departments: HashSet<i32>,
    pub jobs: HashSet<i32>,
}

/// Distinct department and job ids referenced by a batch, sorted for
/// deterministic query parameters.
pub fn referenced_ids(rows: &[HiredEmployeeRow]) -> (Vec<i32>, Vec<i32>) {
    let mut departments: Vec<i32> = rows
        .iter()
        .filter_map(|r| r.department_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let mut jobs: Vec<i32> = rows
        .iter()
        .filter_map(|r| r.job_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    departments.sort_unstable();
    jobs.sort_unstable();
    (departments, jobs)
}

/// Load the subset of referenced ids that exist, with at most one query per
/// foreign table.
pub async fn load_existing_refs(
    tx: &mut Transaction<'_, Postgres>,
    rows: &[HiredEmployeeRow],
) -> Result<ExistingRefs> {
    let (department_ids, job_ids) = referenced_ids(rows);
    let mut refs = ExistingRefs::default();

    if !department_ids.is_empty() {
        let found: Vec<i32> = sqlx::query_scalar("SELECT id FROM departments WHERE id = ANY($1)")
            .bind(&department_ids)
            .fetch_all(&mut **tx)
            .await?;
        refs.departments = found.into_iter().collect();
    }

    if !job_ids.is_empty() {
        let found: Vec<i32> = sqlx::query_scalar("SELECT id FROM jobs WHERE id = ANY($1)")
            .bind(&job_ids)
            .fetch_all(&mut **tx)
            .await?;
        refs.jobs = found.into_iter().collect();
    }

    Ok(refs)
}

/// Check one structurally valid row against the existing id sets. The
/// department check precedes the job check; absent references pass.
pub fn reference_violation(row: &HiredEmployeeRow, refs: &ExistingRefs) -> Option<RejectReason> {
    if let Some(department_id) = row.department_id {
        if !refs.departments.contains(&department_id) {
            return Some(RejectReason::DepartmentFkNotFound);
        }
    }
    if let Some(job_id) = row.job_id {
        if !refs.jobs.contains(&job_id) {
            return Some(RejectReason::JobFkNotFound);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn employee(id: i32, department_id: Option<i32>, job_id: Option<i32>) -> HiredEmployeeRow {
        HiredEmployeeRow {
            id,
            name: format!("employee-{id}"),
            hired_at: Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
            department_id,
            job_id,
        }
    }

    #[test]
    fn test_referenced_ids_are_distinct_and_sorted() {
        let rows = vec![
            employee(1, Some(5), Some(9)),
            employee(2, Some(3), None),
            employee(3, Some(5), Some(9)),
            employee(4, None, Some(2)),
        ];
        let (departments, jobs) = referenced_ids(&rows);
        assert_eq!(departments, vec![3, 5]);
        assert_eq!(jobs, vec![2, 9]);
    }

    #[test]
    fn test_empty_batch_references_nothing() {
        let (departments, jobs) = referenced_ids(&[]);
        assert!(departments.is_empty());
        assert!(jobs.is_empty());
    }

    #[test]
    fn test_department_check_precedes_job_check() {
        let refs = ExistingRefs::default();
        // Both references are missing; the department reason must win.
        let row = employee(1, Some(10), Some(20));
        assert_eq!(
            reference_violation(&row, &refs),
            Some(RejectReason::DepartmentFkNotFound)
        );
    }

    #[test]
    fn test_job_violation_reported_when_department_resolves() {
        let refs = ExistingRefs {
            departments: [10].into_iter().collect(),
            jobs: HashSet::new(),
        };
        let row = employee(1, Some(10), Some(20));
        assert_eq!(
            reference_violation(&row, &refs),
            Some(RejectReason::JobFkNotFound)
        );
    }

    #[test]
    fn test_absent_references_pass() {
        let refs = ExistingRefs::default();
        let row = employee(1, None, None);
        assert_eq!(reference_violation(&row, &refs), None);
    }

    #[test]
    fn test_resolved_references_pass() {
        let refs = ExistingRefs {
            departments: [10].into_iter().collect(),
            jobs: [20].into_iter().collect(),
        };
        let row = employee(1, Some(10), Some(20));
        assert_eq!(reference_violation(&row, &refs), None);
    }
}
