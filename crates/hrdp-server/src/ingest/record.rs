//! Core record types shared by the bulk and transaction ingestion paths

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use hrdp_common::RawRecord;

/// The tables the ingestion pipeline can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetTable {
    Departments,
    Jobs,
    HiredEmployees,
}

/// Parse error for table selectors arriving as plain strings (path params).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported table: {0}")]
pub struct UnknownTable(pub String);

impl TargetTable {
    /// All tables, in foreign-key-safe load order.
    pub const ALL: [TargetTable; 3] = [
        TargetTable::Departments,
        TargetTable::Jobs,
        TargetTable::HiredEmployees,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetTable::Departments => "departments",
            TargetTable::Jobs => "jobs",
            TargetTable::HiredEmployees => "hired_employees",
        }
    }

    /// Raw field names expected in bulk files and API payloads, in
    /// positional order.
    pub fn expected_fields(&self) -> &'static [&'static str] {
        match self {
            TargetTable::Departments => &["id", "department"],
            TargetTable::Jobs => &["id", "job"],
            TargetTable::HiredEmployees => {
                &["id", "name", "datetime", "department_id", "job_id"]
            },
        }
    }

    /// Conventional file name for this table inside a bulk data directory.
    pub fn bulk_file_name(&self) -> &'static str {
        match self {
            TargetTable::Departments => "departments.csv",
            TargetTable::Jobs => "jobs.csv",
            TargetTable::HiredEmployees => "hired_employees.csv",
        }
    }
}

impl fmt::Display for TargetTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TargetTable {
    type Err = UnknownTable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "departments" => Ok(TargetTable::Departments),
            "jobs" => Ok(TargetTable::Jobs),
            "hired_employees" => Ok(TargetTable::HiredEmployees),
            other => Err(UnknownTable(other.to_string())),
        }
    }
}

/// Why a row was rejected. The string form is what lands in the ledger and
/// in per-reason counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    InvalidId,
    EmptyDepartment,
    EmptyJob,
    EmptyName,
    InvalidDatetime,
    InvalidDepartmentId,
    InvalidJobId,
    DepartmentFkNotFound,
    JobFkNotFound,
    InvalidHeaders,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::InvalidId => "invalid_id",
            RejectReason::EmptyDepartment => "empty_department",
            RejectReason::EmptyJob => "empty_job",
            RejectReason::EmptyName => "empty_name",
            RejectReason::InvalidDatetime => "invalid_datetime",
            RejectReason::InvalidDepartmentId => "invalid_department_id",
            RejectReason::InvalidJobId => "invalid_job_id",
            RejectReason::DepartmentFkNotFound => "department_fk_not_found",
            RejectReason::JobFkNotFound => "job_fk_not_found",
            RejectReason::InvalidHeaders => "invalid_headers",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated department or job row. The two tables share one shape:
/// an externally assigned id plus a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CatalogRow {
    pub id: i32,
    pub name: String,
}

/// A validated hired-employee row. Foreign keys are optional; when present
/// they are guaranteed referentially valid only after the integrity check.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct HiredEmployeeRow {
    pub id: i32,
    pub name: String,
    pub hired_at: DateTime<Utc>,
    pub department_id: Option<i32>,
    pub job_id: Option<i32>,
}

/// Outcome of classifying one raw record: either a typed row ready for
/// loading, or the raw record plus the first reason that disqualified it.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified<T> {
    Valid(T),
    Rejected { reason: RejectReason, raw: RawRecord },
}

/// Per-reason rejection counters, keyed by the reason's string form so the
/// serialized report reads the same as the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReasonCounts(BTreeMap<String, u64>);

impl ReasonCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bump(&mut self, reason: RejectReason) {
        *self.0.entry(reason.as_str().to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, reason: RejectReason) -> u64 {
        self.0.get(reason.as_str()).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_round_trip() {
        for table in TargetTable::ALL {
            assert_eq!(table.as_str().parse::<TargetTable>().unwrap(), table);
        }
        assert!("employees".parse::<TargetTable>().is_err());
    }

    #[test]
    fn test_expected_fields_positions() {
        assert_eq!(
            TargetTable::HiredEmployees.expected_fields(),
            &["id", "name", "datetime", "department_id", "job_id"]
        );
        assert_eq!(TargetTable::Departments.expected_fields(), &["id", "department"]);
    }

    #[test]
    fn test_reason_counts() {
        let mut counts = ReasonCounts::new();
        counts.bump(RejectReason::InvalidId);
        counts.bump(RejectReason::InvalidId);
        counts.bump(RejectReason::EmptyName);
        assert_eq!(counts.get(RejectReason::InvalidId), 2);
        assert_eq!(counts.get(RejectReason::EmptyName), 1);
        assert_eq!(counts.get(RejectReason::InvalidDatetime), 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_reason_counts_serialize_as_flat_map() {
        let mut counts = ReasonCounts::new();
        counts.bump(RejectReason::DepartmentFkNotFound);
        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json, serde_json::json!({ "department_fk_not_found": 1 }));
    }
}
