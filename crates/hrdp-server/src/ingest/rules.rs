//! Per-table validation rule chains
//!
//! Each table has an ordered list of `(reason, violation predicate)` pairs.
//! Evaluation stops at the first violated rule, and that rule's reason is
//! what the ledger records, so the chain order is a contract: reordering it
//! changes which reason identical bad input reports. The same chains run for
//! bulk files and API transactions.

use serde_json::Value;

use super::normalize::{non_empty_string, parse_fk, parse_int, parse_timestamp};
use super::record::{CatalogRow, Classified, HiredEmployeeRow, RawRecord, RejectReason};

/// One link in a validation chain.
pub struct Rule {
    pub reason: RejectReason,
    pub violated: fn(&RawRecord) -> bool,
}

static NULL: Value = Value::Null;

fn field<'a>(raw: &'a RawRecord, key: &str) -> &'a Value {
    raw.get(key).unwrap_or(&NULL)
}

fn id_invalid(raw: &RawRecord) -> bool {
    parse_int(field(raw, "id")).is_none()
}

fn department_empty(raw: &RawRecord) -> bool {
    non_empty_string(field(raw, "department")).is_none()
}

fn job_empty(raw: &RawRecord) -> bool {
    non_empty_string(field(raw, "job")).is_none()
}

fn name_empty(raw: &RawRecord) -> bool {
    non_empty_string(field(raw, "name")).is_none()
}

fn datetime_invalid(raw: &RawRecord) -> bool {
    parse_timestamp(field(raw, "datetime")).is_none()
}

fn department_ref_invalid(raw: &RawRecord) -> bool {
    parse_fk(field(raw, "department_id")).is_invalid()
}

fn job_ref_invalid(raw: &RawRecord) -> bool {
    parse_fk(field(raw, "job_id")).is_invalid()
}

pub const DEPARTMENT_RULES: &[Rule] = &[
    Rule { reason: RejectReason::InvalidId, violated: id_invalid },
    Rule { reason: RejectReason::EmptyDepartment, violated: department_empty },
];

pub const JOB_RULES: &[Rule] = &[
    Rule { reason: RejectReason::InvalidId, violated: id_invalid },
    Rule { reason: RejectReason::EmptyJob, violated: job_empty },
];

pub const HIRED_EMPLOYEE_RULES: &[Rule] = &[
    Rule { reason: RejectReason::InvalidId, violated: id_invalid },
    Rule { reason: RejectReason::EmptyName, violated: name_empty },
    Rule { reason: RejectReason::InvalidDatetime, violated: datetime_invalid },
    Rule { reason: RejectReason::InvalidDepartmentId, violated: department_ref_invalid },
    Rule { reason: RejectReason::InvalidJobId, violated: job_ref_invalid },
];

/// Walk a chain and return the first violated rule's reason.
pub fn first_violation(rules: &[Rule], raw: &RawRecord) -> Option<RejectReason> {
    rules
        .iter()
        .find(|rule| (rule.violated)(raw))
        .map(|rule| rule.reason)
}

fn classify_catalog(
    rules: &[Rule],
    name_field: &str,
    raw: &RawRecord,
) -> Classified<CatalogRow> {
    if let Some(reason) = first_violation(rules, raw) {
        return Classified::Rejected { reason, raw: raw.clone() };
    }

    // The chain above guarantees both extractions succeed.
    let Some(id) = parse_int(field(raw, "id")) else {
        return Classified::Rejected { reason: RejectReason::InvalidId, raw: raw.clone() };
    };
    let Some(name) = non_empty_string(field(raw, name_field)) else {
        let reason = if name_field == "department" {
            RejectReason::EmptyDepartment
        } else {
            RejectReason::EmptyJob
        };
        return Classified::Rejected { reason, raw: raw.clone() };
    };

    Classified::Valid(CatalogRow { id, name })
}

/// Classify a raw department record.
pub fn classify_department(raw: &RawRecord) -> Classified<CatalogRow> {
    classify_catalog(DEPARTMENT_RULES, "department", raw)
}

/// Classify a raw job record.
pub fn classify_job(raw: &RawRecord) -> Classified<CatalogRow> {
    classify_catalog(JOB_RULES, "job", raw)
}

/// Classify a raw hired-employee record. Referential existence is a later,
/// separate stage; this only settles the structural checks.
pub fn classify_hired_employee(raw: &RawRecord) -> Classified<HiredEmployeeRow> {
    if let Some(reason) = first_violation(HIRED_EMPLOYEE_RULES, raw) {
        return Classified::Rejected { reason, raw: raw.clone() };
    }

    let Some(id) = parse_int(field(raw, "id")) else {
        return Classified::Rejected { reason: RejectReason::InvalidId, raw: raw.clone() };
    };
    let Some(name) = non_empty_string(field(raw, "name")) else {
        return Classified::Rejected { reason: RejectReason::EmptyName, raw: raw.clone() };
    };
    let Some(hired_at) = parse_timestamp(field(raw, "datetime")) else {
        return Classified::Rejected { reason: RejectReason::InvalidDatetime, raw: raw.clone() };
    };

    Classified::Valid(HiredEmployeeRow {
        id,
        name,
        hired_at,
        department_id: parse_fk(field(raw, "department_id")).id(),
        job_id: parse_fk(field(raw, "job_id")).id(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn reason_of<T: std::fmt::Debug>(outcome: Classified<T>) -> RejectReason {
        match outcome {
            Classified::Rejected { reason, .. } => reason,
            Classified::Valid(row) => panic!("expected rejection, got {:?}", row),
        }
    }

    #[test]
    fn test_department_valid() {
        let raw = record(&[("id", json!("1")), ("department", json!(" Engineering "))]);
        match classify_department(&raw) {
            Classified::Valid(row) => {
                assert_eq!(row.id, 1);
                assert_eq!(row.name, "Engineering");
            },
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_department_chain_order() {
        // Both id and name are bad; the id rule comes first and must win.
        let raw = record(&[("id", json!("x")), ("department", json!(""))]);
        assert_eq!(reason_of(classify_department(&raw)), RejectReason::InvalidId);

        let raw = record(&[("id", json!("1")), ("department", json!("  "))]);
        assert_eq!(reason_of(classify_department(&raw)), RejectReason::EmptyDepartment);
    }

    #[test]
    fn test_job_chain() {
        let raw = record(&[("id", json!("5")), ("job", json!("Analyst"))]);
        assert!(matches!(classify_job(&raw), Classified::Valid(_)));

        let raw = record(&[("id", json!("5")), ("job", Value::Null)]);
        assert_eq!(reason_of(classify_job(&raw)), RejectReason::EmptyJob);
    }

    #[test]
    fn test_hired_employee_valid_with_optional_fks() {
        let raw = record(&[
            ("id", json!("10")),
            ("name", json!("Alice")),
            ("datetime", json!("2021-01-01T00:00:00Z")),
            ("department_id", json!("")),
            ("job_id", Value::Null),
        ]);
        match classify_hired_employee(&raw) {
            Classified::Valid(row) => {
                assert_eq!(row.id, 10);
                assert_eq!(row.department_id, None);
                assert_eq!(row.job_id, None);
            },
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_hired_employee_chain_order_is_stable() {
        // Every field is bad; rejection reasons must surface in chain order
        // as fields are fixed one by one.
        let mut raw = record(&[
            ("id", json!("x")),
            ("name", json!("")),
            ("datetime", json!("nope")),
            ("department_id", json!("abc")),
            ("job_id", json!("def")),
        ]);
        assert_eq!(reason_of(classify_hired_employee(&raw)), RejectReason::InvalidId);

        raw.insert("id".into(), json!("1"));
        assert_eq!(reason_of(classify_hired_employee(&raw)), RejectReason::EmptyName);

        raw.insert("name".into(), json!("Bob"));
        assert_eq!(
            reason_of(classify_hired_employee(&raw)),
            RejectReason::InvalidDatetime
        );

        raw.insert("datetime".into(), json!("2021-05-01T09:00:00Z"));
        assert_eq!(
            reason_of(classify_hired_employee(&raw)),
            RejectReason::InvalidDepartmentId
        );

        raw.insert("department_id".into(), json!("3"));
        assert_eq!(
            reason_of(classify_hired_employee(&raw)),
            RejectReason::InvalidJobId
        );

        raw.insert("job_id".into(), json!("4"));
        assert!(matches!(classify_hired_employee(&raw), Classified::Valid(_)));
    }

    #[test]
    fn test_classification_is_pure() {
        let raw = record(&[("id", json!("oops")), ("department", json!("Sales"))]);
        let first = classify_department(&raw);
        let second = classify_department(&raw);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_fields_behave_like_nulls() {
        let raw = record(&[("id", json!("7"))]);
        assert_eq!(reason_of(classify_department(&raw)), RejectReason::EmptyDepartment);
    }
}
