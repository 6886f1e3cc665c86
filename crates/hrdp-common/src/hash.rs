//! Row fingerprinting for the data-quality rejection ledger
//!
//! A rejected record is identified by a SHA-256 digest over a canonical JSON
//! rendering of its raw (pre-normalization) fields. Keys are serialized in
//! lexicographic order, so two mappings with the same keys and values produce
//! the same fingerprint no matter which column order the source used. The
//! ledger's `(run_id, row_hash, reason)` uniqueness constraint depends on
//! this.

use std::collections::BTreeMap;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// A raw record as it arrived from a file or an API payload: string keys,
/// untyped JSON values, nothing normalized yet.
pub type RawRecord = serde_json::Map<String, Value>;

/// Compute the deterministic fingerprint of a raw record.
///
/// The canonical form is compact JSON with lexicographically sorted keys;
/// the digest is SHA-256 over its UTF-8 bytes, rendered as lowercase hex.
pub fn stable_row_hash(row: &RawRecord) -> Result<String> {
    let sorted: BTreeMap<&str, &Value> = row.iter().map(|(k, v)| (k.as_str(), v)).collect();
    let payload = serde_json::to_string(&sorted)?;

    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    Ok(hex::encode(hasher.finalize()))
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

    #[test]
    fn test_known_digest() {
        let row = record(&[
            ("id", json!("1")),
            ("department", json!("Engineering")),
        ]);
        assert_eq!(
            stable_row_hash(&row).unwrap(),
            "21cb61fbff46f5ee2f524419f85aa49a8dcbcc28dd9ae127b337b28b06d7044d"
        );
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let a = record(&[("id", json!("1")), ("department", json!("Engineering"))]);
        let b = record(&[("department", json!("Engineering")), ("id", json!("1"))]);
        assert_eq!(stable_row_hash(&a).unwrap(), stable_row_hash(&b).unwrap());
    }

    #[test]
    fn test_value_changes_change_the_hash() {
        let a = record(&[("id", json!("1")), ("department", json!("Engineering"))]);
        // Trailing whitespace is part of the raw record, so it must count.
        let b = record(&[("id", json!("1")), ("department", json!("Engineering "))]);
        assert_ne!(stable_row_hash(&a).unwrap(), stable_row_hash(&b).unwrap());
        assert_eq!(
            stable_row_hash(&b).unwrap(),
            "bf171f43e298f73b8d3b7a3e2d5dfb996903dbd80e93d327a60ac847bc39a24e"
        );
    }

    #[test]
    fn test_null_values_are_canonicalized() {
        let row = record(&[
            ("id", json!("x")),
            ("name", Value::Null),
            ("datetime", json!("2021-01-01T00:00:00Z")),
            ("department_id", json!("2")),
            ("job_id", json!("3")),
        ]);
        assert_eq!(
            stable_row_hash(&row).unwrap(),
            "c3a02caea995e3db54033201fbc2fe76fafbb7ffcf8cb1f13251b2cd95b1278c"
        );
    }

    #[test]
    fn test_repeated_calls_are_stable() {
        let row = record(&[("id", json!("42")), ("job", json!("Data Engineer"))]);
        let first = stable_row_hash(&row).unwrap();
        for _ in 0..10 {
            assert_eq!(stable_row_hash(&row).unwrap(), first);
        }
        assert_eq!(
            first,
            "665f5ce983113894c9259171a2aecf8075e6239a78cb223cb0b407a3c3b91db6"
        );
    }
}
