//! Tabular record parser for bulk input files
//!
//! Turns a delimited byte source into a one-pass sequence of raw records.
//! The delimiter is sniffed from the first line, and the first row is
//! treated as a header only when it names at least one of the expected
//! fields; otherwise the expected names are assigned positionally and every
//! row is data. A header that does not cover all expected fields rejects
//! the whole input up front (`invalid_headers`), before any row is read.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use serde_json::Value;

use super::record::RawRecord;
use super::IngestError;

/// Delimiters considered during sniffing, in tie-break order.
pub const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Pick the candidate delimiter occurring most often in the first line.
/// Falls back to a comma when none occurs.
pub fn sniff_delimiter(first_line: &str) -> u8 {
    let mut best = b',';
    let mut best_count = 0usize;
    for &candidate in DELIMITER_CANDIDATES.iter() {
        let count = first_line.bytes().filter(|&b| b == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// A lazy, single-pass reader of raw records. Not restartable; reopen the
/// source to read it again.
pub struct RecordReader<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    fields: Vec<String>,
    pending: Option<csv::StringRecord>,
}

impl RecordReader<File> {
    /// Open a bulk file: sniff the delimiter from its first line, then
    /// resolve headers against the expected field names.
    pub fn from_path(path: &Path, expected: &[&str]) -> Result<Self, IngestError> {
        let mut file = File::open(path)?;
        let mut first_line = String::new();
        {
            let mut buffered = BufReader::new(&mut file);
            buffered.read_line(&mut first_line)?;
        }
        file.seek(SeekFrom::Start(0))?;

        Self::new(file, sniff_delimiter(&first_line), expected)
    }
}

impl<R: Read> RecordReader<R> {
    /// Build a reader over an already-open source with a known delimiter.
    pub fn new(source: R, delimiter: u8, expected: &[&str]) -> Result<Self, IngestError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(source);
        let mut records = reader.into_records();

        let first = match records.next() {
            Some(result) => result?,
            None => {
                // Empty input: nothing to stream, positional naming applies.
                return Ok(Self {
                    records,
                    fields: expected.iter().map(|f| f.to_string()).collect(),
                    pending: None,
                });
            },
        };

        let normalized: Vec<String> = first
            .iter()
            .map(|cell| cell.trim().to_lowercase())
            .collect();
        let is_header = normalized
            .iter()
            .any(|cell| expected.contains(&cell.as_str()));

        if is_header {
            let missing = expected
                .iter()
                .any(|name| !normalized.iter().any(|cell| cell == name));
            if missing {
                return Err(IngestError::InvalidHeaders { resolved: normalized });
            }
            Ok(Self {
                records,
                fields: normalized,
                pending: None,
            })
        } else {
            Ok(Self {
                records,
                fields: expected.iter().map(|f| f.to_string()).collect(),
                pending: Some(first),
            })
        }
    }

    /// The resolved field names rows are keyed by.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    fn to_raw(&self, record: &csv::StringRecord) -> RawRecord {
        let mut raw = RawRecord::new();
        for (i, name) in self.fields.iter().enumerate() {
            let value = match record.get(i) {
                Some(cell) => Value::String(cell.to_string()),
                None => Value::Null,
            };
            raw.insert(name.clone(), value);
        }
        raw
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<RawRecord, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(record) = self.pending.take() {
            return Some(Ok(self.to_raw(&record)));
        }
        match self.records.next()? {
            Ok(record) => Some(Ok(self.to_raw(&record))),
            Err(e) => Some(Err(e.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    const DEPARTMENT_FIELDS: &[&str] = &["id", "department"];
    const EMPLOYEE_FIELDS: &[&str] = &["id", "name", "datetime", "department_id", "job_id"];

    fn reader(input: &str, expected: &[&str]) -> RecordReader<Cursor<Vec<u8>>> {
        let delimiter = sniff_delimiter(input.lines().next().unwrap_or(""));
        RecordReader::new(Cursor::new(input.as_bytes().to_vec()), delimiter, expected).unwrap()
    }

    fn collect(input: &str, expected: &[&str]) -> Vec<RawRecord> {
        reader(input, expected)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("1,Engineering"), b',');
        assert_eq!(sniff_delimiter("1;Engineering;x"), b';');
        assert_eq!(sniff_delimiter("1\tEngineering"), b'\t');
        assert_eq!(sniff_delimiter("1|Engineering"), b'|');
        // No candidate present: comma wins by default.
        assert_eq!(sniff_delimiter("single"), b',');
    }

    #[test]
    fn test_headerless_file_uses_positional_names() {
        let rows = collect("1,Engineering\n2,Sales\n", DEPARTMENT_FIELDS);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], json!("1"));
        assert_eq!(rows[0]["department"], json!("Engineering"));
        assert_eq!(rows[1]["department"], json!("Sales"));
    }

    #[test]
    fn test_header_row_is_consumed() {
        let rows = collect("id,department\n1,Engineering\n", DEPARTMENT_FIELDS);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], json!("1"));
    }

    #[test]
    fn test_header_detection_normalizes_case_and_whitespace() {
        let rows = collect(" ID , Department \n1,Engineering\n", DEPARTMENT_FIELDS);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["department"], json!("Engineering"));
    }

    #[test]
    fn test_headerless_and_headered_inputs_agree() {
        let with_header = collect("id,department\n1,Engineering\n", DEPARTMENT_FIELDS);
        let without = collect("1,Engineering\n", DEPARTMENT_FIELDS);
        assert_eq!(with_header, without);
    }

    #[test]
    fn test_incomplete_header_is_rejected_up_front() {
        let result = RecordReader::new(
            Cursor::new(b"id,nombre\n1,Engineering\n".to_vec()),
            b',',
            DEPARTMENT_FIELDS,
        );
        match result {
            Err(IngestError::InvalidHeaders { resolved }) => {
                assert_eq!(resolved, vec!["id".to_string(), "nombre".to_string()]);
            },
            other => panic!("expected invalid headers, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_extra_header_columns_are_carried_through() {
        let rows = collect(
            "id,department,notes\n1,Engineering,temp\n",
            DEPARTMENT_FIELDS,
        );
        assert_eq!(rows[0]["notes"], json!("temp"));
    }

    #[test]
    fn test_missing_trailing_cells_become_null() {
        let rows = collect("10,Alice,2021-01-01T00:00:00Z\n", EMPLOYEE_FIELDS);
        assert_eq!(rows[0]["datetime"], json!("2021-01-01T00:00:00Z"));
        assert_eq!(rows[0]["department_id"], Value::Null);
        assert_eq!(rows[0]["job_id"], Value::Null);
    }

    #[test]
    fn test_semicolon_delimited_input() {
        let rows = collect("1;Engineering\n2;Sales\n", DEPARTMENT_FIELDS);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["id"], json!("2"));
    }

    #[test]
    fn test_empty_input_yields_no_rows() {
        let rows = collect("", DEPARTMENT_FIELDS);
        assert!(rows.is_empty());
    }
}
