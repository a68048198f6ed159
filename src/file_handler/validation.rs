//! Path checks before opening, and record validators.
//!
//! Record validation turns a raw [`Record`] into structured data or rejects it.
//! Rejections are [`LineIoError::InvalidRecord`]; readers that consume records
//! sequentially map them to [`RecordOutcome::Skip`] and move on.

use crate::error::{LineIoError, Result};
use crate::file_handler::record::{JsonObject, Record};
use std::path::Path;

/// Characters trimmed around a JSON line, trailing CSV-style comma included
const JSON_TRIM_CHARS: &[char] = &[',', ' ', '\t', '\n', '\r', '\0', '\x0B'];

/// Validate that a path exists and is a regular file
pub fn validate_file_path(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LineIoError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => LineIoError::file_error(
            format!("Failed to read metadata: {}", path.display()),
            e,
        ),
    })?;

    if !metadata.is_file() {
        return Err(LineIoError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

/// Turns a raw record into structured data, or rejects it
pub trait RecordValidator {
    type Output;

    fn validate(&self, record: &Record) -> Result<Self::Output>;
}

/// Result of reading one record during sequential consumption
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome<T> {
    /// Record at the cursor passed validation
    Valid(T),
    /// Record at the cursor was rejected; advance and retry
    Skip,
    /// Nothing left to read
    EndOfSource,
}

/// Structural check for CSV rows: must be a non-empty field list
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRecordValidator;

impl RecordValidator for CsvRecordValidator {
    type Output = Vec<String>;

    fn validate(&self, record: &Record) -> Result<Vec<String>> {
        match record {
            Record::Fields(fields) if fields.is_empty() => Err(LineIoError::invalid_record(
                "Empty row cannot be mapped.",
            )),
            Record::Fields(fields) => Ok(fields.clone()),
            Record::Line(_) => Err(LineIoError::invalid_record(
                "Given data is not a valid field list.",
            )),
        }
    }
}

/// Decodes a line into a JSON object
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRecordValidator;

impl JsonRecordValidator {
    /// Decode raw text; arrays, scalars and null are rejected
    pub fn validate_str(&self, raw: &str) -> Result<JsonObject> {
        match serde_json::from_str(raw.trim_matches(JSON_TRIM_CHARS)) {
            Ok(serde_json::Value::Object(object)) => Ok(object),
            Ok(_) => Err(LineIoError::invalid_record(
                "Invalid JSON string given: not an object.",
            )),
            Err(e) => Err(LineIoError::invalid_record(format!(
                "Invalid JSON string given: {e}"
            ))),
        }
    }
}

impl RecordValidator for JsonRecordValidator {
    type Output = JsonObject;

    fn validate(&self, record: &Record) -> Result<JsonObject> {
        match record {
            Record::Line(line) => self.validate_str(line),
            Record::Fields(_) => Err(LineIoError::invalid_record(
                "JSON records must be read as raw lines.",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_validate_existing_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"a\n").unwrap();
        assert!(validate_file_path(file.path()).is_ok());

        // Empty files are valid sources with zero lines
        let empty = NamedTempFile::new().unwrap();
        assert!(validate_file_path(empty.path()).is_ok());
    }

    #[test]
    fn test_validate_nonexistent_file() {
        let result = validate_file_path(Path::new("/this/file/does/not/exist.csv"));
        match result {
            Err(LineIoError::FileNotFound { path }) => {
                assert_eq!(path, Path::new("/this/file/does/not/exist.csv"));
            }
            other => panic!("Expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_directory() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            validate_file_path(dir.path()),
            Err(LineIoError::NotAFile { .. })
        ));
    }

    #[test]
    fn test_csv_validator() {
        let validator = CsvRecordValidator;

        let row = Record::Fields(vec!["a".to_string(), String::new()]);
        assert_eq!(
            validator.validate(&row).unwrap(),
            vec!["a".to_string(), String::new()]
        );

        // A blank line tokenizes to one empty field, which is still a list
        let blank = Record::Fields(vec![String::new()]);
        assert!(validator.validate(&blank).is_ok());

        assert!(validator
            .validate(&Record::Fields(Vec::new()))
            .unwrap_err()
            .is_invalid_record());
        assert!(validator
            .validate(&Record::Line("a,b".to_string()))
            .unwrap_err()
            .is_invalid_record());
    }

    #[test]
    fn test_json_validator_accepts_objects() {
        let validator = JsonRecordValidator;

        let object = validator.validate_str(r#"{"id": 1, "name": "a"}"#).unwrap();
        assert_eq!(object["id"], 1);

        // Trailing delimiter and whitespace from array-style dumps
        let object = validator.validate_str("  {\"id\": 2},\r\n").unwrap();
        assert_eq!(object["id"], 2);
    }

    #[test]
    fn test_json_validator_rejects_non_objects() {
        let validator = JsonRecordValidator;

        for raw in ["[1, 2]", "42", "\"text\"", "null", "", "{broken", "true"] {
            let err = validator.validate_str(raw).unwrap_err();
            assert!(err.is_invalid_record(), "{raw} should be rejected");
        }

        let fields = Record::Fields(vec!["{}".to_string()]);
        assert!(validator.validate(&fields).is_err());
    }
}
