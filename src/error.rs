//! Error types and handling infrastructure for lineio.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! the library error type. The binary layers `anyhow` on top for context.
//!
//! ## Design Principles
//!
//! - **User-friendly messages**: Errors should provide actionable feedback
//! - **Context preservation**: Include the offending path or record where known
//! - **Consistency**: Standardized Result type across all modules

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for lineio operations.
///
/// Covers file access, record decoding and path reconciliation failures.
#[derive(Error, Debug)]
pub enum LineIoError {
    /// File system related errors with context
    #[error("File operation failed: {message}")]
    FileError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Source path does not exist when opening for read
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Path exists but is not a regular file
    #[error("Path is not a regular file: {path}")]
    NotAFile { path: PathBuf },

    /// Permission change refused or failed
    #[error("Permission denied for {path}: {message}")]
    PermissionDenied { path: PathBuf, message: String },

    /// A record could not be turned into structured data
    #[error("Invalid record: {message}")]
    InvalidRecord { message: String },

    /// Line content is not valid UTF-8
    #[error("Line {line} is not valid UTF-8")]
    InvalidEncoding { line: u64 },

    /// `relative()` base is not a prefix of the full path
    #[error("Invalid path {path}, should start with {base}")]
    PathPrefixMismatch { path: String, base: String },

    /// `relative()` remainder spans more than one segment
    #[error("Invalid path {path}, only one level after base path is allowed")]
    PathLevelViolation { path: String },

    /// `join()` found diverging segments without append mode
    #[error("Cannot join {root} & {relative}")]
    PathIncompatible { root: String, relative: String },

    /// File or directory removal refused or failed
    #[error("Cannot remove {path}: {message}")]
    RemovalFailed { path: PathBuf, message: String },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Invalid caller supplied argument
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

/// Standard Result type for lineio operations.
pub type Result<T> = std::result::Result<T, LineIoError>;

impl LineIoError {
    /// Create a FileError from an io::Error with additional context
    pub fn file_error(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileError {
            message: message.into(),
            source,
        }
    }

    /// Create an InvalidRecord error with a descriptive message
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Create a ConfigError with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an InvalidArgument error with a descriptive message
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// True for errors that only reject a single record
    pub fn is_invalid_record(&self) -> bool {
        matches!(self, Self::InvalidRecord { .. })
    }
}

// Automatic conversion from io::Error to LineIoError
impl From<std::io::Error> for LineIoError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            // The path is not known here; call sites that have it build FileNotFound
            std::io::ErrorKind::NotFound => Self::FileError {
                message: "File not found".to_string(),
                source: err,
            },
            std::io::ErrorKind::PermissionDenied => Self::FileError {
                message: "Permission denied".to_string(),
                source: err,
            },
            _ => Self::FileError {
                message: "IO operation failed".to_string(),
                source: err,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let path = PathBuf::from("/test/file.csv");

        let not_found = LineIoError::FileNotFound { path: path.clone() };
        assert_eq!(not_found.to_string(), "File not found: /test/file.csv");

        let not_a_file = LineIoError::NotAFile { path };
        assert_eq!(
            not_a_file.to_string(),
            "Path is not a regular file: /test/file.csv"
        );

        let incompatible = LineIoError::PathIncompatible {
            root: "/a/b".to_string(),
            relative: "/b/c".to_string(),
        };
        assert_eq!(incompatible.to_string(), "Cannot join /a/b & /b/c");
    }

    #[test]
    fn test_error_constructors() {
        let record_err = LineIoError::invalid_record("Invalid JSON string given.");
        assert!(record_err.is_invalid_record());

        let config_err = LineIoError::config("bad delimiter");
        assert!(matches!(config_err, LineIoError::ConfigError { .. }));
        assert!(!config_err.is_invalid_record());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: LineIoError = io_err.into();

        match err {
            LineIoError::FileError { message, .. } => {
                assert_eq!(message, "File not found");
            }
            _ => panic!("Expected FileError variant"),
        }
    }
}
