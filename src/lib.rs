//! # lineio - Line-Oriented File Access and Path Reconciliation
//!
//! Reads plain, CSV, line-delimited JSON and gzip files one line at a time under
//! a set of configurable read behaviours, and reconciles filesystem path strings.
//!
//! ## Features
//!
//! - **Flag-Driven Iteration**: skip empty lines, drop terminators, tokenize CSV,
//!   read ahead, strip a leading BOM
//! - **CSV Support**: delimiter auto-detection and header-aware reading
//! - **JSON Lines**: invalid lines are skipped, valid objects are yielded
//! - **Compression Support**: transparent gzip decoding, uncompressed size lookup
//! - **Path Strings**: normalize, decompose, extract relative parts, join with
//!   overlap detection
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`file_handler`] - Line cursors over in-memory or memory-mapped sources
//! - [`path`] - String-only path reconciliation
//! - [`config`] - TOML configuration for reader defaults
//!
//! ```
//! use lineio::file_handler::{LineCursor, LineFile, LineFlags, Record};
//!
//! let mut file = LineFile::from_bytes("a\n\nb\n");
//! file.set_flags(LineFlags::SKIP_EMPTY | LineFlags::DROP_NEWLINE);
//!
//! let lines: Vec<(u64, Record)> = file.records().collect::<lineio::Result<_>>().unwrap();
//! assert_eq!(lines, vec![(0, Record::Line("a".into())), (2, Record::Line("b".into()))]);
//! ```

pub mod config;
pub mod error;
pub mod file_handler;
pub mod path;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::{LineIoError, Result};
pub use file_handler::{CsvFile, JsonFile, LineCursor, LineFile, LineFlags, Record};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
