//! Line-oriented file access.
//!
//! Files are opened through [`LineFileFactory`], which picks an in-memory or
//! memory-mapped [`ByteSource`] and decompresses gzip transparently. A
//! [`LineFile`] walks the lines of a source under a set of [`LineFlags`];
//! [`CsvFile`] and [`JsonFile`] layer header handling and record validation on
//! top of it.

pub mod compression;
pub mod csv_file;
pub mod cursor;
pub mod factory;
pub mod flags;
pub mod json_file;
pub mod line_file;
pub mod line_index;
pub mod listing;
pub mod ops;
pub mod record;
pub mod source;
pub mod validation;
pub mod writer;

pub use compression::{
    detect_compression, CompressionType, GzipListEstimator, SizeEstimate, SizeEstimator,
};
pub use csv_file::{detect_delimiter, CsvControl, CsvFile};
pub use cursor::{LineCursor, Records};
pub use factory::LineFileFactory;
pub use flags::LineFlags;
pub use json_file::JsonFile;
pub use line_file::LineFile;
pub use listing::{filter_by_extension, list_files, SortOrder};
pub use record::{JsonObject, Record};
pub use source::ByteSource;
pub use validation::{
    validate_file_path, CsvRecordValidator, JsonRecordValidator, RecordOutcome, RecordValidator,
};
pub use writer::LineWriter;
