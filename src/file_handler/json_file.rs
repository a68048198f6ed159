//! Line-delimited JSON reader that skips records which are not JSON objects.

use crate::error::{LineIoError, Result};
use crate::file_handler::cursor::LineCursor;
use crate::file_handler::flags::LineFlags;
use crate::file_handler::line_file::LineFile;
use crate::file_handler::record::JsonObject;
use crate::file_handler::validation::{JsonRecordValidator, RecordOutcome, RecordValidator};
use std::path::Path;

/// Reader yielding one JSON object per valid line
///
/// Opens with READ_AHEAD, SKIP_EMPTY and DROP_NEWLINE enabled. Lines that do not
/// decode to an object are skipped during sequential reads.
#[derive(Debug)]
pub struct JsonFile {
    inner: LineFile,
    validator: JsonRecordValidator,
}

impl JsonFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_line_file(LineFile::open(path)?))
    }

    pub fn from_line_file(mut inner: LineFile) -> Self {
        inner.set_flag(
            LineFlags::READ_AHEAD | LineFlags::SKIP_EMPTY | LineFlags::DROP_NEWLINE,
            true,
        );

        Self {
            inner,
            validator: JsonRecordValidator,
        }
    }

    pub fn inner(&self) -> &LineFile {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut LineFile {
        &mut self.inner
    }

    /// Decode the record at the cursor without moving it
    pub fn read_record(&mut self) -> Result<RecordOutcome<JsonObject>> {
        let record = match self.inner.current() {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(RecordOutcome::EndOfSource),
            Err(e @ LineIoError::InvalidEncoding { .. }) => {
                log::debug!("Skipping line {}: {}", self.inner.key(), e);
                return Ok(RecordOutcome::Skip);
            }
            Err(e) => return Err(e),
        };

        match self.validator.validate(&record) {
            Ok(object) => Ok(RecordOutcome::Valid(object)),
            Err(e) if e.is_invalid_record() => {
                log::debug!("Skipping line {}: {}", self.inner.key(), e);
                Ok(RecordOutcome::Skip)
            }
            Err(e) => Err(e),
        }
    }

    /// Decode a single line outside of iteration
    pub fn validate(&self, raw: &str) -> Result<JsonObject> {
        self.validator.validate_str(raw)
    }
}

impl LineCursor for JsonFile {
    type Item = JsonObject;

    fn rewind(&mut self) -> Result<()> {
        self.inner.rewind()
    }

    fn next(&mut self) -> Result<()> {
        self.inner.next()
    }

    fn seek(&mut self, line: u64) -> Result<()> {
        self.inner.seek(line)
    }

    /// Next valid object at or after the cursor; invalid lines are stepped over
    fn current(&mut self) -> Result<Option<JsonObject>> {
        loop {
            match self.read_record()? {
                RecordOutcome::Valid(object) => return Ok(Some(object)),
                RecordOutcome::Skip => self.inner.next()?,
                RecordOutcome::EndOfSource => return Ok(None),
            }
        }
    }

    fn key(&self) -> u64 {
        self.inner.key()
    }

    fn eof(&self) -> bool {
        self.inner.eof()
    }
}
