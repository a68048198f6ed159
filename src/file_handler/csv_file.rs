//! CSV tokenization, delimiter detection and the header-aware CSV reader.

use crate::error::{LineIoError, Result};
use crate::file_handler::cursor::LineCursor;
use crate::file_handler::flags::LineFlags;
use crate::file_handler::line_file::LineFile;
use crate::file_handler::record::{Record, BOM};
use crate::file_handler::validation::{CsvRecordValidator, RecordValidator};
use std::path::Path;

/// Delimiters always tried by auto-detection, in tie-break order
pub const COMMON_DELIMITERS: [u8; 4] = [b',', b';', b'|', b'\t'];

/// Delimiter, enclosure and escape characters used to tokenize a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvControl {
    pub delimiter: u8,
    pub enclosure: u8,
    pub escape: Option<u8>,
}

impl CsvControl {
    pub fn new(delimiter: u8, enclosure: u8, escape: Option<u8>) -> Self {
        Self {
            delimiter,
            enclosure,
            escape,
        }
    }

    /// Same enclosure and escape, different delimiter
    pub fn with_delimiter(self, delimiter: u8) -> Self {
        Self { delimiter, ..self }
    }
}

impl Default for CsvControl {
    fn default() -> Self {
        Self::new(b',', b'"', Some(b'\\'))
    }
}

/// Split one line into fields
///
/// A blank line yields a single empty field. Quoted fields are not allowed to
/// continue on the next line; an unterminated quote runs to the end of the line.
/// A leading BOM is kept on the first field.
pub fn tokenize(line: &str, control: &CsvControl) -> Vec<String> {
    // The csv reader drops a leading BOM on its own
    if let Some(rest) = line.strip_prefix(BOM) {
        let mut fields = tokenize(rest, control);
        if let Some(first) = fields.first_mut() {
            first.insert(0, BOM);
        }
        return fields;
    }

    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(control.delimiter)
        .quote(control.enclosure)
        .escape(control.escape)
        .from_reader(line.as_bytes());

    let mut record = ::csv::StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => record.iter().map(str::to_string).collect(),
        _ => vec![String::new()],
    }
}

/// Pick the delimiter that splits `header` into the most fields
///
/// Candidates are [`COMMON_DELIMITERS`] followed by `extra` (duplicates ignored);
/// ties go to the earliest candidate. Only the delimiter of the returned control
/// differs from `control`.
pub fn detect_delimiter(header: &str, control: &CsvControl, extra: &[u8]) -> CsvControl {
    let mut seen = Vec::with_capacity(COMMON_DELIMITERS.len() + extra.len());
    let mut best = (COMMON_DELIMITERS[0], 0usize);

    for candidate in COMMON_DELIMITERS.iter().chain(extra).copied() {
        if seen.contains(&candidate) {
            continue;
        }
        seen.push(candidate);

        let columns = tokenize(header, &control.with_delimiter(candidate)).len();
        if columns > best.1 {
            best = (candidate, columns);
        }
    }

    control.with_delimiter(best.0)
}

/// CSV reader that caches the first row as a header and can skip it
///
/// Opens with READ_AHEAD, SKIP_EMPTY, DROP_NEWLINE and READ_CSV enabled.
#[derive(Debug)]
pub struct CsvFile {
    inner: LineFile,
    header: Option<Record>,
    skip_header: bool,
    validator: CsvRecordValidator,
}

impl CsvFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_line_file(LineFile::open(path)?))
    }

    /// Wrap a line file, forcing the CSV read flags on
    pub fn from_line_file(mut inner: LineFile) -> Self {
        inner.set_flag(
            LineFlags::READ_AHEAD
                | LineFlags::SKIP_EMPTY
                | LineFlags::DROP_NEWLINE
                | LineFlags::READ_CSV,
            true,
        );

        Self {
            inner,
            header: None,
            skip_header: false,
            validator: CsvRecordValidator,
        }
    }

    pub fn inner(&self) -> &LineFile {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut LineFile {
        &mut self.inner
    }

    pub fn into_inner(self) -> LineFile {
        self.inner
    }

    pub fn csv_control(&self) -> CsvControl {
        self.inner.csv_control()
    }

    pub fn set_csv_control(&mut self, control: CsvControl) -> &mut Self {
        self.inner.set_csv_control(control);
        self
    }

    /// Detect the delimiter from the first line and make it active
    ///
    /// Reads line 0 directly, so the cursor position is unchanged.
    pub fn auto_detect_delimiter(&mut self, more_delimiters: &[u8]) -> Result<u8> {
        let control = self.inner.csv_control();
        let header = self.inner.raw_text(0)?.unwrap_or_default();
        let detected = detect_delimiter(header, &control, more_delimiters);

        log::debug!(
            "Detected CSV delimiter {:?} for {}",
            detected.delimiter as char,
            self.inner
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<memory>".to_string())
        );

        self.inner.set_csv_control(detected);
        Ok(detected.delimiter)
    }

    /// First record of the source, cached after the first successful read
    ///
    /// Reads position 0 literally: flags apply but empty rows are not skipped.
    pub fn header(&mut self) -> Result<Option<Record>> {
        if self.header.is_none() {
            self.header = self.inner.record_at(0)?;
        }
        Ok(self.header.clone())
    }

    /// Header as a field list
    pub fn header_fields(&mut self) -> Result<Vec<String>> {
        match self.header()? {
            Some(record) => self.validator.validate(&record),
            None => Err(LineIoError::invalid_record("Source has no header row.")),
        }
    }

    /// Toggle header skipping; when enabled at position 0 the cursor moves past it
    pub fn skip_header(&mut self, enable: bool) -> Result<&mut Self> {
        self.skip_header = enable;
        self.header()?;

        if enable && self.inner.key() == 0 {
            self.inner.next()?;
        }

        Ok(self)
    }

    pub fn is_skipping_header(&self) -> bool {
        self.skip_header
    }

    /// Structural check used by row mappers
    pub fn validate(&self, record: &Record) -> Result<Vec<String>> {
        self.validator.validate(record)
    }
}

impl LineCursor for CsvFile {
    type Item = Record;

    fn rewind(&mut self) -> Result<()> {
        self.inner.rewind()?;
        if self.skip_header {
            self.inner.next()?;
        }
        Ok(())
    }

    fn next(&mut self) -> Result<()> {
        self.inner.next()
    }

    fn seek(&mut self, line: u64) -> Result<()> {
        self.inner.seek(line)
    }

    fn current(&mut self) -> Result<Option<Record>> {
        self.inner.current()
    }

    fn key(&self) -> u64 {
        self.inner.key()
    }

    fn eof(&self) -> bool {
        self.inner.eof()
    }
}
