//! Flag-driven line cursor over a byte source.
//!
//! `LineFile` owns its bytes, a lazily built [`LineIndex`], the active
//! [`LineFlags`], the CSV control tuple and the cursor position. Every
//! `current()`/`next()` goes through the same pipeline:
//!
//! 1. slice the raw line out of the source via the index
//! 2. DROP_NEWLINE strips the terminator
//! 3. decode UTF-8, tokenize when READ_CSV is set
//! 4. strip the BOM when the position is 0 and BOM removal is on
//! 5. SKIP_EMPTY moves past empty records
//!
//! With READ_AHEAD the pipeline runs when the cursor moves and the result is
//! buffered; without it the pipeline (including empty skipping) runs inside
//! `current()`, so `key()`/`eof()` can lag behind until then.

use crate::error::{LineIoError, Result};
use crate::file_handler::compression::{
    CompressionType, GzipListEstimator, SizeEstimate, SizeEstimator,
};
use crate::file_handler::csv_file::{tokenize, CsvControl};
use crate::file_handler::cursor::LineCursor;
use crate::file_handler::factory::LineFileFactory;
use crate::file_handler::flags::LineFlags;
use crate::file_handler::line_index::LineIndex;
use crate::file_handler::record::Record;
use crate::file_handler::source::ByteSource;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// Line-by-line reader with configurable read behaviours
#[derive(Debug)]
pub struct LineFile {
    source: ByteSource,
    /// RefCell because lookups from `&self` (`eof`) extend the index
    index: RefCell<LineIndex>,
    path: Option<PathBuf>,
    compression: CompressionType,
    flags: LineFlags,
    csv_control: CsvControl,
    remove_bom: bool,
    position: u64,
    /// Record materialized by READ_AHEAD at `position`
    buffered: Option<Record>,
    estimator: Box<dyn SizeEstimator>,
}

impl LineFile {
    /// Wrap an already opened byte source
    pub fn new(source: ByteSource, path: Option<PathBuf>, compression: CompressionType) -> Self {
        Self {
            source,
            index: RefCell::new(LineIndex::new()),
            path,
            compression,
            flags: LineFlags::empty(),
            csv_control: CsvControl::default(),
            remove_bom: false,
            position: 0,
            buffered: None,
            estimator: Box::new(GzipListEstimator::default()),
        }
    }

    /// Open a file, detecting gzip compression
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        LineFileFactory::open(path.as_ref())
    }

    /// Open a file with an explicit compression type
    pub fn open_with(path: impl AsRef<Path>, compression: CompressionType) -> Result<Self> {
        LineFileFactory::open_with(path.as_ref(), compression)
    }

    /// In-memory source, no backing file
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::new(ByteSource::InMemory(data.into()), None, CompressionType::None)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn compression(&self) -> CompressionType {
        self.compression
    }

    pub fn flags(&self) -> LineFlags {
        self.flags
    }

    /// Enable or disable a read flag
    pub fn set_flag(&mut self, flag: LineFlags, enable: bool) -> &mut Self {
        self.flags.set(flag, enable);
        self.buffered = None;
        self
    }

    /// Replace every read flag at once
    pub fn set_flags(&mut self, flags: LineFlags) -> &mut Self {
        self.flags = flags;
        self.buffered = None;
        self
    }

    pub fn skip_empty_lines(&mut self, enable: bool) -> &mut Self {
        self.set_flag(LineFlags::SKIP_EMPTY, enable)
    }

    pub fn drop_new_lines(&mut self, enable: bool) -> &mut Self {
        self.set_flag(LineFlags::DROP_NEWLINE, enable)
    }

    pub fn read_csv(&mut self, enable: bool) -> &mut Self {
        self.set_flag(LineFlags::READ_CSV, enable)
    }

    pub fn read_ahead(&mut self, enable: bool) -> &mut Self {
        self.set_flag(LineFlags::READ_AHEAD, enable)
    }

    /// Strip a UTF-8 BOM from the record at position 0
    pub fn remove_bom(&mut self, enable: bool) -> &mut Self {
        self.remove_bom = enable;
        self.buffered = None;
        self
    }

    pub fn csv_control(&self) -> CsvControl {
        self.csv_control
    }

    pub fn set_csv_control(&mut self, control: CsvControl) -> &mut Self {
        self.csv_control = control;
        self.buffered = None;
        self
    }

    /// Replace the collaborator used to size compressed sources
    pub fn set_size_estimator(&mut self, estimator: Box<dyn SizeEstimator>) -> &mut Self {
        self.estimator = estimator;
        self
    }

    /// Raw bytes of `line`, terminator included
    pub fn raw_line(&self, line: u64) -> Option<&[u8]> {
        let data = self.source.as_bytes();
        let (start, end) = self.index.borrow_mut().line_span(data, line)?;
        Some(&data[start..end])
    }

    /// Text of `line` without its terminator, ignoring every flag
    pub fn raw_text(&self, line: u64) -> Result<Option<&str>> {
        match self.raw_line(line) {
            Some(bytes) => Ok(Some(decode(trim_newline(bytes), line)?)),
            None => Ok(None),
        }
    }

    /// Record at `line` with flags applied, without empty skipping
    pub fn record_at(&self, line: u64) -> Result<Option<Record>> {
        let Some(mut bytes) = self.raw_line(line) else {
            return Ok(None);
        };

        if self.flags.contains(LineFlags::DROP_NEWLINE) {
            bytes = trim_newline(bytes);
        }

        let text = decode(bytes, line)?;
        let mut record = if self.flags.contains(LineFlags::READ_CSV) {
            Record::Fields(tokenize(text, &self.csv_control))
        } else {
            Record::Line(text.to_string())
        };

        if self.remove_bom && line == 0 {
            record.strip_bom();
        }

        Ok(Some(record))
    }

    /// Number of lines in the source; the cursor ends up rewound
    pub fn count_lines(&mut self) -> Result<u64> {
        self.seek(u64::MAX)?;
        let lines = self.key();
        self.rewind()?;

        Ok(lines)
    }

    /// Size of the content in bytes
    ///
    /// Exact for plain sources. Compressed files ask the size estimator, which may
    /// answer with an approximation.
    pub fn size(&self) -> Result<SizeEstimate> {
        match (&self.path, self.compression.is_compressed()) {
            (Some(path), true) => self.estimator.estimate(path),
            _ => Ok(SizeEstimate {
                exact: true,
                size: self.source.len(),
            }),
        }
    }

    /// Resolve SKIP_EMPTY from the current position and return the record there
    fn settle(&mut self) -> Result<Option<Record>> {
        loop {
            match self.record_at(self.position)? {
                Some(record)
                    if self.flags.contains(LineFlags::SKIP_EMPTY) && record.is_empty() =>
                {
                    self.position += 1;
                }
                other => return Ok(other),
            }
        }
    }

    /// Buffer the record at the cursor under READ_AHEAD
    ///
    /// A line that fails to decode is left unbuffered; `current()` reports it.
    fn refill(&mut self) -> Result<()> {
        self.buffered = None;
        if self.flags.contains(LineFlags::READ_AHEAD) {
            match self.settle() {
                Ok(record) => self.buffered = record,
                Err(LineIoError::InvalidEncoding { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl LineCursor for LineFile {
    type Item = Record;

    fn rewind(&mut self) -> Result<()> {
        self.position = 0;
        self.refill()
    }

    fn next(&mut self) -> Result<()> {
        if self.raw_line(self.position).is_some() {
            self.position += 1;
        }
        self.refill()
    }

    fn seek(&mut self, line: u64) -> Result<()> {
        self.position = if self.raw_line(line).is_some() {
            line
        } else {
            self.index.borrow_mut().line_count(self.source.as_bytes())
        };
        self.refill()
    }

    fn current(&mut self) -> Result<Option<Record>> {
        if let Some(record) = &self.buffered {
            return Ok(Some(record.clone()));
        }

        let record = self.settle()?;
        if self.flags.contains(LineFlags::READ_AHEAD) {
            self.buffered = record.clone();
        }
        Ok(record)
    }

    fn key(&self) -> u64 {
        self.position
    }

    fn eof(&self) -> bool {
        self.raw_line(self.position).is_none()
    }
}

/// Strip a trailing `\n` and the `\r` before it
fn trim_newline(bytes: &[u8]) -> &[u8] {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    bytes.strip_suffix(b"\r").unwrap_or(bytes)
}

fn decode(bytes: &[u8], line: u64) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|_| LineIoError::InvalidEncoding { line })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> Record {
        Record::Line(text.to_string())
    }

    fn collect(file: &mut LineFile) -> Vec<(u64, Record)> {
        file.records().collect::<Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn test_plain_iteration_keeps_newlines() {
        let mut file = LineFile::from_bytes("a\nb\r\nc");

        assert_eq!(
            collect(&mut file),
            vec![(0, line("a\n")), (1, line("b\r\n")), (2, line("c"))]
        );
        assert!(file.eof());
    }

    #[test]
    fn test_drop_newline() {
        let mut file = LineFile::from_bytes("a\nb\r\nc\n");
        file.drop_new_lines(true);

        let lines: Vec<Record> = collect(&mut file).into_iter().map(|(_, r)| r).collect();
        assert_eq!(lines, vec![line("a"), line("b"), line("c")]);
    }

    #[test]
    fn test_skip_empty_reports_underlying_keys() {
        let mut file = LineFile::from_bytes("a\n\nb\n\n\nc\n\n");
        file.drop_new_lines(true).skip_empty_lines(true).read_ahead(true);

        assert_eq!(
            collect(&mut file),
            vec![(0, line("a")), (2, line("b")), (5, line("c"))]
        );
        assert!(file.eof());
    }

    #[test]
    fn test_skip_empty_without_read_ahead_resolves_lazily() {
        let mut file = LineFile::from_bytes("a\n\n\n");
        file.drop_new_lines(true).skip_empty_lines(true);

        file.next().unwrap();
        // Still parked on the empty line until current() runs the skip loop
        assert_eq!(file.key(), 1);
        assert!(!file.eof());

        assert_eq!(file.current().unwrap(), None);
        assert_eq!(file.key(), 3);
        assert!(file.eof());
    }

    #[test]
    fn test_skip_empty_with_read_ahead_resolves_on_advance() {
        let mut file = LineFile::from_bytes("a\n\n\n");
        file.drop_new_lines(true).skip_empty_lines(true).read_ahead(true);

        file.next().unwrap();
        assert_eq!(file.key(), 3);
        assert!(file.eof());
    }

    #[test]
    fn test_without_drop_newline_blank_lines_are_not_empty() {
        let mut file = LineFile::from_bytes("a\n\nb");
        file.skip_empty_lines(true).read_ahead(true);

        assert_eq!(collect(&mut file).len(), 3);
    }

    #[test]
    fn test_csv_tokenization_and_empty_rows() {
        let mut file = LineFile::from_bytes("id,name\n\n1,\"Doe, Jane\"\n,\n");
        file.drop_new_lines(true)
            .read_csv(true)
            .skip_empty_lines(true)
            .read_ahead(true);

        let rows: Vec<(u64, Record)> = collect(&mut file);
        assert_eq!(
            rows,
            vec![
                (
                    0,
                    Record::Fields(vec!["id".to_string(), "name".to_string()])
                ),
                (
                    2,
                    Record::Fields(vec!["1".to_string(), "Doe, Jane".to_string()])
                ),
            ]
        );
    }

    #[test]
    fn test_bom_removed_only_on_first_line() {
        let mut file = LineFile::from_bytes("\u{feff}first\n\u{feff}second\n");
        file.drop_new_lines(true).remove_bom(true);

        assert_eq!(file.current().unwrap(), Some(line("first")));
        file.next().unwrap();
        assert_eq!(file.current().unwrap(), Some(line("\u{feff}second")));

        // Keyed on position 0, so it applies again after a rewind
        file.rewind().unwrap();
        assert_eq!(file.current().unwrap(), Some(line("first")));
    }

    #[test]
    fn test_bom_kept_when_disabled() {
        let mut file = LineFile::from_bytes("\u{feff}first\n");
        file.drop_new_lines(true);

        assert_eq!(file.current().unwrap(), Some(line("\u{feff}first")));
    }

    #[test]
    fn test_bom_removed_from_first_csv_field() {
        let mut file = LineFile::from_bytes("\u{feff}id;name\n");
        file.drop_new_lines(true).read_csv(true).remove_bom(true);
        file.set_csv_control(CsvControl::default().with_delimiter(b';'));

        assert_eq!(
            file.current().unwrap(),
            Some(Record::Fields(vec!["id".to_string(), "name".to_string()]))
        );

        // Only position 0 is touched
        file.next().unwrap();
        assert_eq!(file.current().unwrap(), None);

        let mut file = LineFile::from_bytes("\u{feff}a,b\n\u{feff}c,d\n");
        file.drop_new_lines(true).read_csv(true).remove_bom(true);
        file.next().unwrap();
        assert_eq!(
            file.current().unwrap(),
            Some(Record::Fields(vec!["\u{feff}c".to_string(), "d".to_string()]))
        );
    }

    #[test]
    fn test_csv_bom_kept_when_disabled() {
        let mut file = LineFile::from_bytes("\u{feff}a,b\n\u{feff}c,d\n");
        file.drop_new_lines(true).read_csv(true);

        assert_eq!(
            file.current().unwrap(),
            Some(Record::Fields(vec!["\u{feff}a".to_string(), "b".to_string()]))
        );
        file.next().unwrap();
        assert_eq!(
            file.current().unwrap(),
            Some(Record::Fields(vec!["\u{feff}c".to_string(), "d".to_string()]))
        );
    }

    #[test]
    fn test_seek_and_clamp() {
        let mut file = LineFile::from_bytes("l0\nl1\nl2\nl3\n");
        file.drop_new_lines(true);

        file.seek(2).unwrap();
        assert_eq!(file.key(), 2);
        assert_eq!(file.current().unwrap(), Some(line("l2")));

        file.seek(100).unwrap();
        assert_eq!(file.key(), 4);
        assert!(file.eof());
        assert_eq!(file.current().unwrap(), None);

        // next() past the end stays put
        file.next().unwrap();
        assert_eq!(file.key(), 4);

        file.rewind().unwrap();
        assert_eq!(file.key(), 0);
        assert_eq!(file.current().unwrap(), Some(line("l0")));
    }

    #[test]
    fn test_count_lines_rewinds() {
        let mut file = LineFile::from_bytes("a\nb\n\nc");
        file.drop_new_lines(true);
        file.seek(2).unwrap();

        assert_eq!(file.count_lines().unwrap(), 4);
        assert_eq!(file.key(), 0);

        assert_eq!(LineFile::from_bytes("").count_lines().unwrap(), 0);
        assert_eq!(LineFile::from_bytes("x\n").count_lines().unwrap(), 1);
    }

    #[test]
    fn test_flag_change_drops_buffered_record() {
        let mut file = LineFile::from_bytes("a;b\n");
        file.read_ahead(true).drop_new_lines(true);
        file.rewind().unwrap();
        assert_eq!(file.current().unwrap(), Some(line("a;b")));

        file.read_csv(true);
        file.set_csv_control(CsvControl::default().with_delimiter(b';'));
        assert_eq!(
            file.current().unwrap(),
            Some(Record::Fields(vec!["a".to_string(), "b".to_string()]))
        );
    }

    #[test]
    fn test_invalid_utf8_is_reported_with_line() {
        let mut file = LineFile::from_bytes(b"ok\n\xff\xfe\n".to_vec());
        file.next().unwrap();

        match file.current() {
            Err(LineIoError::InvalidEncoding { line }) => assert_eq!(line, 1),
            other => panic!("Expected InvalidEncoding, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_utf8_under_read_ahead_surfaces_on_current() {
        let mut file = LineFile::from_bytes(b"ok\n\n\xff\xfe\nnext\n".to_vec());
        file.set_flags(LineFlags::READ_AHEAD | LineFlags::SKIP_EMPTY | LineFlags::DROP_NEWLINE);

        file.next().unwrap();
        assert_eq!(file.key(), 2);
        assert!(matches!(
            file.current(),
            Err(LineIoError::InvalidEncoding { line: 2 })
        ));

        file.next().unwrap();
        assert_eq!(file.current().unwrap(), Some(line("next")));
    }

    #[test]
    fn test_in_memory_size_is_exact() {
        let file = LineFile::from_bytes("abc\n");
        assert_eq!(
            file.size().unwrap(),
            SizeEstimate {
                exact: true,
                size: 4
            }
        );
    }
}
