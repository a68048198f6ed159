//! Line-oriented writer for plain and gzip files.

use crate::error::{LineIoError, Result};
use crate::file_handler::csv_file::CsvControl;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

enum Sink {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Plain(writer) => writer.write(buf),
            Sink::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Plain(writer) => writer.flush(),
            Sink::Gzip(encoder) => encoder.flush(),
        }
    }
}

/// Writes lines, CSV rows or JSON documents, one per line
///
/// Paths ending in `.gz` are gzip encoded. Appending to a gzip file adds a new
/// gzip member, which the reader decodes transparently. Call [`LineWriter::finish`]
/// to surface errors from the final flush.
pub struct LineWriter {
    sink: Sink,
    path: PathBuf,
}

impl LineWriter {
    /// Create or truncate `path`
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            LineIoError::file_error(format!("Failed to create file: {}", path.display()), e)
        })?;
        Ok(Self::wrap(file, path))
    }

    /// Open `path` for appending, creating it when missing
    pub fn append(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LineIoError::file_error(format!("Failed to open file: {}", path.display()), e)
            })?;
        Ok(Self::wrap(file, path))
    }

    fn wrap(file: File, path: &Path) -> Self {
        let writer = BufWriter::new(file);
        let is_gzip = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));

        let sink = if is_gzip {
            Sink::Gzip(GzEncoder::new(writer, Compression::default()))
        } else {
            Sink::Plain(writer)
        };

        Self {
            sink,
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `line` followed by `\n`
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        self.write_bytes(line.as_bytes())?;
        self.write_bytes(b"\n")
    }

    /// Write one delimited row using `control`
    pub fn write_csv<S: AsRef<str>>(&mut self, fields: &[S], control: &CsvControl) -> Result<()> {
        let mut writer = ::csv::WriterBuilder::new()
            .has_headers(false)
            .delimiter(control.delimiter)
            .quote(control.enclosure)
            .terminator(::csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer
            .write_record(fields.iter().map(|f| f.as_ref()))
            .map_err(|e| LineIoError::file_error("Failed to encode CSV row", e.into()))?;
        let row = writer
            .into_inner()
            .map_err(|e| LineIoError::file_error("Failed to encode CSV row", e.into_error()))?;

        self.write_bytes(&row)
    }

    /// Write `value` as compact JSON followed by `\n`
    pub fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let json = serde_json::to_vec(value)
            .map_err(|e| LineIoError::invalid_argument(format!("Cannot encode JSON: {e}")))?;
        self.write_bytes(&json)?;
        self.write_bytes(b"\n")
    }

    /// Flush buffers and close the gzip stream
    pub fn finish(self) -> Result<()> {
        let flushed = match self.sink {
            Sink::Plain(mut writer) => writer.flush(),
            Sink::Gzip(encoder) => encoder.finish().and_then(|mut writer| writer.flush()),
        };
        flushed.map_err(|e| LineIoError::file_error("Failed to flush file", e))
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.sink.write_all(bytes).map_err(|e| {
            LineIoError::file_error(format!("Failed to write to {}", self.path.display()), e)
        })
    }
}
