//! Compression detection, transparent gzip decompression and size estimation.
//!
//! Gzip detection uses the magic number (file signature) first and falls back to
//! the file extension. Decompression is delegated to `flate2`. The uncompressed
//! size of an archive is asked of an external listing tool (`gzip --list`), with a
//! fixed-ratio estimate when the tool is unavailable.

use crate::error::{LineIoError, Result};
use bstr::ByteSlice;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::process::Command;
use tempfile::NamedTempFile;

/// Gzip magic number (RFC 1952)
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Default multiplier applied to the compressed size when estimating
pub const DEFAULT_ESTIMATE_RATIO: u64 = 5;

/// Supported compression formats for transparent file access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// No compression - plain text file
    None,
    /// Gzip compression (.gz files)
    Gzip,
}

impl CompressionType {
    /// Get human-readable name for the compression type
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
        }
    }

    /// Check if this type represents a compressed format
    pub fn is_compressed(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Detect compression type from magic numbers, then from the file extension
pub fn detect_compression(path: &Path) -> Result<CompressionType> {
    if let Ok(mut file) = File::open(path) {
        let mut buffer = [0u8; 2];
        let bytes_read = file.read(&mut buffer).unwrap_or(0);

        if let Some(format) = detect_by_magic(&buffer[..bytes_read]) {
            return Ok(format);
        }
    }

    Ok(detect_by_extension(path).unwrap_or(CompressionType::None))
}

fn detect_by_magic(magic: &[u8]) -> Option<CompressionType> {
    if magic.starts_with(&GZIP_MAGIC) {
        Some(CompressionType::Gzip)
    } else {
        None
    }
}

fn detect_by_extension(path: &Path) -> Option<CompressionType> {
    let ext = path.extension()?.to_str()?;
    match ext.to_lowercase().as_str() {
        "gz" | "gzip" => Some(CompressionType::Gzip),
        _ => None,
    }
}

/// Decompress a gzip file entirely into memory
pub fn decompress_to_memory(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path)
        .map_err(|e| LineIoError::file_error("Failed to open compressed file", e))?;

    let mut data = Vec::new();
    MultiGzDecoder::new(BufReader::new(file))
        .read_to_end(&mut data)
        .map_err(|e| LineIoError::file_error("Failed to decompress file", e))?;

    Ok(data)
}

/// Decompress a gzip file into a temporary file
pub fn decompress_to_temp_file(path: &Path) -> Result<NamedTempFile> {
    let file = File::open(path)
        .map_err(|e| LineIoError::file_error("Failed to open compressed file", e))?;
    let mut decoder = MultiGzDecoder::new(BufReader::new(file));

    let mut temp_file = NamedTempFile::new()
        .map_err(|e| LineIoError::file_error("Failed to create temp file", e))?;

    {
        let mut writer = BufWriter::new(temp_file.as_file_mut());
        std::io::copy(&mut decoder, &mut writer)
            .map_err(|e| LineIoError::file_error("Failed to decompress file", e))?;
        writer
            .flush()
            .map_err(|e| LineIoError::file_error("Failed to flush temp file", e))?;
    }

    Ok(temp_file)
}

/// Result of a size lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeEstimate {
    /// False when `size` is the heuristic estimate
    pub exact: bool,
    pub size: u64,
}

/// Uncompressed size lookup for a compressed archive
pub trait SizeEstimator: std::fmt::Debug {
    fn estimate(&self, path: &Path) -> Result<SizeEstimate>;
}

/// Asks `<tool> --list <path>` for the uncompressed size
///
/// Falls back to `compressed size * ratio` whenever the tool cannot be run, exits
/// with a non-zero status, or prints something unparsable. Callers must treat the
/// result as approximate either way: gzip records sizes modulo 2^32.
#[derive(Debug, Clone)]
pub struct GzipListEstimator {
    tool: String,
    ratio: u64,
}

impl GzipListEstimator {
    pub fn new(tool: impl Into<String>, ratio: u64) -> Self {
        Self {
            tool: tool.into(),
            ratio,
        }
    }

    fn list(&self, path: &Path) -> Option<u64> {
        let output = match Command::new(&self.tool).arg("--list").arg(path).output() {
            Ok(output) => output,
            Err(e) => {
                log::warn!("Cannot run {} --list: {}", self.tool, e);
                return None;
            }
        };

        if !output.status.success() {
            log::warn!(
                "{} --list {} exited with {}",
                self.tool,
                path.display(),
                output.status
            );
            return None;
        }

        parse_list_output(&output.stdout)
    }

    fn heuristic(&self, path: &Path) -> Result<SizeEstimate> {
        let compressed = std::fs::metadata(path)
            .map_err(|e| LineIoError::file_error("Failed to read compressed file metadata", e))?
            .len();

        Ok(SizeEstimate {
            exact: false,
            size: compressed.saturating_mul(self.ratio),
        })
    }
}

impl Default for GzipListEstimator {
    fn default() -> Self {
        Self::new("gzip", DEFAULT_ESTIMATE_RATIO)
    }
}

impl SizeEstimator for GzipListEstimator {
    fn estimate(&self, path: &Path) -> Result<SizeEstimate> {
        match self.list(path) {
            Some(size) => Ok(SizeEstimate { exact: true, size }),
            None => {
                let estimate = self.heuristic(path)?;
                log::warn!(
                    "Using estimated size {} for {} (ratio {})",
                    estimate.size,
                    path.display(),
                    self.ratio
                );
                Ok(estimate)
            }
        }
    }
}

/// Parse the uncompressed size out of `gzip --list` output
///
/// The last non-empty line is the data row; its second whitespace separated
/// field is the uncompressed byte count.
fn parse_list_output(stdout: &[u8]) -> Option<u64> {
    let row = stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .last()?;

    row.fields().nth(1)?.to_str().ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn write_gzip(content: &[u8]) -> NamedTempFile {
        let temp_file = NamedTempFile::new().unwrap();
        let file = File::create(temp_file.path()).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(content).unwrap();
        encoder.finish().unwrap();
        temp_file
    }

    #[test]
    fn test_detect_gzip_magic() {
        assert_eq!(
            detect_by_magic(&[0x1f, 0x8b, 0x08, 0x00]),
            Some(CompressionType::Gzip)
        );
        assert_eq!(detect_by_magic(&[0x1f]), None);
        assert_eq!(detect_by_magic(&[0x00, 0x00]), None);
    }

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(
            detect_by_extension(Path::new("file.csv.gz")),
            Some(CompressionType::Gzip)
        );
        assert_eq!(
            detect_by_extension(Path::new("FILE.GZ")),
            Some(CompressionType::Gzip)
        );
        assert_eq!(detect_by_extension(Path::new("file.csv")), None);
        assert_eq!(detect_by_extension(Path::new("file")), None);
    }

    #[test]
    fn test_compression_type_methods() {
        assert!(!CompressionType::None.is_compressed());
        assert!(CompressionType::Gzip.is_compressed());
        assert_eq!(CompressionType::Gzip.name(), "gzip");
    }

    #[test]
    fn test_detect_compression_with_gzip_file() {
        let gz = write_gzip(b"a\nb\n");
        assert_eq!(detect_compression(gz.path()).unwrap(), CompressionType::Gzip);

        let plain = NamedTempFile::new().unwrap();
        std::fs::write(plain.path(), b"a\nb\n").unwrap();
        assert_eq!(detect_compression(plain.path()).unwrap(), CompressionType::None);
    }

    #[test]
    fn test_decompress_to_memory_and_temp_file() {
        let gz = write_gzip(b"line 1\nline 2\n");

        assert_eq!(decompress_to_memory(gz.path()).unwrap(), b"line 1\nline 2\n");

        let temp = decompress_to_temp_file(gz.path()).unwrap();
        assert_eq!(std::fs::read(temp.path()).unwrap(), b"line 1\nline 2\n");
    }

    #[test]
    fn test_parse_list_output() {
        let output = b"         compressed        uncompressed  ratio uncompressed_name\n                 52                 123  70.7% /tmp/data.csv\n";
        assert_eq!(parse_list_output(output), Some(123));

        assert_eq!(parse_list_output(b""), None);
        assert_eq!(parse_list_output(b"garbage\n"), None);
        assert_eq!(parse_list_output(b"1 not-a-number 3\n"), None);
    }

    #[test]
    fn test_estimate_falls_back_when_tool_missing() {
        let gz = write_gzip(b"some content that compresses\n");
        let compressed = std::fs::metadata(gz.path()).unwrap().len();

        let estimator = GzipListEstimator::new("lineio-no-such-gzip-tool", 5);
        let estimate = estimator.estimate(gz.path()).unwrap();

        assert!(!estimate.exact);
        assert_eq!(estimate.size, compressed * 5);
    }

    #[test]
    fn test_estimate_with_system_gzip() {
        // Only meaningful where a gzip binary is installed
        let available = Command::new("gzip")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        if !available {
            return;
        }

        let content = b"alpha,beta,gamma\n".repeat(40);
        let gz = write_gzip(&content);
        let estimate = GzipListEstimator::default().estimate(gz.path()).unwrap();

        assert!(estimate.exact);
        assert_eq!(estimate.size, content.len() as u64);
    }
}
