//! Factory for opening files as line cursors.
//!
//! The factory validates the path, detects compression and picks the byte source
//! strategy:
//!
//! - plain files under [`LineFileFactory::MEMORY_THRESHOLD`] are read into memory
//! - larger plain files are memory-mapped
//! - gzip files under [`LineFileFactory::COMPRESSED_MEMORY_THRESHOLD`] are
//!   decompressed into memory, larger ones into a temp file that is then mapped

use crate::error::{LineIoError, Result};
use crate::file_handler::compression::{
    decompress_to_memory, decompress_to_temp_file, detect_compression, CompressionType,
};
use crate::file_handler::line_file::LineFile;
use crate::file_handler::source::ByteSource;
use crate::file_handler::validation::validate_file_path;
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Opens files as [`LineFile`]s
pub struct LineFileFactory;

impl LineFileFactory {
    /// Plain files at or above this size are memory-mapped
    pub const MEMORY_THRESHOLD: u64 = 50 * 1024 * 1024;

    /// Compressed files at or above this size are decompressed to a temp file
    pub const COMPRESSED_MEMORY_THRESHOLD: u64 = 10 * 1024 * 1024;

    /// Open `path`, detecting gzip by magic bytes or extension
    pub fn open(path: &Path) -> Result<LineFile> {
        validate_file_path(path)?;
        let compression = detect_compression(path)?;
        Self::open_with(path, compression)
    }

    /// Open `path` with an explicit compression type
    pub fn open_with(path: &Path, compression: CompressionType) -> Result<LineFile> {
        validate_file_path(path)?;

        let source = match compression {
            CompressionType::Gzip => Self::open_compressed(path)?,
            CompressionType::None => Self::open_plain(path)?,
        };

        log::debug!(
            "Opened {} ({} compression, {} source, {} bytes)",
            path.display(),
            compression.name(),
            source.strategy(),
            source.len()
        );

        Ok(LineFile::new(source, Some(path.to_path_buf()), compression))
    }

    fn open_plain(path: &Path) -> Result<ByteSource> {
        let mut file = File::open(path).map_err(|e| {
            LineIoError::file_error(format!("Failed to open file: {}", path.display()), e)
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| LineIoError::file_error("Failed to get file metadata", e))?
            .len();

        if file_size < Self::MEMORY_THRESHOLD {
            let mut content = Vec::with_capacity(file_size as usize);
            file.read_to_end(&mut content)
                .map_err(|e| LineIoError::file_error("Failed to read file", e))?;
            Ok(ByteSource::InMemory(content))
        } else {
            // SAFETY: the mapping is read-only; concurrent truncation by another
            // process is outside what a line reader can guard against
            let mmap = unsafe {
                Mmap::map(&file).map_err(|e| {
                    LineIoError::file_error(
                        format!("Failed to memory map file: {}", path.display()),
                        e,
                    )
                })?
            };
            Ok(ByteSource::MemoryMapped(mmap))
        }
    }

    fn open_compressed(path: &Path) -> Result<ByteSource> {
        let compressed_size = std::fs::metadata(path)
            .map_err(|e| LineIoError::file_error("Failed to read compressed file metadata", e))?
            .len();

        if compressed_size < Self::COMPRESSED_MEMORY_THRESHOLD {
            return Ok(ByteSource::InMemory(decompress_to_memory(path)?));
        }

        let temp_file = decompress_to_temp_file(path)?;
        let handle = temp_file
            .reopen()
            .map_err(|e| LineIoError::file_error("Failed to reopen temp file", e))?;

        let decompressed_size = handle
            .metadata()
            .map_err(|e| LineIoError::file_error("Failed to get temp file metadata", e))?
            .len();
        if decompressed_size == 0 {
            return Ok(ByteSource::InMemory(Vec::new()));
        }

        // SAFETY: the temp file is private to this source and kept alive with it
        let mmap = unsafe {
            Mmap::map(&handle)
                .map_err(|e| LineIoError::file_error("Failed to memory map temp file", e))?
        };

        Ok(ByteSource::Decompressed {
            mmap,
            _temp_file: temp_file,
        })
    }
}
