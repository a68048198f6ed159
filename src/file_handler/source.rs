//! Byte storage strategies behind a line cursor.

use memmap2::Mmap;
use tempfile::NamedTempFile;

/// Internal byte source strategy for a line cursor
#[derive(Debug)]
pub enum ByteSource {
    /// Content loaded entirely into memory (small files, in-memory buffers)
    InMemory(Vec<u8>),
    /// Content accessed via memory mapping (large files)
    MemoryMapped(Mmap),
    /// Compressed file decompressed to temp file and memory-mapped
    /// The temp file is kept alive to prevent deletion
    Decompressed {
        mmap: Mmap,
        _temp_file: NamedTempFile,
    },
}

impl ByteSource {
    /// Get the underlying bytes as a slice regardless of storage strategy
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ByteSource::InMemory(vec) => vec.as_slice(),
            ByteSource::MemoryMapped(mmap) => &mmap[..],
            ByteSource::Decompressed { mmap, .. } => &mmap[..],
        }
    }

    /// Length of the (decompressed) content in bytes
    pub fn len(&self) -> u64 {
        self.as_bytes().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Short label used in log output
    pub fn strategy(&self) -> &'static str {
        match self {
            ByteSource::InMemory(_) => "in-memory",
            ByteSource::MemoryMapped(_) => "memory-mapped",
            ByteSource::Decompressed { .. } => "decompressed",
        }
    }
}
