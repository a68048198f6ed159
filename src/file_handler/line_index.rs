//! Lazily built index of line boundaries.
//!
//! The index records the byte offset where each line starts and grows only as far
//! as callers ask for, using memchr for SIMD-optimized newline detection. It is what
//! lets the line cursor seek to an absolute line without replaying earlier records.

use memchr::memchr;

/// Line start offsets for one byte source
#[derive(Debug)]
pub struct LineIndex {
    /// Byte offsets where each line starts
    ///
    /// - line_offsets[0] = 0 (first line always starts at byte 0)
    /// - line_offsets[n] = byte position after nth newline
    ///
    /// An offset equal to the data length marks a trailing terminator, not a line.
    line_offsets: Vec<u64>,

    /// Everything before this position has been scanned for newlines.
    indexed_to_byte: u64,
}

impl LineIndex {
    /// Create a new empty line index
    pub fn new() -> Self {
        Self {
            line_offsets: vec![0],
            indexed_to_byte: 0,
        }
    }

    /// Ensure we have indexed at least up to the target line
    ///
    /// Only scans the portion of the data not yet indexed, so repeated calls while
    /// iterating forward cost O(bytes of the new lines).
    pub fn ensure_indexed_to(&mut self, data: &[u8], target_line: u64) {
        let current_lines = (self.line_offsets.len() - 1) as u64;

        if target_line <= current_lines {
            return;
        }

        let mut pos = self.indexed_to_byte as usize;

        while pos < data.len() {
            if let Some(newline_offset) = memchr(b'\n', &data[pos..]) {
                pos += newline_offset + 1;
                self.line_offsets.push(pos as u64);

                if (self.line_offsets.len() - 1) as u64 >= target_line {
                    break;
                }
            } else {
                pos = data.len();
                break;
            }
        }

        self.indexed_to_byte = pos as u64;
    }

    /// Scan the remainder of the data
    pub fn index_all(&mut self, data: &[u8]) {
        let mut pos = self.indexed_to_byte as usize;

        while let Some(newline_offset) = memchr(b'\n', &data[pos..]) {
            pos += newline_offset + 1;
            self.line_offsets.push(pos as u64);
        }

        self.indexed_to_byte = data.len() as u64;
    }

    /// Byte range of `line`, terminator included
    ///
    /// Returns None when the line lies past the end of the data.
    pub fn line_span(&mut self, data: &[u8], line: u64) -> Option<(usize, usize)> {
        self.ensure_indexed_to(data, line.saturating_add(1));

        let start = *self.line_offsets.get(usize::try_from(line).ok()?)? as usize;
        if start >= data.len() {
            return None;
        }

        let end = self
            .line_offsets
            .get(line as usize + 1)
            .map(|&offset| offset as usize)
            .unwrap_or(data.len());

        Some((start, end))
    }

    /// Total number of lines; a trailing terminator does not open a new line
    pub fn line_count(&mut self, data: &[u8]) -> u64 {
        self.index_all(data);

        self.line_offsets
            .iter()
            .filter(|&&offset| (offset as usize) < data.len())
            .count() as u64
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}
