//! Position-addressable cursor interface shared by every line reader.

use crate::error::Result;

/// Sequential, seekable access to the records of a source
///
/// Positions (`key`) are zero-based line numbers of the underlying source. A
/// cursor starts at position 0; `current` returns `None` once it is past the last
/// record.
pub trait LineCursor {
    type Item;

    /// Move back to the first record
    fn rewind(&mut self) -> Result<()>;

    /// Advance by one record
    fn next(&mut self) -> Result<()>;

    /// Move to the absolute position `line` (clamped to the end of the source)
    fn seek(&mut self, line: u64) -> Result<()>;

    /// Record at the current position
    fn current(&mut self) -> Result<Option<Self::Item>>;

    /// Current position
    fn key(&self) -> u64;

    /// True once the position is past the last record
    fn eof(&self) -> bool;

    fn valid(&self) -> bool {
        !self.eof()
    }

    /// Rewind, then iterate `(key, record)` pairs until the source is exhausted
    fn records(&mut self) -> Records<'_, Self>
    where
        Self: Sized,
    {
        Records {
            cursor: self,
            started: false,
            done: false,
        }
    }
}

/// Iterator adapter returned by [`LineCursor::records`]
pub struct Records<'a, C: LineCursor> {
    cursor: &'a mut C,
    started: bool,
    done: bool,
}

impl<C: LineCursor> Iterator for Records<'_, C> {
    type Item = Result<(u64, C::Item)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let step = if self.started {
            self.cursor.next()
        } else {
            self.started = true;
            self.cursor.rewind()
        };

        let current = step.and_then(|_| self.cursor.current());
        match current {
            Ok(Some(item)) => Some(Ok((self.cursor.key(), item))),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
