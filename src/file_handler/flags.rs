//! Read behaviour flags consulted by the line cursor on every advance.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bitset of independent read behaviours.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LineFlags(u8);

impl LineFlags {
    /// Suppress empty records while iterating
    pub const SKIP_EMPTY: Self = Self(1 << 0);
    /// Strip the trailing line terminator
    pub const DROP_NEWLINE: Self = Self(1 << 1);
    /// Tokenize lines as CSV rows
    pub const READ_CSV: Self = Self(1 << 2);
    /// Materialize the record on rewind/next/seek instead of on `current()`
    pub const READ_AHEAD: Self = Self(1 << 3);

    const ALL: [(Self, &'static str); 4] = [
        (Self::SKIP_EMPTY, "SKIP_EMPTY"),
        (Self::DROP_NEWLINE, "DROP_NEWLINE"),
        (Self::READ_CSV, "READ_CSV"),
        (Self::READ_AHEAD, "READ_AHEAD"),
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Enable or disable `other`
    pub fn set(&mut self, other: Self, enable: bool) {
        if enable {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }
}

impl BitOr for LineFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for LineFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

impl fmt::Debug for LineFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::ALL
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "LineFlags({})", names.join(" | "))
    }
}
