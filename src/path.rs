//! Path string reconciliation.
//!
//! These functions work on strings, never on the filesystem. A normalized path
//! has no leading or trailing whitespace, a single `/` between segments, no
//! trailing separator, and an optional leading `/`. The root path normalizes to
//! the empty string so that normalized paths concatenate cleanly.

use crate::error::{LineIoError, Result};

pub const SEPARATOR: char = '/';

const TRIM_CHARS: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B', SEPARATOR];

/// Trim whitespace and separators, collapse repeated separators and optionally
/// prepend a single leading separator
///
/// ```
/// use lineio::path::normalize;
///
/// assert_eq!(normalize("/my//path/", true), "/my/path");
/// assert_eq!(normalize("/my//path/", false), "my/path");
/// assert_eq!(normalize("///", true), "");
/// ```
pub fn normalize(path: &str, with_leading_separator: bool) -> String {
    let trimmed = path.trim_matches(TRIM_CHARS);
    if trimmed.is_empty() {
        return String::new();
    }

    let mut normalized = String::with_capacity(trimmed.len() + 1);
    if with_leading_separator {
        normalized.push(SEPARATOR);
    }

    let mut previous_was_separator = false;
    for c in trimmed.chars() {
        let is_separator = c == SEPARATOR;
        if !(is_separator && previous_was_separator) {
            normalized.push(c);
        }
        previous_was_separator = is_separator;
    }

    normalized
}

/// Concatenate normalized elements, each with a leading separator
pub fn build<S: AsRef<str>>(elements: &[S]) -> String {
    elements
        .iter()
        .map(|element| normalize(element.as_ref(), true))
        .collect()
}

/// Parent directory of `path`
///
/// With `from_end`, the last segment is dropped `levels` times. Otherwise the
/// first `levels` segments are kept.
pub fn dirname(path: &str, levels: usize, from_end: bool) -> String {
    let normalized = normalize(path, true);

    if from_end {
        return (0..levels).fold(normalized, |current, _| parent_of(&current));
    }

    let kept: Vec<&str> = normalized.split(SEPARATOR).take(levels + 1).collect();
    normalize(&kept.join("/"), true)
}

/// Last segment of [`dirname`]
pub fn element(path: &str, levels: usize, from_end: bool) -> String {
    basename(&dirname(path, levels, from_end)).to_string()
}

/// `full` with the `base` prefix removed
///
/// The prefix check is a plain string comparison, so `/my` is accepted as a base
/// of `/myDir/file` and yields `/Dir/file`. With `allow_only_one_level`, the
/// remainder must be a single segment.
pub fn relative(full: &str, base: &str, allow_only_one_level: bool) -> Result<String> {
    let full = normalize(full, true);
    let base = normalize(base, true);

    let Some(rest) = full.strip_prefix(base.as_str()) else {
        return Err(LineIoError::PathPrefixMismatch { path: full, base });
    };

    let rest = rest.trim_matches(SEPARATOR);
    if allow_only_one_level && rest.contains(SEPARATOR) {
        return Err(LineIoError::PathLevelViolation {
            path: rest.to_string(),
        });
    }

    Ok(normalize(rest, true))
}

/// Join `relative` onto `root`, merging the segments they share
///
/// The first segment of `root` that equals the head of `relative` starts an
/// overlap, and the following root segments must keep matching `relative`. When
/// they diverge the join fails with [`LineIoError::PathIncompatible`], unless
/// `append_on_incompatibility` is set. In that case the overlap is abandoned,
/// and the diverging segment is matched against the second segment of
/// `relative`.
///
/// ```
/// use lineio::path::join;
///
/// assert_eq!(join("/my/full/path", "/path/final/joined", false).unwrap(), "/my/full/path/final/joined");
/// assert_eq!(join("/my/full/path", "/final/joined", false).unwrap(), "/my/full/path/final/joined");
/// assert!(join("/my/full/path", "/my/full/any/final", false).is_err());
/// ```
pub fn join(root: &str, relative: &str, append_on_incompatibility: bool) -> Result<String> {
    let root_normalized = normalize(root, false);
    let relative_normalized = normalize(relative, false);
    let root_segments: Vec<&str> = root_normalized.split(SEPARATOR).collect();
    let relative_segments: Vec<&str> = relative_normalized.split(SEPARATOR).collect();

    let mut before_join: Vec<&str> = Vec::new();
    let mut after_join: Vec<&str> = Vec::new();
    let mut index = 0;
    let mut joining = false;

    for &segment in &root_segments {
        if !joining {
            before_join.push(segment);
            if relative_segments.get(index) == Some(&segment) {
                joining = true;
                index += 1;
            }
            continue;
        }

        if relative_segments.get(index) != Some(&segment) {
            if !append_on_incompatibility {
                return Err(LineIoError::PathIncompatible {
                    root: root.to_string(),
                    relative: relative.to_string(),
                });
            }

            before_join.append(&mut after_join);
            joining = false;
            index = 0;
        }

        after_join.push(segment);
        index += 1;
    }

    let tail = relative_segments.get(index..).unwrap_or_default();
    let joined: Vec<&str> = before_join
        .into_iter()
        .chain(after_join)
        .chain(tail.iter().copied())
        .collect();

    Ok(normalize(&joined.join("/"), true))
}

/// Unix "directory of": `""` stays `""`, `"/a"` and `"/"` give `"/"`, a
/// separator-free path gives `"."`
fn parent_of(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() {
        return SEPARATOR.to_string();
    }

    match trimmed.rfind(SEPARATOR) {
        None => ".".to_string(),
        Some(position) => {
            let parent = trimmed[..position].trim_end_matches(SEPARATOR);
            if parent.is_empty() {
                SEPARATOR.to_string()
            } else {
                parent.to_string()
            }
        }
    }
}

fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches(SEPARATOR);
    trimmed.rsplit(SEPARATOR).next().unwrap_or("")
}
