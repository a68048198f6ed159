//! Recursive directory listing with extension filtering.

use crate::error::{LineIoError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Every regular file below `dir`, sorted by path
///
/// Entries that cannot be read are logged and left out.
pub fn list_files(dir: &Path, order: SortOrder) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(LineIoError::invalid_argument(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    if order == SortOrder::Descending {
        files.reverse();
    }

    Ok(files)
}

/// Keep paths whose extension (without the dot) is one of `extensions`
pub fn filter_by_extension<I>(paths: I, extensions: &[&str]) -> Vec<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    paths
        .into_iter()
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.contains(&ext))
        })
        .collect()
}
