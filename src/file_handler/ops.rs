//! Thin wrappers over filesystem primitives: existence, stat, removal, chmod.

use crate::error::{LineIoError, Result};
use std::path::{Component, Path};

/// Size and ownership of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    /// Owning user id; only known on Unix
    pub owner_id: Option<u32>,
    pub is_dir: bool,
}

pub fn exists(path: &Path) -> bool {
    path.exists()
}

pub fn stat(path: &Path) -> Result<FileStat> {
    let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LineIoError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => LineIoError::file_error(format!("Failed to stat {}", path.display()), e),
    })?;

    #[cfg(unix)]
    let owner_id = {
        use std::os::unix::fs::MetadataExt;
        Some(metadata.uid())
    };
    #[cfg(not(unix))]
    let owner_id = None;

    Ok(FileStat {
        size: metadata.len(),
        owner_id,
        is_dir: metadata.is_dir(),
    })
}

/// Remove a file or an empty directory
///
/// A path ending in `..` is refused outright.
pub fn remove(path: &Path) -> Result<()> {
    if matches!(path.components().next_back(), Some(Component::ParentDir)) {
        return Err(LineIoError::RemovalFailed {
            path: path.to_path_buf(),
            message: "Cannot remove parent directory".to_string(),
        });
    }

    let removal_failed = |e: std::io::Error| LineIoError::RemovalFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let metadata = std::fs::symlink_metadata(path).map_err(removal_failed)?;
    if metadata.is_dir() {
        std::fs::remove_dir(path).map_err(removal_failed)
    } else {
        std::fs::remove_file(path).map_err(removal_failed)
    }
}

/// Change the permission bits of `path`
#[cfg(unix)]
pub fn chmod(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if !path.exists() {
        return Err(LineIoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(|e| {
        LineIoError::PermissionDenied {
            path: path.to_path_buf(),
            message: format!("Cannot change mode to {mode:o}: {e}"),
        }
    })
}
