//! File system utility functions
//!
//! JSON documents, symlinks and home-relative paths.

use crate::error::{CiderError, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Read a JSON document, returning the default value when the file is absent
#[instrument]
pub fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("{} does not exist yet", path.display());
            return Ok(T::default());
        }
        Err(e) => return Err(CiderError::file_system("read", path, e)),
    };

    if contents.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(&contents).map_err(|e| CiderError::malformed_data(path, e.to_string()))
}

/// Write a JSON document, creating parent directories as needed
#[instrument(skip(value))]
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CiderError::file_system("create", parent, e))?;
    }

    let mut contents = serde_json::to_string_pretty(value)
        .map_err(|e| CiderError::domain(format!("failed to encode {}: {e}", path.display())))?;
    contents.push('\n');

    fs::write(path, contents).map_err(|e| CiderError::file_system("write", path, e))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Expand a leading `~` to the user's home directory
#[must_use]
pub fn expand_home(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(path),
    }
}

/// What happened when linking one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Created,
    /// The link already pointed at the source
    Unchanged,
    /// A different file was in the way and `force` was not given
    Skipped,
    /// A different file was in the way and was replaced
    Replaced,
}

/// Symlink `src` to `dst`, replacing whatever is at `dst` only when `force` is set
#[cfg(unix)]
#[instrument]
pub fn symlink(src: &Path, dst: &Path, force: bool) -> Result<LinkOutcome> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| CiderError::file_system("create", parent, e))?;
    }

    let mut outcome = LinkOutcome::Created;
    if let Ok(metadata) = fs::symlink_metadata(dst) {
        if fs::read_link(dst).is_ok_and(|target| target == src) {
            return Ok(LinkOutcome::Unchanged);
        }
        if !force && !metadata.file_type().is_symlink() {
            debug!("{} exists, leaving it alone", dst.display());
            return Ok(LinkOutcome::Skipped);
        }
        let removed = if metadata.is_dir() {
            fs::remove_dir_all(dst)
        } else {
            fs::remove_file(dst)
        };
        removed.map_err(|e| CiderError::file_system("remove", dst, e))?;
        outcome = LinkOutcome::Replaced;
    }

    std::os::unix::fs::symlink(src, dst).map_err(|e| CiderError::file_system("symlink", dst, e))?;
    debug!("Linked {} -> {}", dst.display(), src.display());
    Ok(outcome)
}
