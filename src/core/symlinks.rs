//! Planning the links `relink` creates
//!
//! Each `symlinks` entry of bootstrap.json maps a glob, relative to the
//! `symlinks/` directory, to a target directory. Every match is linked into
//! the target under its own file name.

use crate::{
    error::{CiderError, Result},
    utils::fs::expand_home,
};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// One link to create: `target` will point at `source`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLink {
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Expand every glob and pair each match with its destination
#[instrument(skip(entries))]
pub fn plan(
    symlinks_dir: &Path,
    entries: &BTreeMap<String, String>,
) -> Result<Vec<PlannedLink>> {
    let mut links = Vec::new();

    for (pattern, target_dir) in entries {
        let full_pattern = symlinks_dir.join(pattern);
        let full_pattern = full_pattern.to_string_lossy();
        let target_dir = expand_home(target_dir);

        let matches = glob::glob(&full_pattern).map_err(|e| {
            CiderError::domain(format!("Invalid symlink pattern \"{pattern}\": {e}"))
        })?;

        for entry in matches {
            let source = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                CiderError::file_system("read", path, e.into())
            })?;
            let Some(name) = source.file_name() else {
                continue;
            };
            debug!("{} matched {}", pattern, source.display());
            links.push(PlannedLink {
                target: target_dir.join(name),
                source,
            });
        }
    }

    Ok(links)
}
