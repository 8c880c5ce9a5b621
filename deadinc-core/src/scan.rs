//! Parallel, deterministic discovery of event stream files.
//!
//! - Early directory pruning via `WalkDir::filter_entry` (O(1) subtree skip)
//! - Parallel suffix checks via Rayon's `par_bridge`
//! - Sorted output, so batch results do not depend on directory order

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File name suffix of an event stream.
pub const EVENT_FILE_SUFFIX: &str = ".events.jsonl";

/// Directories to exclude by default.
const EXCLUDED_DIRS: &[&str] = &["target", ".git", ".deadinc", "node_modules"];

#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.file_type().is_dir()
        && entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

#[inline]
fn is_event_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(EVENT_FILE_SUFFIX))
}

/// Gathers all `*.events.jsonl` files under `root`.
///
/// If `root` is itself a file it is returned as the only entry.
pub fn gather_event_files(root: &Path) -> Result<Vec<PathBuf>> {
    gather_event_files_with_excludes(root, &[])
}

/// Gathers event files, additionally pruning directories named in `excludes`.
pub fn gather_event_files_with_excludes(root: &Path, excludes: &[&str]) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let all_excludes: HashSet<&str> = EXCLUDED_DIRS
        .iter()
        .copied()
        .chain(excludes.iter().copied())
        .collect();

    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &all_excludes))
        .par_bridge()
        .filter_map(|entry| match entry {
            Ok(e) => {
                let path = e.path();
                if e.file_type().is_file() && is_event_file(path) {
                    Some(Ok(path.to_path_buf()))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(e.into())),
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Failed to gather event files from {}", root.display()))?;

    files.sort();
    Ok(files)
}
