//! Build directory scanning.
//!
//! Recursively walks a directory and produces the files to publish, with
//! relative paths normalized to forward slashes. Entries are sorted by name
//! within each directory so two scans of the same tree agree on order.

use std::fs::{DirEntry, Metadata};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// A file found under the build directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Path on disk.
    pub absolute_path: PathBuf,
    /// Path relative to the build root, `/`-separated.
    pub relative_path: String,
    pub size: u64,
}

/// Scans `root` recursively and returns its files in a stable order.
///
/// Only a failure to read `root` itself is an error. Entries below it that
/// cannot be read (dangling links, permission errors) are logged and skipped.
/// Symlinks to files are published under the link's path; symlinks to
/// directories are not followed.
pub fn scan_build_dir(root: &Path) -> std::io::Result<Vec<ScannedFile>> {
    let mut files = Vec::new();
    let entries = sorted_entries(root)?;
    walk_entries(root, entries, &mut files);
    Ok(files)
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<DirEntry>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        match entry {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!(dir = %dir.display(), error = %e, "skipping unreadable entry"),
        }
    }
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

fn walk_entries(root: &Path, entries: Vec<DirEntry>, files: &mut Vec<ScannedFile>) {
    for entry in entries {
        let path = entry.path();
        let metadata = match entry_metadata(&entry) {
            Ok(Some(metadata)) => metadata,
            Ok(None) => continue,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if metadata.is_dir() {
            match sorted_entries(&path) {
                Ok(children) => walk_entries(root, children, files),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable directory"),
            }
        } else if metadata.is_file() {
            let Ok(rel_path) = path.strip_prefix(root) else {
                continue;
            };
            let relative_path = rel_path.to_string_lossy().replace('\\', "/");

            files.push(ScannedFile {
                absolute_path: path.clone(),
                relative_path,
                size: metadata.len(),
            });
        }
    }
}

/// Metadata of `entry` without following links, except that a symlink
/// pointing at a regular file resolves to that file.
fn entry_metadata(entry: &DirEntry) -> std::io::Result<Option<Metadata>> {
    let metadata = entry.metadata()?;
    if !metadata.file_type().is_symlink() {
        return Ok(Some(metadata));
    }

    let target = std::fs::metadata(entry.path())?;
    if target.is_file() {
        Ok(Some(target))
    } else {
        debug!(path = %entry.path().display(), "not following directory symlink");
        Ok(None)
    }
}
