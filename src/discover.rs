//! Discovery of event files under the input directories.

use crate::tfevents::EVENT_FILE_PREFIX;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Recursively collect event files under each directory, in directory-list
/// order then traversal order. Directories that do not exist are skipped
/// with a warning.
pub fn find_event_files(directories: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for directory in directories {
        if !directory.exists() {
            warn!("directory does not exist: {}", directory.display());
            continue;
        }
        for entry in WalkDir::new(directory).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() && is_event_file(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }
    }
    files
}

fn is_event_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(EVENT_FILE_PREFIX))
}
