//! Input directory enumeration

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{RefinerError, RefinerResult};

/// Check a path against an extension whitelist
///
/// Matching is case-insensitive and accepts whitelist entries with or
/// without a leading dot.
pub fn matches_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// List the regular files in `directory` whose extension is whitelisted
///
/// The result is sorted by path so runs are reproducible. A missing or
/// unreadable directory is an [`RefinerError::Io`]; an empty directory
/// yields an empty list.
pub fn scan(directory: &Path, extensions: &[String]) -> RefinerResult<Vec<PathBuf>> {
    let entries = fs::read_dir(directory).map_err(|e| RefinerError::io(directory, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // Log but continue
                warn!("Error accessing entry in {}: {}", directory.display(), e);
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if matches_extension(&path, extensions) {
            files.push(path);
        } else {
            debug!("Skipping {} (extension not accepted)", path.display());
        }
    }

    // Sort by path for consistent ordering
    files.sort();

    Ok(files)
}
