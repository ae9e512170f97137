use std::path::{Path, PathBuf};

use crate::SourceError;

pub const DEFAULT_EXTENSION: &str = "csv";

/// Expand `path` into the list of input files.
///
/// A file is returned as-is whatever its extension. A directory is walked recursively (symlinks
/// are not followed) and filtered to files whose extension matches `extension`
/// case-insensitively. The result is sorted by path, so ingestion order is stable.
pub fn discover_inputs(path: &Path, extension: &str) -> Result<Vec<PathBuf>, SourceError> {
    let meta = std::fs::metadata(path).map_err(|e| SourceError::io(path, e))?;
    if meta.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let extension = extension.trim_start_matches('.');
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(path).follow_links(false) {
        let entry = entry.map_err(|e| {
            let at = e.path().unwrap_or(path).to_path_buf();
            SourceError::io(at, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        return Err(SourceError::NoInputFiles {
            path: path.to_path_buf(),
            extension: extension.to_string(),
        });
    }
    files.sort();
    Ok(files)
}
