//! Utilities for input path collection and display helpers.

use std::path::{Path, PathBuf};

use crate::{Result, error::FlatMergeError};

/// Expand multiple glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`.
///
/// Matches of one pattern are returned in sorted order; patterns keep the
/// order they were given in. A pattern that matches nothing is kept as a
/// literal path so that reading it later reports the missing file.
///
/// Errors:
/// - Propagates `glob` parse errors.
/// - Propagates filesystem errors from glob iterator.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let paths = collect_paths_for_pattern(pattern)?;

        if paths.is_empty() {
            resolved_paths.push(PathBuf::from(pattern));
        } else {
            resolved_paths.extend(paths);
        }
    }

    Ok(resolved_paths)
}

/// Expand a single glob pattern into filesystem paths.
///
/// Pattern examples:
/// - `"**/*.pdf"`
/// - `"./forms/*.pdf"`
fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|err| {
        FlatMergeError::invalid_config(format!("Invalid glob pattern {pattern:?}: {err}"))
    })?;

    let mut resolved_paths = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| FlatMergeError::other(err.to_string()))?;
        resolved_paths.push(path);
    }

    Ok(resolved_paths)
}

/// Read input paths from a list file, one path per line.
///
/// Blank lines and lines starting with `#` are skipped. Each remaining line
/// is trimmed and used as a path (not as a glob).
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line is not a usable path.
pub async fn read_input_list(path: &Path) -> Result<Vec<PathBuf>> {
    let contents =
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FlatMergeError::FailedToReadInputList {
                path: path.to_path_buf(),
                source: e,
            })?;

    parse_input_list(path, &contents)
}

fn parse_input_list(path: &Path, contents: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.contains('\0') {
            return Err(FlatMergeError::InvalidInputList {
                path: path.to_path_buf(),
                line_number: idx + 1,
                details: "Path contains a NUL byte".to_string(),
            });
        }

        paths.push(PathBuf::from(line));
    }

    Ok(paths)
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
