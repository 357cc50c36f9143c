//! Cross-platform path utilities
//!
//! Solution files and browser clients use backslashes (`\`) while folder listings
//! use forward slashes (`/`). These helpers keep comparisons and validation
//! consistent across platforms.

use std::path::{Path, PathBuf};

/// Errors from validating client-supplied relative paths
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PathError {
    #[error("Path is empty")]
    Empty,

    #[error("Path contains invalid sequence '..': {0}")]
    Traversal(String),

    #[error("Path must be relative: {0}")]
    Absolute(String),

    #[error("Path contains invalid null byte")]
    NullByte,
}

/// Normalize path to forward slashes
#[inline]
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Convert a path to a normalized string
#[inline]
pub fn path_to_string(path: &Path) -> String {
    normalize_path(&path.to_string_lossy())
}

/// Key used for case-insensitive path comparison.
///
/// Separators are normalized and trailing separators dropped, so
/// `C:\Repo\App\` and `c:/repo/app` produce the same key.
pub fn comparison_key(path: &str) -> String {
    let normalized = normalize_path(path.trim());
    let trimmed = normalized.trim_end_matches('/');
    if trimmed.is_empty() && !normalized.is_empty() {
        // Filesystem root
        return "/".to_string();
    }
    trimmed.to_lowercase()
}

/// Case-insensitive directory equality
pub fn paths_equal_ignore_case(a: &Path, b: &Path) -> bool {
    comparison_key(&a.to_string_lossy()) == comparison_key(&b.to_string_lossy())
}

/// Returns true if `path` is `dir` or lies below it (case-insensitive)
pub fn is_within_ignore_case(path: &Path, dir: &Path) -> bool {
    let path_key = comparison_key(&path.to_string_lossy());
    let dir_key = comparison_key(&dir.to_string_lossy());
    if dir_key.is_empty() {
        return false;
    }
    if path_key == dir_key {
        return true;
    }
    let prefix = if dir_key.ends_with('/') {
        dir_key
    } else {
        format!("{}/", dir_key)
    };
    path_key.starts_with(&prefix)
}

/// Absolute-path check that also recognises Windows forms on any platform.
///
/// Clients may run on a different OS than the service, so `C:\x`, `C:/x`,
/// `\\server\share` and `\x` are all treated as absolute.
pub fn is_absolute_any(path: &str) -> bool {
    if Path::new(path).is_absolute() {
        return true;
    }
    let bytes = path.as_bytes();
    if path.starts_with('/') || path.starts_with('\\') {
        return true;
    }
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Validate a client-supplied relative path and convert it to a native `PathBuf`.
///
/// Rejects traversal (`..`) and absolute forms outright; nothing is sanitized.
pub fn validate_relative_path(raw: &str) -> Result<PathBuf, PathError> {
    if raw.trim().is_empty() {
        return Err(PathError::Empty);
    }
    if raw.contains('\0') {
        return Err(PathError::NullByte);
    }
    if raw.contains("..") {
        return Err(PathError::Traversal(raw.to_string()));
    }
    if is_absolute_any(raw) {
        return Err(PathError::Absolute(raw.to_string()));
    }

    Ok(normalize_path(raw)
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect())
}
