//! Supporting helpers: message prefixes and display paths.

use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

pub fn error_prefix(ansi: bool) -> String {
    if ansi {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn warn_prefix(ansi: bool) -> String {
    if ansi {
        "warning:".yellow().bold().to_string()
    } else {
        "warning:".to_string()
    }
}

/// Whether colored output is appropriate for the diagnostic stream when no
/// explicit choice was made.
pub fn default_ansi() -> bool {
    use std::io::IsTerminal;
    std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
}

/// Express `path` relative to `root` for user-facing output.
///
/// Both inputs are expected to be absolute. Falls back to the path as given
/// when no relative form exists (e.g. different drive prefixes).
pub fn display_path(root: &Path, path: &Path) -> String {
    match pathdiff::diff_paths(path, root) {
        Some(rel) if rel.as_os_str().is_empty() => path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string()),
        Some(rel) => rel.to_string_lossy().to_string(),
        None => path.to_string_lossy().to_string(),
    }
}

/// Make `path` absolute against `base` without touching the filesystem.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
