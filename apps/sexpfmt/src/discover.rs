//! Expansion of root paths into the files to process.

use crate::error::SetupError;
use glob::{glob, Pattern};
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Files under `root` to format.
///
/// A file root is returned as-is. A directory root is walked recursively and
/// every regular file whose root-relative path matches `pattern` is kept.
/// Results are sorted so repeated runs see the same order.
pub fn resolve(root: &Path, pattern: &Regex) -> Result<Vec<PathBuf>, SetupError> {
    if !root.exists() {
        return Err(SetupError::MissingPath(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Ok(vec![root.to_path_buf()]);
    }

    let walk = format!("{}/**/*", Pattern::escape(&root.to_string_lossy()));
    let entries = glob(&walk).map_err(|e| SetupError::Scan {
        path: root.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(p) => p,
            Err(e) => {
                warn!(path = %e.path().display(), error = %e.error(), "skipping unreadable entry");
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        let rel = path.strip_prefix(root).unwrap_or(&path);
        if pattern.is_match(&rel.to_string_lossy()) {
            files.push(path);
        }
    }
    files.sort();
    debug!(root = %root.display(), files = files.len(), "resolved root");
    Ok(files)
}

/// Resolve every root up front, so a missing root aborts before any file is
/// touched. A file reachable from several roots is kept once, at its first
/// position.
pub fn resolve_all(roots: &[PathBuf], pattern: &Regex) -> Result<Vec<PathBuf>, SetupError> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for root in roots {
        for file in resolve(root, pattern)? {
            if seen.insert(file.clone()) {
                files.push(file);
            }
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn clj() -> Regex {
        Regex::new(crate::config::DEFAULT_FILE_PATTERN).unwrap()
    }

    #[test]
    fn test_directory_walk_filters_by_pattern() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/app/util")).unwrap();
        fs::write(root.join("src/app/core.clj"), "(ns app.core)").unwrap();
        fs::write(root.join("src/app/util/str.cljc"), "(ns app.util.str)").unwrap();
        fs::write(root.join("src/app/README.md"), "# app").unwrap();
        fs::write(root.join("deps.edn"), "{}").unwrap();

        let files = resolve(root, &clj()).unwrap();
        assert_eq!(
            files,
            vec![
                root.join("deps.edn"),
                root.join("src/app/core.clj"),
                root.join("src/app/util/str.cljc"),
            ]
        );
    }

    #[test]
    fn test_pattern_sees_root_relative_path() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("dev")).unwrap();
        fs::write(root.join("src/a.clj"), "").unwrap();
        fs::write(root.join("dev/b.clj"), "").unwrap();

        let only_src = Regex::new(r"^src/.*\.clj$").unwrap();
        assert_eq!(resolve(root, &only_src).unwrap(), vec![root.join("src/a.clj")]);
    }

    #[test]
    fn test_file_root_is_sole_result_even_if_unmatched() {
        let dir = tempdir().unwrap();
        let f = dir.path().join("script.txt");
        fs::write(&f, "(x)").unwrap();
        assert_eq!(resolve(&f, &clj()).unwrap(), vec![f]);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let roots = vec![dir.path().to_path_buf(), missing.clone()];
        match resolve_all(&roots, &clj()) {
            Err(SetupError::MissingPath(p)) => assert_eq!(p, missing),
            other => panic!("expected missing path, got {other:?}"),
        }
    }

    #[test]
    fn test_overlapping_roots_are_deduplicated() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.clj"), "").unwrap();
        fs::write(root.join("b.clj"), "").unwrap();
        let roots = vec![root.join("b.clj"), root.to_path_buf()];
        assert_eq!(
            resolve_all(&roots, &clj()).unwrap(),
            vec![root.join("b.clj"), root.join("a.clj")]
        );
    }
}
