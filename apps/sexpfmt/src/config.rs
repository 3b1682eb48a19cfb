//! Configuration discovery and effective settings resolution.
//!
//! sexpfmt reads `sexpfmt.toml|yaml|yml` from the project root and merges
//! it with CLI flags to produce an immutable [`Config`].
//!
//! The project root is `--project-root` when given; otherwise the closest
//! ancestor of the working directory holding a config file or `.git`.
//! Defaults:
//! - `file-pattern`: `\.(clj[csx]?|edn)$`
//! - `paths`: whichever of `src`, `test` exist, else the project root
//! - `ansi`: on when stderr is a terminal and `NO_COLOR` is unset
//! - `parallel`: false
//! - `[format]`: every toggle on except `remove-multiple-non-indenting-spaces`
//! - `[indents]`: built-in table; `[extra-indents]` is merged over it
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::SetupError;
use crate::formatter::IndentTable;
use crate::utils;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_FILE_PATTERN: &str = r"\.(clj[csx]?|edn)$";
const CONFIG_FILES: [&str; 3] = ["sexpfmt.toml", "sexpfmt.yaml", "sexpfmt.yml"];
const DEFAULT_PATHS: [&str; 2] = ["src", "test"];

/// Switches for the individual formatting passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureToggles {
    pub indentation: bool,
    pub remove_surrounding_whitespace: bool,
    pub remove_trailing_whitespace: bool,
    pub insert_missing_whitespace: bool,
    pub remove_consecutive_blank_lines: bool,
    pub remove_multiple_non_indenting_spaces: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        FeatureToggles {
            indentation: true,
            remove_surrounding_whitespace: true,
            remove_trailing_whitespace: true,
            insert_missing_whitespace: true,
            remove_consecutive_blank_lines: true,
            remove_multiple_non_indenting_spaces: false,
        }
    }
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
/// Formatting toggles under `[format]`; unset entries fall through.
pub struct FormatCfg {
    pub indentation: Option<bool>,
    pub remove_surrounding_whitespace: Option<bool>,
    pub remove_trailing_whitespace: Option<bool>,
    pub insert_missing_whitespace: Option<bool>,
    pub remove_consecutive_blank_lines: Option<bool>,
    pub remove_multiple_non_indenting_spaces: Option<bool>,
}

impl FormatCfg {
    /// Layer `self` over `lower`, then over the defaults.
    fn resolve(&self, lower: &FormatCfg) -> FeatureToggles {
        let d = FeatureToggles::default();
        FeatureToggles {
            indentation: self.indentation.or(lower.indentation).unwrap_or(d.indentation),
            remove_surrounding_whitespace: self
                .remove_surrounding_whitespace
                .or(lower.remove_surrounding_whitespace)
                .unwrap_or(d.remove_surrounding_whitespace),
            remove_trailing_whitespace: self
                .remove_trailing_whitespace
                .or(lower.remove_trailing_whitespace)
                .unwrap_or(d.remove_trailing_whitespace),
            insert_missing_whitespace: self
                .insert_missing_whitespace
                .or(lower.insert_missing_whitespace)
                .unwrap_or(d.insert_missing_whitespace),
            remove_consecutive_blank_lines: self
                .remove_consecutive_blank_lines
                .or(lower.remove_consecutive_blank_lines)
                .unwrap_or(d.remove_consecutive_blank_lines),
            remove_multiple_non_indenting_spaces: self
                .remove_multiple_non_indenting_spaces
                .or(lower.remove_multiple_non_indenting_spaces)
                .unwrap_or(d.remove_multiple_non_indenting_spaces),
        }
    }
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(rename_all = "kebab-case")]
/// Root configuration loaded from `sexpfmt.toml|yaml`.
pub struct FileConfig {
    pub paths: Option<Vec<String>>,
    pub file_pattern: Option<String>,
    pub ansi: Option<bool>,
    pub parallel: Option<bool>,
    pub format: Option<FormatCfg>,
    /// Replaces the built-in indentation table.
    pub indents: Option<BTreeMap<String, Vec<String>>>,
    /// Merged over the indentation table.
    pub extra_indents: Option<BTreeMap<String, Vec<String>>>,
    /// Namespace alias -> full namespace, for indentation lookup.
    pub aliases: Option<BTreeMap<String, String>>,
}

/// Values supplied on the command line; `None`/empty means "not given".
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub project_root: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub paths: Vec<PathBuf>,
    pub file_pattern: Option<String>,
    pub ansi: Option<bool>,
    pub parallel: Option<bool>,
    pub format: FormatCfg,
}

/// Fully-resolved configuration; read-only once built.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_root: PathBuf,
    pub file_pattern: Regex,
    /// Absolute root paths to scan.
    pub paths: Vec<PathBuf>,
    pub toggles: FeatureToggles,
    pub indents: IndentTable,
    pub aliases: BTreeMap<String, String>,
    pub ansi: bool,
    pub parallel: bool,
}

/// Walk upward from `start` to detect the project root.
///
/// Stops when a `sexpfmt.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_project_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Parse one config file; the format follows the extension.
pub fn load_file(path: &Path) -> Result<FileConfig, SetupError> {
    let s = fs::read_to_string(path).map_err(|source| SetupError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_err = |message: String| SetupError::ConfigParse {
        path: path.to_path_buf(),
        message,
    };
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&s).map_err(|e| parse_err(e.to_string()))
        }
        _ => toml::from_str(&s).map_err(|e| parse_err(e.to_string())),
    }
}

/// Load `FileConfig` from the first config file present in `root`.
pub fn load_config(root: &Path) -> Result<Option<FileConfig>, SetupError> {
    for name in CONFIG_FILES {
        let p = root.join(name);
        if p.is_file() {
            debug!(path = %p.display(), "loading config");
            return load_file(&p).map(Some);
        }
    }
    Ok(None)
}

fn default_paths(project_root: &Path) -> Vec<PathBuf> {
    let existing: Vec<PathBuf> = DEFAULT_PATHS
        .iter()
        .map(|p| project_root.join(p))
        .filter(|p| p.exists())
        .collect();
    if existing.is_empty() {
        vec![project_root.to_path_buf()]
    } else {
        existing
    }
}

/// Canonicalize a scan root. A file root keeps its own name so a symlinked
/// file is still shown where it lives; missing roots are left for discovery.
fn canonical_root(path: PathBuf) -> PathBuf {
    if path.is_dir() {
        return fs::canonicalize(&path).unwrap_or(path);
    }
    if !path.exists() {
        return path;
    }
    let parent = path.parent().map(Path::to_path_buf);
    let name = path.file_name().map(|n| n.to_os_string());
    match (parent, name) {
        (Some(parent), Some(name)) => fs::canonicalize(parent)
            .map(|p| p.join(name))
            .unwrap_or(path),
        _ => path,
    }
}

/// Resolve `Config` by merging CLI overrides, the config file and defaults.
///
/// `cwd` anchors relative CLI paths; it is a parameter so callers and tests
/// never depend on the process-wide working directory.
pub fn resolve(overrides: &Overrides, cwd: &Path) -> Result<Config, SetupError> {
    let project_root = match overrides.project_root.as_deref() {
        Some(root) => utils::absolutize(cwd, root),
        None => detect_project_root(cwd),
    };
    let project_root = fs::canonicalize(&project_root).unwrap_or(project_root);

    let cfg = match overrides.config_file.as_deref() {
        Some(file) => load_file(&utils::absolutize(cwd, file))?,
        None => load_config(&project_root)?.unwrap_or_default(),
    };

    let pattern = overrides
        .file_pattern
        .clone()
        .or_else(|| cfg.file_pattern.clone())
        .unwrap_or_else(|| DEFAULT_FILE_PATTERN.to_string());
    let file_pattern = Regex::new(&pattern).map_err(|source| SetupError::InvalidPattern {
        pattern: pattern.clone(),
        source,
    })?;

    let paths = if !overrides.paths.is_empty() {
        overrides
            .paths
            .iter()
            .map(|p| utils::absolutize(cwd, p))
            .collect()
    } else if let Some(ps) = cfg.paths.as_ref() {
        ps.iter().map(|p| project_root.join(p)).collect()
    } else {
        default_paths(&project_root)
    };
    // canonical roots keep discovered files lexically under the project root
    let paths: Vec<PathBuf> = paths
        .into_iter()
        .map(canonical_root)
        .collect();

    let toggles = overrides
        .format
        .resolve(&cfg.format.clone().unwrap_or_default());

    let mut indents = match cfg.indents.as_ref() {
        Some(entries) => IndentTable::from_config(entries)?,
        None => IndentTable::defaults(),
    };
    if let Some(extra) = cfg.extra_indents.as_ref() {
        indents.extend_from_config(extra)?;
    }

    let ansi = overrides
        .ansi
        .or(cfg.ansi)
        .unwrap_or_else(utils::default_ansi);
    let parallel = overrides.parallel.or(cfg.parallel).unwrap_or(false);

    debug!(
        project_root = %project_root.display(),
        paths = paths.len(),
        parallel,
        "resolved configuration"
    );

    Ok(Config {
        project_root,
        file_pattern,
        paths,
        toggles,
        indents,
        aliases: cfg.aliases.unwrap_or_default(),
        ansi,
        parallel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("lib/nested")).unwrap();
        let mut f = fs::File::create(root.join("sexpfmt.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
paths = ["lib"]
file-pattern = "\\.lisp$"
ansi = false
parallel = true
[format]
indentation = false
[aliases]
s = "schema.core"
    "#
        )
        .unwrap();

        // Resolve from a nested directory; the config file marks the root
        let cfg = resolve(&Overrides::default(), &root.join("lib/nested")).unwrap();
        let canon = fs::canonicalize(root).unwrap();
        assert_eq!(cfg.project_root, canon);
        assert_eq!(cfg.paths, vec![canon.join("lib")]);
        assert!(cfg.file_pattern.is_match("a/b.lisp"));
        assert!(!cfg.ansi);
        assert!(cfg.parallel);
        assert!(!cfg.toggles.indentation);
        assert!(cfg.toggles.remove_trailing_whitespace);
        assert_eq!(cfg.aliases.get("s").map(String::as_str), Some("schema.core"));
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        let mut f = fs::File::create(root.join("sexpfmt.yaml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
format:
  remove-multiple-non-indenting-spaces: true
            "#
        )
        .unwrap();

        let ov = Overrides {
            project_root: Some(root.to_path_buf()),
            ansi: Some(true),
            ..Overrides::default()
        };
        let cfg = resolve(&ov, root).unwrap();
        // only the default path that exists is kept
        assert_eq!(cfg.paths, vec![cfg.project_root.join("src")]);
        assert_eq!(cfg.file_pattern.as_str(), DEFAULT_FILE_PATTERN);
        assert!(cfg.file_pattern.is_match("src/app/core.cljs"));
        assert!(!cfg.file_pattern.is_match("src/app/core.js"));
        assert!(cfg.toggles.remove_multiple_non_indenting_spaces);
        assert!(cfg.toggles.indentation);
        assert!(!cfg.parallel);
    }

    #[test]
    fn test_cli_overrides_take_precedence() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("sexpfmt.toml"),
            "paths = [\"src\"]\nparallel = true\n[format]\nindentation = true\n",
        )
        .unwrap();

        let ov = Overrides {
            project_root: Some(root.to_path_buf()),
            paths: vec![PathBuf::from("other/file.clj")],
            parallel: Some(false),
            ansi: Some(false),
            format: FormatCfg {
                indentation: Some(false),
                ..FormatCfg::default()
            },
            ..Overrides::default()
        };
        let cfg = resolve(&ov, root).unwrap();
        // CLI paths are relative to the working directory, not the project root
        assert_eq!(cfg.paths, vec![root.join("other/file.clj")]);
        assert!(!cfg.parallel);
        assert!(!cfg.toggles.indentation);
    }

    #[test]
    fn test_no_default_paths_falls_back_to_root() {
        let dir = tempdir().unwrap();
        let ov = Overrides {
            project_root: Some(dir.path().to_path_buf()),
            ansi: Some(false),
            ..Overrides::default()
        };
        let cfg = resolve(&ov, dir.path()).unwrap();
        assert_eq!(cfg.paths, vec![cfg.project_root.clone()]);
    }

    #[test]
    fn test_indent_tables_replace_and_extend() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("sexpfmt.toml"),
            "[extra-indents]\nmy-macro = [\"block:0\"]\n\"re:^go-\" = [\"inner:0\"]\n",
        )
        .unwrap();
        let ov = Overrides {
            project_root: Some(root.to_path_buf()),
            ansi: Some(false),
            ..Overrides::default()
        };
        let cfg = resolve(&ov, root).unwrap();
        let none = BTreeMap::new();
        assert!(!cfg.indents.lookup("my-macro", &none).is_empty());
        assert!(!cfg.indents.lookup("let", &none).is_empty());

        fs::write(root.join("sexpfmt.toml"), "[indents]\nmy-macro = [\"block:0\"]\n").unwrap();
        let cfg = resolve(&ov, root).unwrap();
        assert!(cfg.indents.lookup("let", &none).is_empty());
    }

    #[test]
    fn test_malformed_inputs_are_setup_errors() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let ov = Overrides {
            project_root: Some(root.to_path_buf()),
            ansi: Some(false),
            ..Overrides::default()
        };

        fs::write(root.join("sexpfmt.toml"), "paths = 3\n").unwrap();
        assert!(matches!(
            resolve(&ov, root),
            Err(SetupError::ConfigParse { .. })
        ));

        fs::write(root.join("sexpfmt.toml"), "file-pattern = \"([\"\n").unwrap();
        assert!(matches!(
            resolve(&ov, root),
            Err(SetupError::InvalidPattern { .. })
        ));

        fs::write(root.join("sexpfmt.toml"), "[indents]\nx = [\"wide:2\"]\n").unwrap();
        assert!(matches!(
            resolve(&ov, root),
            Err(SetupError::IndentRule { .. })
        ));

        let missing = Overrides {
            config_file: Some(PathBuf::from("nope.toml")),
            ..ov
        };
        assert!(matches!(
            resolve(&missing, root),
            Err(SetupError::ConfigRead { .. })
        ));
    }
}
