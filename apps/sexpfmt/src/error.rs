//! Setup errors: conditions that stop a run before any file is processed.
//!
//! Per-file failures never surface here; they become `Outcome::Failed`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("path does not exist: {}", .0.display())]
    MissingPath(PathBuf),

    #[error("invalid file pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("cannot scan {}: {message}", path.display())]
    Scan { path: PathBuf, message: String },

    #[error("failed to read config file {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("invalid indent rule `{rule}` for `{key}`: {reason}")]
    IndentRule {
        key: String,
        rule: String,
        reason: String,
    },

    #[error("failed to resolve working directory")]
    WorkingDir(#[source] io::Error),

    #[error("failed to write report")]
    Report(#[from] io::Error),
}
