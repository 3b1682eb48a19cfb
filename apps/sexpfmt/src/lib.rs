//! sexpfmt core library.
//!
//! Checks and fixes the layout of s-expression sources. A run resolves a
//! [`config::Config`], expands its roots into files, classifies each file
//! with a [`formatter::Transform`], and reports diffs, failures and totals.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `discover`: Root path expansion into candidate files.
//! - `formatter`: The s-expression whitespace and indentation transform.
//! - `outcome`: Per-file classification (unchanged, changed, failed).
//! - `diff`: Unified diff rendering.
//! - `counts`: Run totals and the exit-code policy.
//! - `pipeline`: Check and fix runs.
//! - `output`: User-facing messages.
//! - `error`: Setup errors that abort a run.
//! - `utils`: Supporting helpers.
pub mod cli;
pub mod config;
pub mod counts;
pub mod diff;
pub mod discover;
pub mod error;
pub mod formatter;
pub mod outcome;
pub mod output;
pub mod pipeline;
pub mod utils;
