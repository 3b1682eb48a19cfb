//! Check and fix runs over every discovered file.
//!
//! All roots are resolved before the first file is read, so a missing root
//! aborts the run with nothing processed. Files are then classified one by
//! one, each reported before the next is read. With `parallel` set they are
//! classified across the rayon pool and the self-contained per-file reports
//! are written out in discovery order.

use crate::config::Config;
use crate::counts::Counts;
use crate::diff;
use crate::discover;
use crate::error::SetupError;
use crate::formatter::Transform;
use crate::outcome::{self, Outcome};
use crate::output::{self, Sinks};
use crate::utils;
use anyhow::Context;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Check,
    Fix,
}

/// Everything one file contributes to a run.
#[derive(Debug, Default)]
struct FileReport {
    counts: Counts,
    out: String,
    err: String,
}

/// Roots are canonical, so discovered paths sit lexically under the project
/// root; symlinks are not followed here.
fn display_path(config: &Config, path: &Path) -> String {
    let abs = utils::absolutize(&config.project_root, path);
    utils::display_path(&config.project_root, &abs)
}

fn process(config: &Config, transform: &dyn Transform, path: &Path, mode: Mode) -> FileReport {
    let shown = display_path(config, path);
    let outcome = match fs::read_to_string(path).with_context(|| format!("failed to read {shown}")) {
        Ok(content) => outcome::classify(transform, &config.toggles, content),
        Err(e) => Outcome::Failed(e),
    };
    let mut report = FileReport {
        counts: Counts::of(&outcome),
        ..FileReport::default()
    };
    debug!(file = %shown, counts = ?report.counts, "classified");

    match (outcome, mode) {
        (Outcome::Unchanged, _) => {}
        (Outcome::Changed { original, revised }, Mode::Check) => {
            let view = diff::render(config.ansi, &shown, &original, &revised);
            report.err = output::incorrect_block(config.ansi, &view);
        }
        (Outcome::Changed { revised, .. }, Mode::Fix) => {
            match fs::write(path, revised).with_context(|| format!("failed to write {shown}")) {
                Ok(()) => report.out = output::reformatted_notice(&shown),
                Err(e) => report.err = output::failure_block(config.ansi, &shown, &e),
            }
        }
        (Outcome::Failed(e), _) => {
            report.err = output::failure_block(config.ansi, &shown, &e);
        }
    }
    report
}

fn emit(sinks: &mut Sinks<'_>, acc: Counts, report: FileReport) -> Result<Counts, SetupError> {
    sinks.out.write_all(report.out.as_bytes())?;
    sinks.err.write_all(report.err.as_bytes())?;
    Ok(acc.merge(report.counts))
}

fn run(
    config: &Config,
    transform: &dyn Transform,
    sinks: &mut Sinks<'_>,
    mode: Mode,
) -> Result<Counts, SetupError> {
    let files: Vec<PathBuf> = discover::resolve_all(&config.paths, &config.file_pattern)?;
    info!(files = files.len(), parallel = config.parallel, ?mode, "processing");

    if config.parallel {
        let reports: Vec<FileReport> = files
            .par_iter()
            .map(|f| process(config, transform, f, mode))
            .collect();
        reports
            .into_iter()
            .try_fold(Counts::default(), |acc, r| emit(sinks, acc, r))
    } else {
        files.iter().try_fold(Counts::default(), |acc, f| {
            emit(sinks, acc, process(config, transform, f, mode))
        })
    }
}

/// Report files whose formatting differs from the transform's output.
///
/// Returns the totals; [`Counts::exit_code`] turns them into a status.
pub fn check(
    config: &Config,
    transform: &dyn Transform,
    sinks: &mut Sinks<'_>,
) -> Result<Counts, SetupError> {
    let counts = run(config, transform, sinks, Mode::Check)?;
    output::write_summary(sinks, config.ansi, &counts)?;
    info!(
        okay = counts.okay,
        incorrect = counts.incorrect,
        error = counts.error,
        "check finished"
    );
    Ok(counts)
}

/// Rewrite files whose formatting differs. Per-file failures are reported
/// and skipped; they do not fail the run.
pub fn fix(
    config: &Config,
    transform: &dyn Transform,
    sinks: &mut Sinks<'_>,
) -> Result<(), SetupError> {
    let counts = run(config, transform, sinks, Mode::Fix)?;
    info!(
        reformatted = counts.incorrect,
        failed = counts.error,
        "fix finished"
    );
    Ok(())
}
