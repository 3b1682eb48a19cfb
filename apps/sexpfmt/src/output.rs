//! User-facing messages for check and fix runs.
//!
//! Every per-file message is built as one string so a file's block reaches
//! its stream in a single write. Only the check success line and the fix
//! "Reformatting" notices go to standard output; everything else is a
//! diagnostic.

use crate::counts::Counts;
use crate::diff::DiffView;
use crate::utils::{error_prefix, warn_prefix};
use std::io::{self, Write};

/// The two output streams of a run. Borrowed so tests can capture them.
pub struct Sinks<'a> {
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
}

impl<'a> Sinks<'a> {
    pub fn new(out: &'a mut dyn Write, err: &'a mut dyn Write) -> Self {
        Sinks { out, err }
    }
}

pub fn incorrect_block(ansi: bool, diff: &DiffView) -> String {
    format!(
        "{} {} has incorrect formatting\n{}",
        warn_prefix(ansi),
        diff.path,
        diff
    )
}

/// Warning plus the full error chain and, when captured, a backtrace.
pub fn failure_block(ansi: bool, path: &str, error: &anyhow::Error) -> String {
    format!(
        "{} Failed to format file: {}\n{:?}\n",
        warn_prefix(ansi),
        path,
        error
    )
}

pub fn reformatted_notice(path: &str) -> String {
    format!("Reformatting {path}\n")
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        "file"
    } else {
        "files"
    }
}

/// Final check summary.
pub fn write_summary(sinks: &mut Sinks<'_>, ansi: bool, counts: &Counts) -> io::Result<()> {
    if counts.error > 0 {
        writeln!(
            sinks.err,
            "{} {} {} could not be parsed for formatting",
            error_prefix(ansi),
            counts.error,
            plural(counts.error)
        )?;
    }
    if counts.incorrect > 0 {
        writeln!(
            sinks.err,
            "{} {} {} formatted incorrectly",
            warn_prefix(ansi),
            counts.incorrect,
            plural(counts.incorrect)
        )?;
    }
    if counts.error == 0 && counts.incorrect == 0 {
        writeln!(sinks.out, "All source files formatted correctly")?;
    }
    Ok(())
}
