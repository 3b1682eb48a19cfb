//! CLI argument parsing via `clap`.

use crate::config::{FormatCfg, Overrides};
use crate::utils;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sexpfmt",
    version,
    about = "Check and fix formatting of s-expression sources",
    long_about = "sexpfmt: check or rewrite the layout of Clojure-style s-expression files.\n\nConfiguration precedence: CLI > sexpfmt.toml|yaml > defaults.\nLog verbosity is read from SEXPFMT_LOG (e.g. SEXPFMT_LOG=debug).",
    after_help = "Examples:\n  sexpfmt check\n  sexpfmt check src/app --no-ansi\n  sexpfmt fix --project-root . src test\n  sexpfmt fix --file-pattern '\\.edn$' resources",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current sexpfmt version.")]
    Version,
    /// Report incorrectly formatted files
    #[command(
        about = "Check formatting",
        long_about = "Print a diff for every file whose formatting differs. Exits 0 when all files are correct, 1 when some are incorrect, 2 when some could not be parsed.",
        after_help = "Examples:\n  sexpfmt check\n  sexpfmt check src/app/core.clj"
    )]
    Check(RunArgs),
    /// Rewrite incorrectly formatted files
    #[command(
        about = "Fix formatting",
        long_about = "Rewrite every file whose formatting differs. Files that cannot be parsed are reported and left untouched.",
        after_help = "Examples:\n  sexpfmt fix\n  sexpfmt fix --parallel src"
    )]
    Fix(RunArgs),
}

/// Options shared by `check` and `fix`.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Files or directories to process (default: config `paths`, else src/test)
    pub paths: Vec<PathBuf>,
    #[arg(long, help = "Project root (default: nearest ancestor with sexpfmt.toml or .git)")]
    pub project_root: Option<PathBuf>,
    #[arg(long, help = "Config file to use instead of <root>/sexpfmt.toml|yaml")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Regex selecting files inside directories")]
    pub file_pattern: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, overrides_with = "no_ansi", help = "Force colored output")]
    pub ansi: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Disable colored output")]
    pub no_ansi: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Process files in parallel")]
    pub parallel: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Leave indentation as is")]
    pub no_indentation: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Keep whitespace inside delimiters")]
    pub no_remove_surrounding_whitespace: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Keep whitespace at line ends")]
    pub no_remove_trailing_whitespace: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Do not separate adjacent forms")]
    pub no_insert_missing_whitespace: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Keep runs of blank lines")]
    pub no_remove_consecutive_blank_lines: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Collapse repeated spaces between forms")]
    pub remove_multiple_non_indenting_spaces: bool,
}

fn off(flag: bool) -> Option<bool> {
    flag.then_some(false)
}

impl RunArgs {
    /// Color choice before any config file is read, for setup errors.
    pub fn early_ansi(&self) -> bool {
        self.overrides().ansi.unwrap_or_else(utils::default_ansi)
    }

    /// CLI layer of the configuration; unset flags defer to the config file.
    pub fn overrides(&self) -> Overrides {
        let ansi = if self.no_ansi {
            Some(false)
        } else if self.ansi {
            Some(true)
        } else {
            None
        };
        Overrides {
            project_root: self.project_root.clone(),
            config_file: self.config.clone(),
            paths: self.paths.clone(),
            file_pattern: self.file_pattern.clone(),
            ansi,
            parallel: self.parallel.then_some(true),
            format: FormatCfg {
                indentation: off(self.no_indentation),
                remove_surrounding_whitespace: off(self.no_remove_surrounding_whitespace),
                remove_trailing_whitespace: off(self.no_remove_trailing_whitespace),
                insert_missing_whitespace: off(self.no_insert_missing_whitespace),
                remove_consecutive_blank_lines: off(self.no_remove_consecutive_blank_lines),
                remove_multiple_non_indenting_spaces: self
                    .remove_multiple_non_indenting_spaces
                    .then_some(true),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_check_args_become_overrides() {
        let cli = parse(&[
            "sexpfmt",
            "check",
            "src",
            "test/a.clj",
            "--no-ansi",
            "--no-indentation",
            "--remove-multiple-non-indenting-spaces",
        ]);
        let Commands::Check(args) = cli.cmd else {
            panic!("expected check");
        };
        let ov = args.overrides();
        assert_eq!(ov.paths, vec![PathBuf::from("src"), PathBuf::from("test/a.clj")]);
        assert_eq!(ov.ansi, Some(false));
        assert_eq!(ov.parallel, None);
        assert_eq!(ov.format.indentation, Some(false));
        assert_eq!(ov.format.remove_trailing_whitespace, None);
        assert_eq!(ov.format.remove_multiple_non_indenting_spaces, Some(true));
    }

    #[test]
    fn test_fix_without_flags_defers_everything() {
        let cli = parse(&["sexpfmt", "fix"]);
        let Commands::Fix(args) = cli.cmd else {
            panic!("expected fix");
        };
        let ov = args.overrides();
        assert!(ov.paths.is_empty());
        assert_eq!(ov.ansi, None);
        assert_eq!(ov.format, FormatCfg::default());
    }

    #[test]
    fn test_explicit_color_flags_decide_early_ansi() {
        let Commands::Check(args) = parse(&["sexpfmt", "check", "--ansi"]).cmd else {
            panic!("expected check");
        };
        assert!(args.early_ansi());
        let Commands::Check(args) = parse(&["sexpfmt", "check", "--no-ansi"]).cmd else {
            panic!("expected check");
        };
        assert!(!args.early_ansi());
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["sexpfmt", "check", "--bogus"]).is_err());
    }
}
