//! sexpfmt CLI binary entry point.
//! Resolves configuration, runs check or fix, and maps the result to an
//! exit status.

use anyhow::Error;
use clap::Parser;
use sexpfmt::cli::{Cli, Commands, RunArgs};
use sexpfmt::config::{self, Config};
use sexpfmt::error::SetupError;
use sexpfmt::formatter::SexpFormatter;
use sexpfmt::output::Sinks;
use sexpfmt::{pipeline, utils};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn setup(args: &RunArgs) -> Result<Config, SetupError> {
    let cwd = std::env::current_dir().map_err(SetupError::WorkingDir)?;
    config::resolve(&args.overrides(), &cwd)
}

fn fail(ansi: bool, err: SetupError) -> ExitCode {
    eprintln!("{} {:#}", utils::error_prefix(ansi), Error::from(err));
    ExitCode::from(1)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("SEXPFMT_LOG"))
        .with_writer(io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // help and --version are not failures; bad input exits like any setup error
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };
    let (args, fixing) = match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Commands::Check(args) => (args, false),
        Commands::Fix(args) => (args, true),
    };

    let config = match setup(&args) {
        Ok(c) => c,
        Err(e) => return fail(args.early_ansi(), e),
    };
    let formatter = SexpFormatter::from_config(&config);
    let (mut out, mut err) = (io::stdout(), io::stderr());
    let mut sinks = Sinks::new(&mut out, &mut err);

    if fixing {
        match pipeline::fix(&config, &formatter, &mut sinks) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(config.ansi, e),
        }
    } else {
        match pipeline::check(&config, &formatter, &mut sinks) {
            Ok(counts) => ExitCode::from(counts.exit_code()),
            Err(e) => fail(config.ansi, e),
        }
    }
}
