// cutkit-cli/src/main.rs
//
// Entry point for the `cutkit` binary.
//
// Responsibilities:
// - Parsing the command line (`cutkit_cli::Cli`).
// - Installing the logger.
// - Dispatching to the subcommand and mapping errors onto the exit code.

use clap::Parser;
use cutkit_cli::{Cli, logging};
use owo_colors::OwoColorize;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("{} could not set up logging: {e}", "Warning:".yellow().bold());
    }

    match cutkit_cli::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("Command failed: {e:?}");
            eprintln!("{} {e}", "Error:".bright_red().bold());
            ExitCode::FAILURE
        }
    }
}
