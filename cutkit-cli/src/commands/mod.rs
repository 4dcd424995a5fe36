//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a group of subcommands.

/// `check`: verifies that ffmpeg can be started.
pub mod check;
/// Editing subcommands backed by `cutkit_core::Cutter`.
pub mod edit;
/// `record`: screen recording until Enter or a fixed duration.
pub mod record;

use crate::cli::{Cli, Commands};
use cutkit_core::{CoreConfig, CoreResult};

/// Builds the core configuration from the global flags.
pub fn core_config(cli: &Cli) -> CoreConfig {
    match &cli.ffmpeg {
        Some(path) => CoreConfig::new(path),
        None => CoreConfig::from_env(),
    }
}

/// Dispatches the parsed command line.
pub fn run(cli: &Cli) -> CoreResult<()> {
    let config = core_config(cli);
    log::debug!("Using ffmpeg at {}", config.ffmpeg_path.display());

    match &cli.command {
        Commands::Check => check::run_check(&config),
        Commands::Record(args) => record::run_record(&config, args, cli.dry_run),
        command => edit::run_edit(&config, command, cli.dry_run),
    }
}
