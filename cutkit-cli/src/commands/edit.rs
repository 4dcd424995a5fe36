// ============================================================================
// cutkit-cli/src/commands/edit.rs
// ============================================================================
//
// EDIT COMMANDS: cut, convert, extract-audio, capture, merge, transcode, probe
//
// Each subcommand maps onto one cutkit_core::Operation. With --dry-run the
// operation is only built and its invocation printed as JSON; otherwise it
// runs through a Cutter with a TerminalSink attached.

use crate::cli::{Commands, RangeArgs};
use crate::terminal::TerminalSink;
use cutkit_core::{CoreConfig, CoreError, CoreResult, Cutter, Operation, Segment, parse_duration};
use owo_colors::OwoColorize;
use std::path::Path;
use std::sync::Arc;

/// Parses `HH:MM:SS.fff`, `MM:SS` or plain seconds.
pub fn parse_time_arg(text: &str) -> CoreResult<f64> {
    parse_duration(text).ok_or_else(|| CoreError::InvalidTime(text.to_string()))
}

fn segment(args: &RangeArgs) -> Segment {
    Segment::new(&args.input, &args.start, &args.end)
}

/// Maps an editing subcommand onto its operation. `record` and `check` have
/// their own runners and yield `None`.
pub fn operation_for(command: &Commands) -> CoreResult<Option<Operation>> {
    let operation = match command {
        Commands::Cut(args) => Operation::Cut(segment(args)),
        Commands::Convert(args) => Operation::Convert(segment(args)),
        Commands::ExtractAudio(args) => Operation::ExtractAudio(segment(args)),
        Commands::Capture(args) => Operation::CaptureImage {
            source: args.input.clone(),
            timestamp: parse_time_arg(&args.at)?,
        },
        Commands::Merge(args) => Operation::Merge {
            sources: args.inputs.clone(),
        },
        Commands::Transcode(args) => Operation::FastTranscode {
            source: args.input.clone(),
            start: args.start.as_deref().map(parse_time_arg).transpose()?,
        },
        Commands::Probe(args) => Operation::ProbeDuration {
            source: args.input.clone(),
        },
        Commands::Record(_) | Commands::Check => return Ok(None),
    };
    Ok(Some(operation))
}

/// Prints what would be run, as JSON.
pub fn print_dry_run(config: &CoreConfig, invocation: &cutkit_core::Invocation) -> CoreResult<()> {
    let value = serde_json::json!({
        "ffmpeg": config.ffmpeg_path,
        "invocation": invocation,
    });
    let text = serde_json::to_string_pretty(&value).map_err(std::io::Error::other)?;
    println!("{text}");
    Ok(())
}

fn print_written(path: &Path) {
    println!("{} {}", "✓".bright_green(), path.display());
}

pub fn run_edit(config: &CoreConfig, command: &Commands, dry_run: bool) -> CoreResult<()> {
    let Some(operation) = operation_for(command)? else {
        return Ok(());
    };
    let sink = Arc::new(TerminalSink::new(operation.name()));
    let cutter = Cutter::new(config, sink);

    if dry_run {
        let invocation = cutter.prepare(operation)?;
        return print_dry_run(config, &invocation);
    }

    match (command, operation) {
        (_, Operation::Cut(segment)) => print_written(&cutter.cut(segment)?),
        (_, Operation::Convert(segment)) => print_written(&cutter.convert(segment)?),
        (_, Operation::ExtractAudio(segment)) => print_written(&cutter.extract_audio(segment)?),
        (_, Operation::CaptureImage { source, timestamp }) => {
            print_written(&cutter.capture_image(source, timestamp)?);
        }
        (_, Operation::Merge { sources }) => print_written(&cutter.merge(sources)?),
        (Commands::Transcode(args), Operation::FastTranscode { source, start }) => {
            let bytes = cutter.fast_transcode(source, start)?;
            std::fs::write(&args.output, &bytes)?;
            log::info!("Wrote {}", cutkit_core::format_bytes(bytes.len() as u64));
            print_written(&args.output);
        }
        (_, Operation::ProbeDuration { source }) => {
            let duration = cutter.probe_duration(source)?;
            println!("{duration}");
        }
        (_, other) => {
            return Err(CoreError::InvalidInput(format!(
                "'{}' is not an editing command",
                other.name()
            )));
        }
    }
    Ok(())
}
