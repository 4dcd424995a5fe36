// cutkit-cli/src/commands/record.rs
//
// Screen recording from the terminal. The recording stops when Enter is
// pressed, or after --duration seconds when given.

use crate::cli::RecordArgs;
use crate::commands::edit::print_dry_run;
use crate::terminal::TerminalSink;
use cutkit_core::{CommandBuilder, CoreConfig, CoreError, CoreResult, Operation, Recorder, format_duration};
use owo_colors::OwoColorize;
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

pub fn run_record(config: &CoreConfig, args: &RecordArgs, dry_run: bool) -> CoreResult<()> {
    if let Some(duration) = args.duration {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "recording duration must be positive, got {duration}"
            )));
        }
    }

    if dry_run {
        let invocation = CommandBuilder::new(config).build(Operation::Record {
            output_dir: args.output_dir.clone(),
        })?;
        return print_dry_run(config, &invocation);
    }

    let sink = Arc::new(TerminalSink::new("Recording"));
    let recorder = Recorder::new(config, sink.clone());
    let status = sink.clone();
    let recording = recorder.start(&args.output_dir, move |elapsed| {
        status.set_message(format!("Recording {}", format_duration(elapsed)));
    })?;

    match args.duration {
        Some(seconds) => std::thread::sleep(Duration::from_secs_f64(seconds)),
        None => {
            eprintln!("Recording to {}. Press Enter to stop.", recording.output_path().display());
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
        }
    }

    let output = recording.stop()?;
    println!("{} {}", "✓".bright_green(), output.display());
    Ok(())
}
