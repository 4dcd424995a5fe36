// ============================================================================
// cutkit-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and File Logging for the CLI
//
// The core library logs through the `log` facade only. This module installs
// the backend: a fern dispatcher writing coloured lines to stderr and, when
// requested, plain lines to a log file.
//
// LEVELS:
// - default: info for everything, ffmpeg's own output suppressed
// - --verbose: debug, including every ffmpeg stderr segment (target
//   `ffmpeg_log`)

use log::LevelFilter;
use owo_colors::OwoColorize;
use std::path::Path;

/// Log target carrying raw ffmpeg output.
const FFMPEG_LOG_TARGET: &str = "ffmpeg_log";

fn level_label(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERROR",
        log::Level::Warn => "WARN ",
        log::Level::Info => "INFO ",
        log::Level::Debug => "DEBUG",
        log::Level::Trace => "TRACE",
    }
}

/// Installs the global logger.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<(), fern::InitError> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let ffmpeg_level = if verbose { LevelFilter::Debug } else { LevelFilter::Off };

    let console = fern::Dispatch::new()
        .format(|out, message, record| {
            let label = level_label(record.level());
            let label = match record.level() {
                log::Level::Error => label.bright_red().to_string(),
                log::Level::Warn => label.yellow().to_string(),
                log::Level::Info => label.green().to_string(),
                log::Level::Debug => label.blue().to_string(),
                log::Level::Trace => label.magenta().to_string(),
            };
            out.finish(format_args!(
                "{} {} {}",
                chrono::Local::now().format("%H:%M:%S").to_string().dimmed(),
                label,
                message
            ));
        })
        .chain(std::io::stderr());

    let mut dispatch = fern::Dispatch::new()
        .level(level)
        .level_for(FFMPEG_LOG_TARGET, ffmpeg_level)
        .chain(console);

    if let Some(path) = log_file {
        let file = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "{} {} [{}] {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                    level_label(record.level()),
                    record.target(),
                    message
                ));
            })
            .chain(fern::log_file(path)?);
        dispatch = dispatch.chain(file);
    }

    dispatch.apply()?;
    log::debug!("Logger initialized with level: {level}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_labels_align() {
        let levels = [
            log::Level::Error,
            log::Level::Warn,
            log::Level::Info,
            log::Level::Debug,
            log::Level::Trace,
        ];
        for level in levels {
            assert_eq!(level_label(level).len(), 5);
        }
        assert_eq!(level_label(log::Level::Warn).trim_end(), "WARN");
    }
}
