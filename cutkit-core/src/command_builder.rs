// ============================================================================
// cutkit-core/src/command_builder.rs
// ============================================================================
//
// COMMAND BUILDER: Editing Operations -> ffmpeg Invocations
//
// Each Operation is validated and expanded into a complete Invocation: the
// argument list, the derived output path, the stdin payload for merges and
// the delivery mode. Nothing here spawns a process, so a rejected operation
// never has any external effect.
//
// OUTPUT NAMING:
// Range operations write next to the source as
//   <stem>-<start>-<end>.<ext>
// using the user's time text with ':' replaced by '.', e.g.
//   movie.mp4 + 00:00:10.000..00:00:20.000 -> movie-00.00.10.000-00.00.20.000.mp4

use crate::config::{
    AUDIO_QUALITY, CONVERT_CRF, CONVERT_PRESET, CoreConfig, DEFAULT_RECORD_FRAME_RATE,
    FAST_PRESET, FRAGMENT_DURATION_US, IMAGE_QUALITY,
};
use crate::error::{CoreError, CoreResult};
use crate::external::{FileMetadataProvider, StdFsMetadataProvider};
use crate::invocation::{Delivery, Invocation, InvocationOptions, OutputTarget};
use crate::operation::{Operation, Segment, TimeRange};
use crate::utils::{format_bytes, format_duration, format_seconds};

use std::path::{Path, PathBuf};

/// Suffix appended to the first input's stem for merged outputs.
pub const MERGE_SUFFIX: &str = "-merged";

/// Turns operations into invocations.
#[derive(Debug, Clone)]
pub struct CommandBuilder<M: FileMetadataProvider = StdFsMetadataProvider> {
    metadata: M,
    busy_during_probe: bool,
    record_frame_rate: u32,
}

impl Default for CommandBuilder<StdFsMetadataProvider> {
    fn default() -> Self {
        Self::new(&CoreConfig::default())
    }
}

impl CommandBuilder<StdFsMetadataProvider> {
    #[must_use]
    pub fn new(config: &CoreConfig) -> Self {
        Self::with_metadata(config, StdFsMetadataProvider)
    }
}

impl<M: FileMetadataProvider> CommandBuilder<M> {
    /// Creates a builder reading file sizes through `metadata`.
    pub fn with_metadata(config: &CoreConfig, metadata: M) -> Self {
        Self {
            metadata,
            busy_during_probe: config.busy_during_probe,
            record_frame_rate: if config.record_frame_rate == 0 {
                DEFAULT_RECORD_FRAME_RATE
            } else {
                config.record_frame_rate
            },
        }
    }

    /// Validates `operation` and builds its invocation.
    pub fn build(&self, operation: Operation) -> CoreResult<Invocation> {
        let name = operation.name();
        let invocation = match operation {
            Operation::Cut(segment) => self.cut(&segment)?,
            Operation::Convert(segment) => self.convert(&segment)?,
            Operation::ExtractAudio(segment) => self.extract_audio(&segment)?,
            Operation::CaptureImage { source, timestamp } => self.capture_image(&source, timestamp)?,
            Operation::Merge { sources } => self.merge(&sources)?,
            Operation::FastTranscode { source, start } => self.fast_transcode(&source, start)?,
            Operation::ProbeDuration { source } => self.probe_duration(&source),
            Operation::Record { output_dir } => self.record(&output_dir),
        };
        log::debug!("Built {name} invocation: {:?}", invocation.args);
        Ok(invocation)
    }

    /// Lossless trim: seek before the input with accurate seeking, copy both
    /// streams, and shift timestamps so none are negative.
    fn cut(&self, segment: &Segment) -> CoreResult<Invocation> {
        let range = TimeRange::parse(&segment.start, &segment.end)?;
        let output = segment_output_path(&segment.source, &segment.start, &segment.end, None)?;

        let args = args_from([
            "-ss", &format_seconds(range.start()),
            "-t", &format_seconds(range.duration()),
            "-accurate_seek",
            "-i", &path_arg(&segment.source),
            "-vcodec", "copy",
            "-acodec", "copy",
            "-avoid_negative_ts", "1",
            "-y", &path_arg(&output),
        ]);
        Ok(Invocation::new("cut", args, OutputTarget::File { path: output }))
    }

    /// Re-encoding trim. Seeking after the input is exact but decodes from
    /// the start of the file.
    fn convert(&self, segment: &Segment) -> CoreResult<Invocation> {
        let range = TimeRange::parse(&segment.start, &segment.end)?;
        let output = segment_output_path(&segment.source, &segment.start, &segment.end, Some("mp4"))?;

        let args = args_from([
            "-i", &path_arg(&segment.source),
            "-ss", &format_seconds(range.start()),
            "-t", &format_seconds(range.duration()),
            "-c:v", "libx264",
            "-preset:v", CONVERT_PRESET,
            "-crf", &CONVERT_CRF.to_string(),
            "-y", &path_arg(&output),
        ]);
        Ok(Invocation::new("convert", args, OutputTarget::File { path: output }))
    }

    fn extract_audio(&self, segment: &Segment) -> CoreResult<Invocation> {
        let range = TimeRange::parse(&segment.start, &segment.end)?;
        let output = segment_output_path(&segment.source, &segment.start, &segment.end, Some("mp3"))?;

        let args = args_from([
            "-ss", &format_seconds(range.start()),
            "-t", &format_seconds(range.duration()),
            "-i", &path_arg(&segment.source),
            "-q:a", &AUDIO_QUALITY.to_string(),
            "-vn",
            "-y", &path_arg(&output),
        ]);
        Ok(Invocation::new("extract-audio", args, OutputTarget::File { path: output }))
    }

    fn capture_image(&self, source: &Path, timestamp: f64) -> CoreResult<Invocation> {
        if !timestamp.is_finite() || timestamp < 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "capture timestamp must be a non-negative number of seconds, got {timestamp}"
            )));
        }
        let label = format_duration(timestamp).replace(':', ".");
        let output = sibling_path(source, &format!("-{label}"), Some("jpg"))?;

        let args = args_from([
            "-ss", &format_seconds(timestamp),
            "-i", &path_arg(source),
            "-vframes", "1",
            "-f", "mjpeg",
            "-q:v", &IMAGE_QUALITY.to_string(),
            "-y", &path_arg(&output),
        ]);
        Ok(Invocation::new("capture-image", args, OutputTarget::File { path: output }))
    }

    /// Concatenation through the concat demuxer. The list is fed on stdin;
    /// only the file and pipe protocols are allowed so a crafted path cannot
    /// pull in anything else.
    fn merge(&self, sources: &[PathBuf]) -> CoreResult<Invocation> {
        let [first, _, ..] = sources else {
            return Err(CoreError::InvalidInput(format!(
                "merging needs at least two files, got {}",
                sources.len()
            )));
        };
        let output = sibling_path(first, MERGE_SUFFIX, None)?;

        let args = args_from([
            "-f", "concat",
            "-safe", "0",
            "-protocol_whitelist", "file,pipe",
            "-i", "-",
            "-c", "copy",
            "-y", &path_arg(&output),
        ]);
        Ok(Invocation::new("merge", args, OutputTarget::File { path: output })
            .with_stdin(concat_manifest(sources)))
    }

    /// Fragmented MP4 on stdout so a consumer can start reading early. The
    /// whole stream is kept in memory, so the buffer is reserved from the
    /// input size up front.
    fn fast_transcode(&self, source: &Path, start: Option<f64>) -> CoreResult<Invocation> {
        let start = start.unwrap_or(0.0);
        if !start.is_finite() || start < 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "transcode start must be a non-negative number of seconds, got {start}"
            )));
        }
        let size = self.metadata.get_size(source)?;
        log::debug!("Reserving {} for transcode of {}", format_bytes(size), source.display());

        let args = args_from([
            "-ss", &format_seconds(start),
            "-i", &path_arg(source),
            "-preset:v", FAST_PRESET,
            "-f", "mp4",
            "-frag_duration", &FRAGMENT_DURATION_US.to_string(),
            "pipe:1",
        ]);
        Ok(Invocation::new("fast-transcode", args, OutputTarget::Pipe).with_options(
            InvocationOptions {
                stdout_capacity: Some(usize::try_from(size).unwrap_or(usize::MAX)),
                ..InvocationOptions::default()
            },
        ))
    }

    /// Input only: ffmpeg prints the stream info, including the duration,
    /// and then complains about the missing output.
    fn probe_duration(&self, source: &Path) -> Invocation {
        Invocation::new("probe-duration", args_from(["-i", &path_arg(source)]), OutputTarget::None)
            .with_delivery(Delivery::Capture)
            .with_options(InvocationOptions {
                signal_busy: self.busy_during_probe,
                ..InvocationOptions::default()
            })
    }

    fn record(&self, output_dir: &Path) -> Invocation {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let output = output_dir.join(format!("record-{stamp}.mp4"));

        let mut args = capture_device_args(self.record_frame_rate);
        args.extend(args_from([
            "-c:v", "libx264",
            "-preset:v", FAST_PRESET,
            "-pix_fmt", "yuv420p",
            "-y", &path_arg(&output),
        ]));
        Invocation::new("record", args, OutputTarget::File { path: output })
            .with_delivery(Delivery::Capture)
    }
}

/// Builds the concat demuxer list: one `file '<path>'` line per input, in
/// order. Single quotes are closed, escaped and reopened.
#[must_use]
pub fn concat_manifest(sources: &[PathBuf]) -> String {
    sources
        .iter()
        .map(|path| format!("file '{}'", path_arg(path).replace('\'', r"'\''")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `<dir>/<stem>-<start>-<end>.<ext>`, with `:` in the time text replaced by
/// `.`. The extension is the source's unless `extension` forces another.
pub fn segment_output_path(
    source: &Path,
    start: &str,
    end: &str,
    extension: Option<&str>,
) -> CoreResult<PathBuf> {
    let suffix = format!("-{}-{}", start.trim(), end.trim()).replace(':', ".");
    sibling_path(source, &suffix, extension)
}

fn sibling_path(source: &Path, suffix: &str, extension: Option<&str>) -> CoreResult<PathBuf> {
    let stem = source.file_stem().ok_or_else(|| {
        CoreError::PathError(format!("No file name in {}", source.display()))
    })?;
    let mut name = stem.to_os_string();
    name.push(suffix);

    let extension = extension.map(std::ffi::OsStr::new).or_else(|| source.extension());
    if let Some(ext) = extension {
        name.push(".");
        name.push(ext);
    }
    Ok(source.with_file_name(name))
}

fn capture_device_args(frame_rate: u32) -> Vec<String> {
    let rate = frame_rate.to_string();
    if cfg!(target_os = "windows") {
        args_from(["-f", "gdigrab", "-framerate", &rate, "-i", "desktop"])
    } else if cfg!(target_os = "macos") {
        args_from(["-f", "avfoundation", "-framerate", &rate, "-capture_cursor", "1", "-i", "Capture screen 0:none"])
    } else {
        let display = std::env::var("DISPLAY").unwrap_or_else(|_| ":0.0".to_string());
        args_from(["-f", "x11grab", "-framerate", &rate, "-i", &display])
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn args_from<const N: usize>(args: [&str; N]) -> Vec<String> {
    args.iter().map(|arg| (*arg).to_string()).collect()
}
