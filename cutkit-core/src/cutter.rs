// ============================================================================
// cutkit-core/src/cutter.rs
// ============================================================================
//
// CUTTER: One Entry Point per Editing Operation
//
// Cutter pairs a CommandBuilder with a ProcessRunner and the caller's sink.
// Every method validates first; a rejected operation is alerted and returned
// as an error without ever spawning ffmpeg.
//
// The blocking methods (cut, convert, ...) spawn and wait. Callers that need
// the handle while the process runs use `submit` instead.

use crate::command_builder::CommandBuilder;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, FileMetadataProvider, SidecarSpawner, StdFsMetadataProvider};
use crate::invocation::Invocation;
use crate::operation::{Operation, Segment};
use crate::progress_reporting::SharedSink;
use crate::progress_reporting::ffmpeg_handler::parse_reported_duration;
use crate::runner::{ProcessHandle, ProcessOutput, ProcessRunner};

use std::path::{Path, PathBuf};

/// Front door for editing operations.
pub struct Cutter<S: FfmpegSpawner = SidecarSpawner, M: FileMetadataProvider = StdFsMetadataProvider> {
    builder: CommandBuilder<M>,
    runner: ProcessRunner<S>,
    sink: SharedSink,
}

impl Cutter {
    /// Creates a cutter spawning real ffmpeg processes.
    pub fn new(config: &CoreConfig, sink: SharedSink) -> Self {
        Self::with_parts(config, SidecarSpawner, StdFsMetadataProvider, sink)
    }
}

impl<S: FfmpegSpawner, M: FileMetadataProvider> Cutter<S, M> {
    pub fn with_parts(config: &CoreConfig, spawner: S, metadata: M, sink: SharedSink) -> Self {
        Self {
            builder: CommandBuilder::with_metadata(config, metadata),
            runner: ProcessRunner::with_spawner(config, spawner),
            sink,
        }
    }

    #[must_use]
    pub fn runner(&self) -> &ProcessRunner<S> {
        &self.runner
    }

    #[must_use]
    pub fn sink(&self) -> &SharedSink {
        &self.sink
    }

    /// Builds the invocation for `operation` without running it. Rejections
    /// are alerted like any other.
    pub fn prepare(&self, operation: Operation) -> CoreResult<Invocation> {
        self.builder.build(operation).inspect_err(|e| {
            log::warn!("Rejected operation: {e}");
            self.sink.alert(&e.user_message());
        })
    }

    /// Prepares and spawns `operation`, returning as soon as it is running.
    pub fn submit(&self, operation: Operation) -> CoreResult<ProcessHandle> {
        let invocation = self.prepare(operation)?;
        self.runner.run(invocation, self.sink.clone())
    }

    /// Runs `operation` to completion and returns the path it wrote.
    fn run_to_file(&self, operation: Operation) -> CoreResult<PathBuf> {
        let invocation = self.prepare(operation)?;
        let output = invocation
            .output_path()
            .map(Path::to_path_buf)
            .ok_or_else(|| CoreError::PathError(format!("{} has no output file", invocation.operation)))?;
        self.runner.run(invocation, self.sink.clone())?.wait()?;
        Ok(output)
    }

    /// Lossless trim of `segment`.
    pub fn cut(&self, segment: Segment) -> CoreResult<PathBuf> {
        self.run_to_file(Operation::Cut(segment))
    }

    /// Re-encoding trim of `segment` to H.264/MP4.
    pub fn convert(&self, segment: Segment) -> CoreResult<PathBuf> {
        self.run_to_file(Operation::Convert(segment))
    }

    pub fn extract_audio(&self, segment: Segment) -> CoreResult<PathBuf> {
        self.run_to_file(Operation::ExtractAudio(segment))
    }

    pub fn capture_image(&self, source: impl Into<PathBuf>, timestamp: f64) -> CoreResult<PathBuf> {
        self.run_to_file(Operation::CaptureImage {
            source: source.into(),
            timestamp,
        })
    }

    /// Concatenates `sources` in order. Inputs must share codecs and
    /// parameters; nothing is re-encoded.
    pub fn merge(&self, sources: Vec<PathBuf>) -> CoreResult<PathBuf> {
        self.run_to_file(Operation::Merge { sources })
    }

    /// Transcodes `source` from `start` seconds to fragmented MP4 and returns
    /// the bytes ffmpeg wrote to stdout.
    pub fn fast_transcode(&self, source: impl Into<PathBuf>, start: Option<f64>) -> CoreResult<Vec<u8>> {
        let output = self.run(Operation::FastTranscode {
            source: source.into(),
            start,
        })?;
        Ok(output.stdout.unwrap_or_default())
    }

    /// Duration of `source` in seconds, or 0 when ffmpeg reports none.
    pub fn probe_duration(&self, source: impl Into<PathBuf>) -> CoreResult<f64> {
        let output = self.run(Operation::ProbeDuration {
            source: source.into(),
        })?;
        let duration = parse_reported_duration(&output.diagnostics);
        log::debug!("Probed duration: {duration}s");
        Ok(duration)
    }

    /// Runs any operation to completion.
    pub fn run(&self, operation: Operation) -> CoreResult<ProcessOutput> {
        self.submit(operation)?.wait()
    }
}
