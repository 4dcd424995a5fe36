//! Screen recording.
//!
//! A recording is an open-ended ffmpeg process: it has no target duration, so
//! instead of percentages the caller gets the elapsed time through a
//! callback. It ends when ffmpeg reads the stop token from stdin.

use crate::command_builder::CommandBuilder;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, SidecarSpawner};
use crate::operation::Operation;
use crate::progress_reporting::SharedSink;
use crate::progress_reporting::ffmpeg_handler::TimeUpdateObserver;
use crate::runner::{ProcessHandle, ProcessRunner};

use std::path::{Path, PathBuf};

/// Starts screen recordings.
pub struct Recorder<S: FfmpegSpawner = SidecarSpawner> {
    builder: CommandBuilder,
    runner: ProcessRunner<S>,
    sink: SharedSink,
}

impl Recorder {
    pub fn new(config: &CoreConfig, sink: SharedSink) -> Self {
        Self::with_spawner(config, SidecarSpawner, sink)
    }
}

impl<S: FfmpegSpawner> Recorder<S> {
    pub fn with_spawner(config: &CoreConfig, spawner: S, sink: SharedSink) -> Self {
        Self {
            builder: CommandBuilder::new(config),
            runner: ProcessRunner::with_spawner(config, spawner),
            sink,
        }
    }

    /// Starts recording into `output_dir`. `on_time` receives the elapsed
    /// seconds every time ffmpeg reports them.
    pub fn start<F>(&self, output_dir: impl Into<PathBuf>, on_time: F) -> CoreResult<Recording>
    where
        F: FnMut(f64) + Send + 'static,
    {
        let invocation = self.builder.build(Operation::Record {
            output_dir: output_dir.into(),
        })?;
        let output = invocation
            .output_path()
            .map(Path::to_path_buf)
            .ok_or_else(|| CoreError::PathError("recording has no output file".to_string()))?;

        let handle = self.runner.run(invocation, self.sink.clone())?;
        handle.attach_observer(Box::new(TimeUpdateObserver::new(on_time)));
        log::info!("Recording to {}", output.display());

        Ok(Recording { handle, output })
    }
}

/// A running recording.
pub struct Recording {
    handle: ProcessHandle,
    output: PathBuf,
}

impl Recording {
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    #[must_use]
    pub fn handle(&self) -> &ProcessHandle {
        &self.handle
    }

    /// Sends the stop token, waits for ffmpeg to finalize the file and
    /// returns its path.
    pub fn stop(mut self) -> CoreResult<PathBuf> {
        // An already exited process has a closed stdin; its result still
        // tells what happened.
        if let Err(e) = self.handle.stop() {
            log::warn!("Could not send stop token: {e}");
        }
        let output = self.handle.wait()?;
        log::info!("Recording stopped ({})", output.status);
        Ok(self.output)
    }
}
