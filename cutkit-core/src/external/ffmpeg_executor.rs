// ============================================================================
// cutkit-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// This module defines how an ffmpeg process is spawned and what the runner
// may do with it once it is running: take its three standard streams and
// wait for its exit status.
//
// KEY COMPONENTS:
// - FfmpegProcess: Trait representing an active FFmpeg process
// - FfmpegSpawner: Trait for creating new FFmpeg processes
// - SidecarSpawner / SidecarProcess: implementation on top of ffmpeg-sidecar

use crate::error::{CoreResult, command_start_error, command_wait_error};
use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use std::io::{Read, Write};
use std::process::ExitStatus;

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
///
/// Each stream can be taken once; the runner hands them to its reader
/// threads and keeps stdin for the caller.
pub trait FfmpegProcess: Send + 'static {
    fn take_stdin(&mut self) -> Option<Box<dyn Write + Send>>;

    fn take_stdout(&mut self) -> Option<Box<dyn Read + Send>>;

    fn take_stderr(&mut self) -> Option<Box<dyn Read + Send>>;

    /// OS process id, when there is a real process behind this handle.
    fn id(&self) -> Option<u32>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;

    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess {
    child: FfmpegChild,
    /// Read once at spawn; `FfmpegChild::as_inner` needs `&mut`.
    pid: u32,
}

impl FfmpegProcess for SidecarProcess {
    fn take_stdin(&mut self) -> Option<Box<dyn Write + Send>> {
        self.child
            .take_stdin()
            .map(|stdin| Box::new(stdin) as Box<dyn Write + Send>)
    }

    fn take_stdout(&mut self) -> Option<Box<dyn Read + Send>> {
        self.child
            .take_stdout()
            .map(|stdout| Box::new(stdout) as Box<dyn Read + Send>)
    }

    fn take_stderr(&mut self) -> Option<Box<dyn Read + Send>> {
        self.child
            .take_stderr()
            .map(|stderr| Box::new(stderr) as Box<dyn Read + Send>)
    }

    fn id(&self) -> Option<u32> {
        Some(self.pid)
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.child.wait().map_err(|e| command_wait_error("ffmpeg (sidecar)", e))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let program = cmd.as_inner().get_program().to_string_lossy().into_owned();
        let mut child = cmd.spawn().map_err(|e| command_start_error(program, e))?;
        let pid = child.as_inner().id();
        Ok(SidecarProcess { child, pid })
    }
}
