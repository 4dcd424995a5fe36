// ============================================================================
// cutkit-core/src/runner.rs
// ============================================================================
//
// PROCESS RUNNER: Spawning ffmpeg and Following its Diagnostic Stream
//
// The runner takes an Invocation, spawns ffmpeg through an FfmpegSpawner and
// returns a ProcessHandle straight away. Background threads then:
//
// - write the stdin payload (if any) and close stdin
// - read stderr, split it into segments and feed every registered observer
// - collect stdout into memory for piped outputs, or drain it otherwise
// - wait for the exit status, clear busy and resolve the result channel
//
// Per invocation: Idle -> Spawned -> Running -> Succeeded | Failed. The result
// channel resolves exactly once. There are no retries and no timeouts; the
// only way to stop a running process early is ProcessHandle::stop.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, command_failed_error};
use crate::external::{FfmpegCommandBuilder, FfmpegProcess, FfmpegSpawner, SidecarSpawner};
use crate::invocation::{Delivery, Invocation, OutputTarget};
use crate::progress_reporting::ffmpeg_handler::{
    LogObserver, ProgressMonitor, SegmentSplitter, StreamObserver, extract_failure_message,
};
use crate::progress_reporting::SharedSink;

use log::{debug, info, warn};
use std::io::{self, Read, Write};
use std::process::ExitStatus;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Token that makes ffmpeg finish the current output and exit.
pub const STOP_TOKEN: &[u8] = b"q";

const READ_CHUNK: usize = 8 * 1024;

type ObserverList = Arc<Mutex<Vec<Box<dyn StreamObserver>>>>;

/// What a finished process leaves behind.
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    /// Everything ffmpeg wrote to stderr, lossily decoded
    pub diagnostics: String,
    /// Collected stdout, for piped outputs
    pub stdout: Option<Vec<u8>>,
}

/// Spawns ffmpeg invocations.
pub struct ProcessRunner<S: FfmpegSpawner = SidecarSpawner> {
    spawner: S,
    command_builder: FfmpegCommandBuilder,
}

impl ProcessRunner<SidecarSpawner> {
    /// Creates a runner spawning real ffmpeg processes.
    #[must_use]
    pub fn new(config: &CoreConfig) -> Self {
        Self::with_spawner(config, SidecarSpawner)
    }
}

impl<S: FfmpegSpawner> ProcessRunner<S> {
    /// Creates a runner using a custom spawner.
    pub fn with_spawner(config: &CoreConfig, spawner: S) -> Self {
        Self {
            spawner,
            command_builder: FfmpegCommandBuilder::new(&config.ffmpeg_path)
                .with_hide_banner(config.hide_banner),
        }
    }

    #[must_use]
    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Spawns `invocation` and returns a handle to the running process.
    ///
    /// Spawn failures are returned directly (and alerted in report mode).
    /// Everything that happens after the spawn is delivered through
    /// [`ProcessHandle::wait`].
    pub fn run(&self, invocation: Invocation, sink: SharedSink) -> CoreResult<ProcessHandle> {
        let cmd = self.command_builder.build(&invocation);
        info!("Starting {}", invocation.operation);
        debug!("FFmpeg command: {}", self.command_builder.command_line(&cmd));

        let signal_busy = invocation.options.signal_busy;
        if signal_busy {
            sink.busy(true);
        }

        let mut process = match self.spawner.spawn(cmd) {
            Ok(process) => process,
            Err(e) => {
                warn!("Failed to spawn ffmpeg for {}: {}", invocation.operation, e);
                if invocation.delivery == Delivery::Report {
                    sink.alert(&e.user_message());
                }
                if signal_busy {
                    sink.busy(false);
                }
                return Err(e);
            }
        };

        let pid = process.id();
        let mut stdin = process.take_stdin();
        let stdin_writer = invocation.stdin.clone().and_then(|payload| match stdin.take() {
            Some(writer) => Some(spawn_stdin_writer(writer, payload)),
            None => {
                warn!("No stdin available for {} payload", invocation.operation);
                None
            }
        });

        let initial: Vec<Box<dyn StreamObserver>> = vec![
            Box::new(ProgressMonitor::new(invocation.target_duration(), sink.clone())),
            Box::new(LogObserver),
        ];
        let observers: ObserverList = Arc::new(Mutex::new(initial));

        let stderr_reader = process
            .take_stderr()
            .map(|stderr| spawn_stderr_reader(stderr, observers.clone()));
        let stdout_reader = process.take_stdout().map(|stdout| {
            let capacity = match invocation.output {
                OutputTarget::Pipe => Some(invocation.options.stdout_capacity.unwrap_or(0)),
                _ => None,
            };
            spawn_stdout_reader(stdout, capacity)
        });

        let (tx, rx) = mpsc::sync_channel(1);
        let operation = invocation.operation;
        let delivery = invocation.delivery;
        let waiter_sink = sink.clone();
        let waiter = thread::Builder::new()
            .name(format!("ffmpeg-{operation}"))
            .spawn(move || {
                let readers = Readers {
                    stdin_writer,
                    stderr_reader,
                    stdout_reader,
                };
                let result = finish(process, readers, operation, delivery, &waiter_sink);
                if signal_busy {
                    waiter_sink.busy(false);
                }
                send_result(&tx, result);
            })
            .inspect_err(|_| {
                if signal_busy {
                    sink.busy(false);
                }
            })?;

        Ok(ProcessHandle {
            operation,
            pid,
            stdin,
            observers,
            result: rx,
            waiter: Some(waiter),
        })
    }
}

/// Handle to a running ffmpeg process.
///
/// The process itself is owned by the runner's waiter thread; the handle
/// keeps stdin (unless a payload was written to it) and the result channel.
pub struct ProcessHandle {
    operation: &'static str,
    pid: Option<u32>,
    stdin: Option<Box<dyn Write + Send>>,
    observers: ObserverList,
    result: Receiver<CoreResult<ProcessOutput>>,
    waiter: Option<JoinHandle<()>>,
}

impl ProcessHandle {
    #[must_use]
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Registers another listener for diagnostic segments. Segments read
    /// before the call are not replayed.
    pub fn attach_observer(&self, observer: Box<dyn StreamObserver>) {
        if let Ok(mut observers) = self.observers.lock() {
            observers.push(observer);
        }
    }

    /// Writes raw bytes to the process's stdin.
    pub fn write_stdin(&mut self, data: &[u8]) -> CoreResult<()> {
        let stdin = self.stdin.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::BrokenPipe, "stdin is not available")
        })?;
        stdin.write_all(data)?;
        stdin.flush()?;
        Ok(())
    }

    /// Asks ffmpeg to finish gracefully by sending the stop token.
    pub fn stop(&mut self) -> CoreResult<()> {
        debug!("Sending stop token to {}", self.operation);
        self.write_stdin(STOP_TOKEN)
    }

    /// Closes stdin; ffmpeg sees end of input.
    pub fn close_stdin(&mut self) {
        self.stdin = None;
    }

    /// Whether the process has exited and its result is ready.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.waiter.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Blocks until the process exits and returns its result.
    pub fn wait(mut self) -> CoreResult<ProcessOutput> {
        self.close_stdin();
        let result = self
            .result
            .recv()
            .map_err(|_| CoreError::ResultLost(self.operation.to_string()))?;
        if let Some(waiter) = self.waiter.take() {
            if waiter.join().is_err() {
                warn!("Waiter thread for {} panicked", self.operation);
            }
        }
        result
    }
}

fn send_result(tx: &SyncSender<CoreResult<ProcessOutput>>, result: CoreResult<ProcessOutput>) {
    // The receiver is gone when the handle was dropped without waiting.
    if tx.send(result).is_err() {
        debug!("Result receiver dropped before completion");
    }
}

fn spawn_stdin_writer(mut writer: Box<dyn Write + Send>, payload: String) -> JoinHandle<()> {
    thread::spawn(move || {
        if let Err(e) = writer.write_all(payload.as_bytes()).and_then(|()| writer.flush()) {
            warn!("Failed to write stdin payload: {e}");
        }
    })
}

fn spawn_stderr_reader(
    mut stderr: Box<dyn Read + Send>,
    observers: ObserverList,
) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut diagnostics = Vec::new();
        let mut splitter = SegmentSplitter::new();
        let mut buf = [0_u8; READ_CHUNK];

        let deliver = |segments: Vec<String>| {
            if segments.is_empty() {
                return;
            }
            if let Ok(mut observers) = observers.lock() {
                for segment in &segments {
                    for observer in observers.iter_mut() {
                        observer.on_segment(segment);
                    }
                }
            }
        };

        loop {
            match stderr.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    diagnostics.extend_from_slice(&buf[..n]);
                    deliver(splitter.push(&buf[..n]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Error reading ffmpeg stderr: {e}");
                    break;
                }
            }
        }
        deliver(splitter.finish().into_iter().collect());
        diagnostics
    })
}

/// Collects stdout when `capacity` is given, otherwise drains it.
fn spawn_stdout_reader(
    mut stdout: Box<dyn Read + Send>,
    capacity: Option<usize>,
) -> JoinHandle<Option<Vec<u8>>> {
    thread::spawn(move || match capacity {
        Some(capacity) => {
            let mut buffer = Vec::with_capacity(capacity);
            if let Err(e) = stdout.read_to_end(&mut buffer) {
                warn!("Error reading ffmpeg stdout: {e}");
            }
            Some(buffer)
        }
        None => {
            if let Err(e) = io::copy(&mut stdout, &mut io::sink()) {
                debug!("Error draining ffmpeg stdout: {e}");
            }
            None
        }
    })
}

/// Background threads attached to one process.
struct Readers {
    stdin_writer: Option<JoinHandle<()>>,
    stderr_reader: Option<JoinHandle<Vec<u8>>>,
    stdout_reader: Option<JoinHandle<Option<Vec<u8>>>>,
}

fn finish<P: FfmpegProcess>(
    mut process: P,
    readers: Readers,
    operation: &'static str,
    delivery: Delivery,
    sink: &SharedSink,
) -> CoreResult<ProcessOutput> {
    let diagnostics = readers
        .stderr_reader
        .and_then(|reader| reader.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default();
    let stdout = readers.stdout_reader.and_then(|reader| reader.join().ok()).flatten();
    let status = match process.wait() {
        Ok(status) => status,
        Err(e) => {
            warn!("Failed to wait for {operation}: {e}");
            if delivery == Delivery::Report {
                sink.alert(&e.user_message());
            }
            return Err(e);
        }
    };
    // Once the process is gone a pending write fails with a broken pipe.
    if let Some(writer) = readers.stdin_writer {
        if writer.join().is_err() {
            warn!("Stdin writer for {operation} panicked");
        }
    }

    let output = ProcessOutput {
        status,
        diagnostics,
        stdout,
    };

    if delivery == Delivery::Capture || status.success() {
        info!("{operation} finished ({status})");
        return Ok(output);
    }

    let mut message = extract_failure_message(&output.diagnostics);
    if message.is_empty() {
        message = format!("ffmpeg exited with {status}");
    }
    warn!("{operation} failed ({status}): {message}");
    sink.alert(&message);
    Err(command_failed_error(operation, status, message))
}
