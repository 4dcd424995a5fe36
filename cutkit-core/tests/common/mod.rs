// cutkit-core/tests/common/mod.rs

// --- Mocking Infrastructure (for testing) ---

#![allow(dead_code)]

use cutkit_core::error::{CoreError, CoreResult, command_wait_error};
use cutkit_core::external::ffmpeg_builder::command_args;
use cutkit_core::external::{FfmpegProcess, FfmpegSpawner, FileMetadataProvider};
use cutkit_core::progress_reporting::ProgressSink;
use ffmpeg_sidecar::command::FfmpegCommand;
use std::io::{self, Cursor, Read, Write};
use std::path::Path;
use std::process::ExitStatus;
use std::sync::{Arc, Condvar, Mutex};

#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

/// Bytes written to a mock process's stdin, with a signal for waiters.
#[derive(Default)]
pub struct StdinState {
    data: Mutex<Vec<u8>>,
    written: Condvar,
}

impl StdinState {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.data.lock().unwrap()).into_owned()
    }

    fn wait_for_data(&self) {
        let mut data = self.data.lock().unwrap();
        while data.is_empty() {
            data = self.written.wait(data).unwrap();
        }
    }
}

struct MockStdin(Arc<StdinState>);

impl Write for MockStdin {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.data.lock().unwrap().extend_from_slice(buf);
        self.0.written.notify_all();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Stderr that only starts flowing once something was written to stdin.
struct GatedReader {
    gate: Arc<StdinState>,
    inner: Cursor<Vec<u8>>,
    opened: bool,
}

impl Read for GatedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.opened {
            self.gate.wait_for_data();
            self.opened = true;
        }
        self.inner.read(buf)
    }
}

/// Scripted behavior of one mock ffmpeg run.
#[derive(Clone, Default)]
pub struct MockScript {
    pub stderr: Vec<u8>,
    pub stdout: Vec<u8>,
    pub exit_code: i32,
    /// Hold stderr back until stdin receives data, like a recording
    /// waiting for the stop token.
    pub wait_for_stdin: bool,
    /// Make `wait` fail instead of returning `exit_code`.
    pub wait_fails: bool,
}

impl MockScript {
    pub fn success(stderr: &str) -> Self {
        Self {
            stderr: stderr.as_bytes().to_vec(),
            ..Self::default()
        }
    }

    pub fn failure(stderr: &str, exit_code: i32) -> Self {
        Self {
            stderr: stderr.as_bytes().to_vec(),
            exit_code,
            ..Self::default()
        }
    }
}

/// Mock implementation of FfmpegProcess.
pub struct MockFfmpegProcess {
    script: MockScript,
    stdin: Arc<StdinState>,
    stdin_taken: bool,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn take_stdin(&mut self) -> Option<Box<dyn Write + Send>> {
        if self.stdin_taken {
            return None;
        }
        self.stdin_taken = true;
        Some(Box::new(MockStdin(self.stdin.clone())))
    }

    fn take_stdout(&mut self) -> Option<Box<dyn Read + Send>> {
        Some(Box::new(Cursor::new(std::mem::take(&mut self.script.stdout))))
    }

    fn take_stderr(&mut self) -> Option<Box<dyn Read + Send>> {
        let inner = Cursor::new(std::mem::take(&mut self.script.stderr));
        if self.script.wait_for_stdin {
            Some(Box::new(GatedReader {
                gate: self.stdin.clone(),
                inner,
                opened: false,
            }))
        } else {
            Some(Box::new(inner))
        }
    }

    fn id(&self) -> Option<u32> {
        None
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        if self.script.wait_fails {
            return Err(command_wait_error(
                "ffmpeg (mock)",
                io::Error::new(io::ErrorKind::Other, "Interrupted system call"),
            ));
        }
        Ok(exit_status(self.script.exit_code))
    }
}

/// One expected spawn: the first call whose arguments contain
/// `arg_pattern` consumes it.
struct MockFfmpegExpectation {
    arg_pattern: String,
    result: CoreResult<MockScript>,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Arc<Mutex<Vec<MockFfmpegExpectation>>>,
    received_calls: Arc<Mutex<Vec<Vec<String>>>>,
    stdins: Arc<Mutex<Vec<Arc<StdinState>>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_expectation(&self, arg_pattern: &str, script: MockScript) {
        self.expectations.lock().unwrap().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result: Ok(script),
        });
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.expectations.lock().unwrap().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result: Err(error),
        });
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.lock().unwrap().clone()
    }

    /// Stdin contents of the n-th successfully spawned process.
    pub fn stdin_of(&self, index: usize) -> String {
        self.stdins.lock().unwrap()[index].contents()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args = command_args(&cmd);
        self.received_calls.lock().unwrap().push(args.clone());

        let mut expectations = self.expectations.lock().unwrap();
        let index = expectations
            .iter()
            .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)))
            .unwrap_or_else(|| panic!("MockFfmpegSpawner: No expectation found for command args: {args:?}"));

        let script = expectations.remove(index).result?;
        let stdin = Arc::new(StdinState::default());
        self.stdins.lock().unwrap().push(stdin.clone());
        Ok(MockFfmpegProcess {
            script,
            stdin,
            stdin_taken: false,
        })
    }
}

/// Reports a fixed size for every path.
#[derive(Clone, Copy)]
pub struct FixedSizeProvider(pub u64);

impl FileMetadataProvider for FixedSizeProvider {
    fn get_size(&self, _path: &Path) -> CoreResult<u64> {
        Ok(self.0)
    }
}

/// Every signal a sink received, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Busy(bool),
    Progress(u32),
    Alert(String),
}

#[derive(Default)]
pub struct RecordingSink {
    signals: Mutex<Vec<Signal>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.signals.lock().unwrap().clone()
    }

    pub fn progress_values(&self) -> Vec<u32> {
        self.signals()
            .into_iter()
            .filter_map(|s| match s {
                Signal::Progress(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.signals()
            .into_iter()
            .filter_map(|s| match s {
                Signal::Alert(m) => Some(m),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn busy(&self, busy: bool) {
        self.signals.lock().unwrap().push(Signal::Busy(busy));
    }

    fn progress(&self, percent: u32) {
        self.signals.lock().unwrap().push(Signal::Progress(percent));
    }

    fn alert(&self, message: &str) {
        self.signals.lock().unwrap().push(Signal::Alert(message.to_string()));
    }
}
