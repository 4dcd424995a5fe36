//! Fully specified ffmpeg invocations.
//!
//! An [`Invocation`] is what the command builder produces and the process
//! runner consumes: the argument list (without the executable), where the
//! media output goes, what is written to stdin, and how diagnostics are
//! handed back.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Flag whose following argument limits the processed duration.
pub const DURATION_FLAG: &str = "-t";

/// Where an invocation's media output ends up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum OutputTarget {
    /// Written by ffmpeg to a file path (last argument)
    File { path: PathBuf },
    /// Streamed on stdout and collected into memory
    Pipe,
    /// Nothing is produced
    None,
}

/// How the diagnostic text is handed back when the process exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// Non-zero exit becomes a `ProcessFailure` with a short message,
    /// and the sink is alerted.
    Report,
    /// The full stderr text is returned verbatim whatever the exit code;
    /// the caller interprets it.
    Capture,
}

/// Options bag accompanying the argument list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationOptions {
    /// Working directory for the child process
    pub working_dir: Option<PathBuf>,
    /// Bytes to reserve for piped stdout
    pub stdout_capacity: Option<usize>,
    /// Raise busy at spawn and clear it at exit
    pub signal_busy: bool,
}

impl Default for InvocationOptions {
    fn default() -> Self {
        Self {
            working_dir: None,
            stdout_capacity: None,
            signal_busy: true,
        }
    }
}

/// A complete ffmpeg invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invocation {
    /// Operation name, for logs
    pub operation: &'static str,
    pub args: Vec<String>,
    pub output: OutputTarget,
    /// Text written to stdin right after spawning, then stdin is closed
    pub stdin: Option<String>,
    pub delivery: Delivery,
    pub options: InvocationOptions,
}

impl Invocation {
    /// Creates a report-mode invocation writing to `output`.
    pub fn new(operation: &'static str, args: Vec<String>, output: OutputTarget) -> Self {
        Self {
            operation,
            args,
            output,
            stdin: None,
            delivery: Delivery::Report,
            options: InvocationOptions::default(),
        }
    }

    #[must_use]
    pub fn with_stdin(mut self, payload: String) -> Self {
        self.stdin = Some(payload);
        self
    }

    #[must_use]
    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: InvocationOptions) -> Self {
        self.options = options;
        self
    }

    /// The duration that progress is measured against: the argument right
    /// after the first `-t`, when it parses as positive seconds.
    #[must_use]
    pub fn target_duration(&self) -> Option<f64> {
        let index = self.args.iter().position(|arg| arg == DURATION_FLAG)?;
        self.args
            .get(index + 1)?
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d > 0.0)
    }

    /// The output file path, if this invocation writes one.
    #[must_use]
    pub fn output_path(&self) -> Option<&Path> {
        match &self.output {
            OutputTarget::File { path } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_target_duration_follows_flag() {
        let inv = Invocation::new("cut", args(&["-ss", "10", "-t", "10", "-i", "a.mp4"]), OutputTarget::None);
        assert_eq!(inv.target_duration(), Some(10.0));
    }

    #[test]
    fn test_target_duration_absent() {
        let inv = Invocation::new("probe-duration", args(&["-i", "a.mp4"]), OutputTarget::None);
        assert_eq!(inv.target_duration(), None);

        let dangling = Invocation::new("cut", args(&["-i", "a.mp4", "-t"]), OutputTarget::None);
        assert_eq!(dangling.target_duration(), None);

        let zero = Invocation::new("cut", args(&["-t", "0"]), OutputTarget::None);
        assert_eq!(zero.target_duration(), None);
    }

    #[test]
    fn test_defaults() {
        let inv = Invocation::new("cut", vec![], OutputTarget::Pipe);
        assert_eq!(inv.delivery, Delivery::Report);
        assert!(inv.options.signal_busy);
        assert!(inv.stdin.is_none());
        assert!(inv.output_path().is_none());
    }

    #[test]
    fn test_json_shape() {
        let inv = Invocation::new(
            "cut",
            args(&["-i", "a.mp4", "out.mp4"]),
            OutputTarget::File { path: PathBuf::from("out.mp4") },
        );
        let json = serde_json::to_value(&inv).unwrap();
        assert_eq!(json["operation"], "cut");
        assert_eq!(json["output"], serde_json::json!({ "kind": "file", "path": "out.mp4" }));
        assert_eq!(json["delivery"], "report");
        assert_eq!(json["stdin"], serde_json::Value::Null);
        assert_eq!(json["options"]["signal_busy"], true);

        let piped = Invocation::new("fast-transcode", vec![], OutputTarget::Pipe).with_delivery(Delivery::Capture);
        let json = serde_json::to_value(&piped).unwrap();
        assert_eq!(json["output"], serde_json::json!({ "kind": "pipe" }));
        assert_eq!(json["delivery"], "capture");
    }
}
