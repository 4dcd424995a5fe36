//! `FFmpeg` diagnostic stream handling
//!
//! ffmpeg writes its banner, stream info and status lines to stderr. Status
//! lines are terminated by `\r`, everything else by `\n`, and a single read
//! may end halfway through a line. [`SegmentSplitter`] reassembles complete
//! segments; observers then look at one segment at a time.

use crate::progress_reporting::ProgressSink;
use crate::utils::{parse_duration, parse_ffmpeg_time};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static TIME_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\btime=(\d{2,}:\d{2}:\d{2}\.\d{2,3})\b").expect("valid time regex"));

static DURATION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Duration: ([0-9:.]+),").expect("valid duration regex"));

/// Repeatable listener for diagnostic segments of one invocation.
pub trait StreamObserver: Send {
    fn on_segment(&mut self, segment: &str);
}

/// Splits raw stderr chunks into `\r`/`\n` terminated segments, keeping any
/// unterminated tail until the next chunk. Splitting happens on bytes so a
/// multi-byte character cut by a read boundary is decoded whole.
#[derive(Debug, Default)]
pub struct SegmentSplitter {
    pending: Vec<u8>,
}

impl SegmentSplitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns every segment it completes. Empty
    /// segments (from `\r\n` pairs) are dropped.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut segments = Vec::new();
        while let Some(index) = self.pending.iter().position(|b| matches!(b, b'\r' | b'\n')) {
            let segment: Vec<u8> = self.pending.drain(..=index).collect();
            let segment = &segment[..segment.len() - 1];
            if !segment.is_empty() {
                segments.push(String::from_utf8_lossy(segment).into_owned());
            }
        }
        segments
    }

    /// Returns whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        (!rest.is_empty()).then(|| String::from_utf8_lossy(&rest).into_owned())
    }
}

/// Extracts the elapsed media time, in seconds, from a status segment.
///
/// Malformed or missing markers yield `None` and are simply skipped.
#[must_use]
pub fn parse_progress_time(segment: &str) -> Option<f64> {
    TIME_MARKER
        .captures(segment)
        .and_then(|caps| parse_ffmpeg_time(&caps[1]))
}

/// Extracts the input duration reported as `Duration: HH:MM:SS.ff,`.
///
/// Returns 0 when the text carries no parseable duration.
#[must_use]
pub fn parse_reported_duration(diagnostics: &str) -> f64 {
    DURATION_MARKER
        .captures(diagnostics)
        .and_then(|caps| parse_duration(&caps[1]))
        .unwrap_or(0.0)
}

/// Percentage of `target` covered by `elapsed`, rounded and capped at 100.
#[must_use]
pub fn progress_percent(elapsed: f64, target: f64) -> Option<u32> {
    if !(target > 0.0) || !elapsed.is_finite() || elapsed < 0.0 {
        return None;
    }
    let percent = (elapsed / target * 100.0).round().min(100.0);
    Some(percent as u32)
}

/// Best-effort short message from a failed run: the text after the last
/// colon of the last non-empty line. ffmpeg usually ends with
/// `<context>: <message>`.
#[must_use]
pub fn extract_failure_message(diagnostics: &str) -> String {
    let last_line = diagnostics
        .trim()
        .rsplit(['\n', '\r'])
        .next()
        .unwrap_or_default();
    let message = last_line
        .rsplit_once(':')
        .map_or(last_line, |(_, tail)| tail)
        .trim();
    message.to_string()
}

/// Turns `time=` markers into progress signals against a target duration.
pub struct ProgressMonitor {
    target: Option<f64>,
    sink: Arc<dyn ProgressSink>,
    last_percent: Option<u32>,
}

impl ProgressMonitor {
    /// Creates a monitor; without a target it never emits anything.
    pub fn new(target: Option<f64>, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            target: target.filter(|d| *d > 0.0),
            sink,
            last_percent: None,
        }
    }

    #[must_use]
    pub fn last_percent(&self) -> Option<u32> {
        self.last_percent
    }
}

impl StreamObserver for ProgressMonitor {
    fn on_segment(&mut self, segment: &str) {
        let Some(target) = self.target else {
            return;
        };
        let Some(percent) = parse_progress_time(segment).and_then(|t| progress_percent(t, target)) else {
            return;
        };
        if self.last_percent != Some(percent) {
            self.last_percent = Some(percent);
            self.sink.progress(percent);
        }
    }
}

/// Reports every elapsed-time marker to a callback. Used for recordings,
/// which have no target duration.
pub struct TimeUpdateObserver<F> {
    callback: F,
}

impl<F> TimeUpdateObserver<F>
where
    F: FnMut(f64) + Send,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> StreamObserver for TimeUpdateObserver<F>
where
    F: FnMut(f64) + Send,
{
    fn on_segment(&mut self, segment: &str) {
        if let Some(elapsed) = parse_progress_time(segment) {
            (self.callback)(elapsed);
        }
    }
}

/// Forwards segments to the `log` facade at debug level.
#[derive(Debug, Default)]
pub struct LogObserver;

impl StreamObserver for LogObserver {
    fn on_segment(&mut self, segment: &str) {
        log::debug!(target: "ffmpeg_log", "{segment}");
    }
}
