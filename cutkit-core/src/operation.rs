//! Editing operations requested by the front end.
//!
//! An [`Operation`] carries exactly what the user supplied: paths and time
//! text. Validation happens in the command builder, which consumes it.

use crate::error::{CoreError, CoreResult};
use crate::utils::parse_duration;
use std::path::PathBuf;

/// A validated `(start, duration)` pair in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    start: f64,
    duration: f64,
}

impl TimeRange {
    /// Builds a range from start and end seconds. `end` must exceed `start`
    /// by at least half a millisecond, the resolution of `-t`.
    pub fn new(start: f64, end: f64) -> CoreResult<Self> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "time range {start}..{end} is out of bounds"
            )));
        }
        if start >= end || ((end - start) * 1000.0).round() < 1.0 {
            return Err(CoreError::InvalidRange { start, end });
        }
        Ok(Self {
            start,
            duration: end - start,
        })
    }

    /// Parses `HH:MM:SS.fff` start and end text into a range.
    pub fn parse(start: &str, end: &str) -> CoreResult<Self> {
        let start_secs = parse_duration(start).ok_or_else(|| CoreError::InvalidTime(start.to_string()))?;
        let end_secs = parse_duration(end).ok_or_else(|| CoreError::InvalidTime(end.to_string()))?;
        Self::new(start_secs, end_secs)
    }

    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    #[must_use]
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// A segment of a source file, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub source: PathBuf,
    /// Start time text, `HH:MM:SS.fff`
    pub start: String,
    /// End time text, `HH:MM:SS.fff`
    pub end: String,
}

impl Segment {
    pub fn new(source: impl Into<PathBuf>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            start: start.into(),
            end: end.into(),
        }
    }
}

/// High-level editing intents understood by the command builder.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Lossless trim with stream copy
    Cut(Segment),
    /// Re-encoding trim to H.264/MP4
    Convert(Segment),
    /// Audio-only export to MP3
    ExtractAudio(Segment),
    /// Single JPEG frame at `timestamp` seconds
    CaptureImage { source: PathBuf, timestamp: f64 },
    /// Stream-copy concatenation of identically encoded files
    Merge { sources: Vec<PathBuf> },
    /// Fragmented MP4 streamed on stdout, starting at `start` seconds
    FastTranscode { source: PathBuf, start: Option<f64> },
    /// Metadata-only run whose stderr reports the duration
    ProbeDuration { source: PathBuf },
    /// Screen recording into `output_dir`, stopped through stdin
    Record { output_dir: PathBuf },
}

impl Operation {
    /// Short lowercase name used in logs and error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Cut(_) => "cut",
            Operation::Convert(_) => "convert",
            Operation::ExtractAudio(_) => "extract-audio",
            Operation::CaptureImage { .. } => "capture-image",
            Operation::Merge { .. } => "merge",
            Operation::FastTranscode { .. } => "fast-transcode",
            Operation::ProbeDuration { .. } => "probe-duration",
            Operation::Record { .. } => "record",
        }
    }
}
