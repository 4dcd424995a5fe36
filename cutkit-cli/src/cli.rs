// cutkit-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Cutkit: lossless cutting and conversion with ffmpeg",
    long_about = "Cuts, converts, merges and records media by driving ffmpeg through cutkit-core."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the ffmpeg executable
    #[arg(long, global = true, value_name = "PATH", env = "CUTKIT_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Enable debug logging, including ffmpeg's own output
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Also write the log to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Print the ffmpeg invocation as JSON instead of running it
    #[arg(long, global = true, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cut a segment without re-encoding (stream copy)
    Cut(RangeArgs),

    /// Cut a segment and re-encode it to H.264/MP4
    Convert(RangeArgs),

    /// Export the audio of a segment to MP3
    ExtractAudio(RangeArgs),

    /// Save a single frame as JPEG
    Capture(CaptureArgs),

    /// Concatenate identically encoded files without re-encoding
    Merge(MergeArgs),

    /// Transcode to fragmented MP4 as fast as possible
    Transcode(TranscodeArgs),

    /// Print the duration of a media file in seconds
    Probe(ProbeArgs),

    /// Record the screen until Enter is pressed or the duration elapses
    Record(RecordArgs),

    /// Check that ffmpeg can be started
    Check,
}

#[derive(Args, Debug, Clone)]
pub struct RangeArgs {
    /// Source media file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Segment start (HH:MM:SS.fff)
    #[arg(short, long, value_name = "TIME")]
    pub start: String,

    /// Segment end (HH:MM:SS.fff)
    #[arg(short, long, value_name = "TIME")]
    pub end: String,
}

#[derive(Args, Debug, Clone)]
pub struct CaptureArgs {
    /// Source media file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Position of the frame (HH:MM:SS.fff or seconds)
    #[arg(short, long, value_name = "TIME")]
    pub at: String,
}

#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    /// Files to concatenate, in order
    #[arg(value_name = "INPUTS", num_args = 2.., required = true)]
    pub inputs: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct TranscodeArgs {
    /// Source media file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Where to write the fragmented MP4
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Start position (HH:MM:SS.fff or seconds)
    #[arg(short, long, value_name = "TIME")]
    pub start: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    /// Media file to probe
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    /// Directory for the recording
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Stop automatically after this many seconds
    #[arg(short, long, value_name = "SECONDS")]
    pub duration: Option<f64>,
}
