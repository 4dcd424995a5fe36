//! Core library for building and running ffmpeg editing commands.
//!
//! This crate turns high-level editing operations (cut, convert, audio
//! extraction, frame capture, merge, fast transcode, duration probe, screen
//! recording) into ffmpeg invocations, runs them, and reports busy state,
//! progress and failures through a [`ProgressSink`].
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use cutkit_core::{CoreConfig, Cutter, LogProgressSink, Segment};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::from_env();
//! let cutter = Cutter::new(&config, Arc::new(LogProgressSink));
//!
//! let output = cutter
//!     .cut(Segment::new("movie.mp4", "00:00:10.000", "00:00:20.000"))
//!     .unwrap();
//! println!("Wrote {}", output.display());
//! ```

pub mod command_builder;
pub mod config;
pub mod cutter;
pub mod error;
pub mod external;
pub mod invocation;
pub mod operation;
pub mod progress_reporting;
pub mod recorder;
pub mod runner;
pub mod utils;

// Re-exports for public API
pub use command_builder::{CommandBuilder, concat_manifest, segment_output_path};
pub use config::CoreConfig;
pub use cutter::Cutter;
pub use error::{CoreError, CoreResult};
pub use external::check_dependency;
pub use invocation::{Delivery, Invocation, InvocationOptions, OutputTarget};
pub use operation::{Operation, Segment, TimeRange};
pub use progress_reporting::ffmpeg_handler::StreamObserver;
pub use progress_reporting::{LogProgressSink, NullProgressSink, ProgressSink, SharedSink};
pub use recorder::{Recorder, Recording};
pub use runner::{ProcessHandle, ProcessOutput, ProcessRunner};
pub use utils::{format_bytes, format_duration, parse_duration, parse_ffmpeg_time};
