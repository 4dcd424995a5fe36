// ============================================================================
// cutkit-core/src/config.rs
// ============================================================================
//
// CONFIGURATION: Core Configuration Structures and Constants
//
// This module defines the configuration used by the command builder and the
// process runner, together with the encoding constants baked into each
// operation's argument list.
//
// USAGE:
// Instances of CoreConfig are created by consumers of the library (like
// cutkit-cli), usually via `CoreConfig::from_env()`, and handed to `Cutter`
// or `ProcessRunner`. There is no configuration file.

use std::env;
use std::path::{Path, PathBuf};

// ============================================================================
// DEFAULT CONSTANTS
// ============================================================================

/// Environment variable overriding the ffmpeg executable location.
pub const FFMPEG_PATH_ENV: &str = "CUTKIT_FFMPEG";

/// Directory, relative to the running executable, holding a bundled ffmpeg.
pub const BUNDLED_ASSETS_DIR: &str = "assets";

/// x264 CRF used by Convert. 18 is visually close to lossless.
pub const CONVERT_CRF: u8 = 18;

/// x264 preset used by Convert.
pub const CONVERT_PRESET: &str = "veryfast";

/// x264 preset used by FastTranscode and Record.
pub const FAST_PRESET: &str = "ultrafast";

/// Fragment length for FastTranscode output, in microseconds.
pub const FRAGMENT_DURATION_US: u64 = 1_000_000;

/// VBR quality for extracted MP3 audio (0 is best).
pub const AUDIO_QUALITY: u8 = 0;

/// MJPEG quality for captured frames (2 is near best).
pub const IMAGE_QUALITY: u8 = 2;

/// Default capture frame rate for screen recordings.
pub const DEFAULT_RECORD_FRAME_RATE: u32 = 30;

// ============================================================================
// CORE CONFIGURATION
// ============================================================================

/// Main configuration structure for the cutkit-core library.
///
/// # Examples
///
/// ```rust
/// use cutkit_core::CoreConfig;
/// use std::path::PathBuf;
///
/// let config = CoreConfig {
///     ffmpeg_path: PathBuf::from("/opt/ffmpeg/bin/ffmpeg"),
///     ..CoreConfig::default()
/// };
/// assert!(!config.busy_during_probe);
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Location of the ffmpeg executable
    pub ffmpeg_path: PathBuf,

    /// Pass `-hide_banner` to every invocation
    pub hide_banner: bool,

    /// Whether duration probes raise and clear the busy signal like any
    /// other invocation. Probes are short and usually run while the UI is
    /// loading a file, so this is off by default.
    pub busy_during_probe: bool,

    /// Frames per second captured by Record
    pub record_frame_rate: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            hide_banner: true,
            busy_during_probe: false,
            record_frame_rate: DEFAULT_RECORD_FRAME_RATE,
        }
    }
}

impl CoreConfig {
    /// Creates a configuration using the given ffmpeg executable.
    #[must_use]
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ..Self::default()
        }
    }

    /// Creates a configuration honouring `CUTKIT_FFMPEG`.
    #[must_use]
    pub fn from_env() -> Self {
        match env::var_os(FFMPEG_PATH_ENV) {
            Some(path) if !path.is_empty() => Self::new(path),
            _ => Self::default(),
        }
    }
}

/// Resolves the ffmpeg executable: a bundled copy next to the running
/// executable wins, otherwise ffmpeg-sidecar's lookup (its download
/// directory, then `ffmpeg` on `PATH`).
#[must_use]
pub fn default_ffmpeg_path() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(bundled_ffmpeg_path))
        .filter(|path| path.is_file())
        .unwrap_or_else(ffmpeg_sidecar::paths::ffmpeg_path)
}

/// Path of the bundled ffmpeg under `dir`.
#[must_use]
pub fn bundled_ffmpeg_path(dir: &Path) -> PathBuf {
    let name = if cfg!(windows) { "ffmpeg.exe" } else { "ffmpeg" };
    dir.join(BUNDLED_ASSETS_DIR).join(name)
}
