// ============================================================================
// cutkit-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and the File System
//
// This module encapsulates everything that touches the outside world: turning
// an Invocation into an ffmpeg command, spawning it, and reading file sizes.
// Each concern sits behind a trait so the runner and the command builder can
// be exercised with scripted implementations.
//
// KEY COMPONENTS:
// - FfmpegCommandBuilder: Invocation -> ffmpeg_sidecar::FfmpegCommand
// - FfmpegSpawner / FfmpegProcess: spawning and owning the child process
// - FileMetadataProvider: file size lookup for stdout pre-sizing
// - Dependency checking

use crate::error::{CoreError, CoreResult};

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Contains the builder mapping invocations onto ffmpeg commands
pub mod ffmpeg_builder;

/// Contains traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

pub use ffmpeg_builder::FfmpegCommandBuilder;
pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that the ffmpeg executable at `ffmpeg_path` can be started.
///
/// Runs it with `-version` and discards the output.
///
/// # Returns
///
/// * `Ok(())` - The executable started and exited successfully
/// * `Err(CoreError::DependencyNotFound)` - Nothing executable at that path
/// * `Err(CoreError::SpawnFailure)` - It exists but could not be started
pub fn check_dependency(ffmpeg_path: &Path) -> CoreResult<()> {
    let result = Command::new(ffmpeg_path)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(status) if status.success() => {
            log::debug!("Found ffmpeg at {}", ffmpeg_path.display());
            Ok(())
        }
        Ok(status) => {
            log::warn!("'{} -version' exited with {}", ffmpeg_path.display(), status);
            Err(crate::error::command_failed_error(
                ffmpeg_path.display().to_string(),
                status,
                "version check failed",
            ))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", ffmpeg_path.display());
            Err(CoreError::DependencyNotFound(ffmpeg_path.display().to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check for '{}': {}", ffmpeg_path.display(), e);
            Err(crate::error::command_start_error(ffmpeg_path.display().to_string(), e))
        }
    }
}

// ============================================================================
// FILE METADATA ACCESS
// ============================================================================

/// Trait for abstracting file metadata access operations.
///
/// FastTranscode reserves its output buffer from the input size; going
/// through this trait keeps the builder testable without real media files.
///
/// # Examples
///
/// ```rust
/// use cutkit_core::external::FileMetadataProvider;
/// use cutkit_core::CoreResult;
/// use std::path::Path;
///
/// struct FixedSize;
///
/// impl FileMetadataProvider for FixedSize {
///     fn get_size(&self, _path: &Path) -> CoreResult<u64> {
///         Ok(1_000_000)
///     }
/// }
///
/// assert_eq!(FixedSize.get_size(Path::new("/fake/path")).unwrap(), 1_000_000);
/// ```
pub trait FileMetadataProvider {
    /// Gets the size of the file at the given path in bytes.
    fn get_size(&self, path: &Path) -> CoreResult<u64>;
}

/// Standard implementation of FileMetadataProvider using `std::fs::metadata`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFsMetadataProvider;

impl FileMetadataProvider for StdFsMetadataProvider {
    fn get_size(&self, path: &Path) -> CoreResult<u64> {
        Ok(std::fs::metadata(path)?.len())
    }
}
