// ============================================================================
// cutkit-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Types for the cutkit Core Library
//
// Validation errors (bad time ranges, bad inputs) are raised by the command
// builder before anything is spawned. Process errors come from the runner:
// the executable could not be started, or it exited with a non-zero status.
// Malformed progress markers and missing duration markers are not errors.

use std::process::ExitStatus;
use thiserror::Error;

/// Errors produced by the cutkit core library.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The end of a time range is not after its start.
    #[error("Start time cannot be later than end time ({start} >= {end})")]
    InvalidRange { start: f64, end: f64 },

    /// A time value could not be parsed from user text.
    #[error("Invalid time value: '{0}'")]
    InvalidTime(String),

    /// Any other rejected input (too few files to merge, negative timestamps...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The external tool could not be started.
    #[error("Failed to start '{0}': {1}")]
    SpawnFailure(String, #[source] std::io::Error),

    /// The external tool exited with a non-zero status.
    #[error("'{command}' failed ({status}): {message}")]
    ProcessFailure {
        command: String,
        status: ExitStatus,
        message: String,
    },

    /// Waiting on the external tool failed.
    #[error("Failed waiting for '{0}': {1}")]
    CommandWait(String, #[source] std::io::Error),

    /// The process finished but its result channel was dropped.
    #[error("Result of '{0}' was lost before completion")]
    ResultLost(String),

    #[error("Required dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cutkit core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Builds a [`CoreError::SpawnFailure`] for `cmd`.
pub fn command_start_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::SpawnFailure(cmd.into(), err)
}

/// Builds a [`CoreError::CommandWait`] for `cmd`.
pub fn command_wait_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

/// Builds a [`CoreError::ProcessFailure`] for `cmd`.
pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    message: impl Into<String>,
) -> CoreError {
    CoreError::ProcessFailure {
        command: cmd.into(),
        status,
        message: message.into(),
    }
}

impl CoreError {
    /// Short text suitable for an alert shown to a user.
    ///
    /// Process failures carry only the extracted message; everything else
    /// uses its display form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CoreError::ProcessFailure { message, .. } => message.clone(),
            CoreError::InvalidRange { .. } => "Start time cannot be later than end time".to_string(),
            other => other.to_string(),
        }
    }
}
