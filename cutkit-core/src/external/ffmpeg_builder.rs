//! FFmpeg command builder
//!
//! Maps an [`Invocation`] onto an `ffmpeg_sidecar` command: executable path,
//! common leading options and the invocation's argument list. Stdio is piped
//! on all three streams by ffmpeg-sidecar.

use crate::invocation::Invocation;
use ffmpeg_sidecar::command::FfmpegCommand;
use std::path::{Path, PathBuf};

/// Builder for creating `FFmpeg` commands from invocations
#[derive(Debug, Clone)]
pub struct FfmpegCommandBuilder {
    ffmpeg_path: PathBuf,
    hide_banner: bool,
}

impl FfmpegCommandBuilder {
    /// Creates a builder for the executable at `ffmpeg_path`
    #[must_use]
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            hide_banner: true,
        }
    }

    /// Sets whether to hide the `FFmpeg` banner
    #[must_use]
    pub fn with_hide_banner(mut self, hide: bool) -> Self {
        self.hide_banner = hide;
        self
    }

    #[must_use]
    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }

    /// Builds the `FFmpeg` command for `invocation`
    #[must_use]
    pub fn build(&self, invocation: &Invocation) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new_with_path(&self.ffmpeg_path);
        if self.hide_banner {
            cmd.arg("-hide_banner");
        }
        cmd.args(&invocation.args);

        if let Some(dir) = &invocation.options.working_dir {
            cmd.as_inner_mut().current_dir(dir);
        }

        cmd
    }

    /// Renders a command line for logs, quoting arguments containing spaces.
    #[must_use]
    pub fn command_line(&self, cmd: &FfmpegCommand) -> String {
        let program = self.ffmpeg_path.to_string_lossy().into_owned();
        std::iter::once(program)
            .chain(command_args(cmd))
            .map(|arg| if arg.contains(' ') { format!("\"{arg}\"") } else { arg })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Lists the arguments of a built command, excluding the executable.
#[must_use]
pub fn command_args(cmd: &FfmpegCommand) -> Vec<String> {
    cmd.get_args()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::{InvocationOptions, OutputTarget};

    fn invocation() -> Invocation {
        Invocation::new(
            "cut",
            vec!["-i".to_string(), "my movie.mp4".to_string()],
            OutputTarget::None,
        )
    }

    #[test]
    fn test_builder_prepends_hide_banner() {
        let mut cmd = FfmpegCommandBuilder::new("/opt/ffmpeg").build(&invocation());
        let args = command_args(&cmd);
        let banner = args.iter().position(|a| a == "-hide_banner").unwrap();
        assert_eq!(&args[banner..], ["-hide_banner", "-i", "my movie.mp4"]);
        assert_eq!(cmd.as_inner().get_program(), "/opt/ffmpeg");
    }

    #[test]
    fn test_builder_without_banner_flag() {
        let cmd = FfmpegCommandBuilder::new("ffmpeg")
            .with_hide_banner(false)
            .build(&invocation());
        let args = command_args(&cmd);
        assert!(!args.iter().any(|a| a == "-hide_banner"));
        assert!(args.ends_with(&["-i".to_string(), "my movie.mp4".to_string()]));
    }

    #[test]
    fn test_builder_sets_working_dir() {
        let inv = invocation().with_options(InvocationOptions {
            working_dir: Some(PathBuf::from("/tmp")),
            ..InvocationOptions::default()
        });
        let mut cmd = FfmpegCommandBuilder::new("ffmpeg").build(&inv);
        assert_eq!(cmd.as_inner().get_current_dir(), Some(Path::new("/tmp")));
    }

    #[test]
    fn test_command_line_quotes_spaces() {
        let builder = FfmpegCommandBuilder::new("/opt/my tools/ffmpeg");
        let cmd = builder.build(&invocation());
        let line = builder.command_line(&cmd);
        assert!(line.starts_with("\"/opt/my tools/ffmpeg\" "));
        assert!(line.ends_with("-hide_banner -i \"my movie.mp4\""));
    }
}
