use cutkit_core::{CoreConfig, CoreResult, check_dependency};
use owo_colors::OwoColorize;

/// Runs `ffmpeg -version` and reports the outcome.
pub fn run_check(config: &CoreConfig) -> CoreResult<()> {
    check_dependency(&config.ffmpeg_path)?;
    println!(
        "{} ffmpeg found at {}",
        "✓".bright_green(),
        config.ffmpeg_path.display()
    );
    Ok(())
}
