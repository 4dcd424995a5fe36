// ============================================================================
// cutkit-cli/src/terminal.rs
// ============================================================================
//
// TERMINAL OUTPUT: Progress Bars and Alerts
//
// TerminalSink is the CLI's ProgressSink. Busy shows a spinner, progress
// turns it into a percentage bar, and alerts are printed in red above it.
// When stderr is not a terminal nothing is drawn.

use console::Term;
use cutkit_core::ProgressSink;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use std::sync::Mutex;
use std::time::Duration;

struct ActiveBar {
    pb: ProgressBar,
    /// Switched from spinner to percentage bar
    determinate: bool,
}

pub struct TerminalSink {
    label: String,
    bar: Mutex<Option<ActiveBar>>,
    interactive: bool,
}

impl TerminalSink {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            bar: Mutex::new(None),
            interactive: Term::stderr().is_term(),
        }
    }

    fn spinner(&self) -> ActiveBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(self.label.clone());
        if !self.interactive {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        ActiveBar {
            pb,
            determinate: false,
        }
    }

    fn bar_style(&self) -> Option<ProgressStyle> {
        let width = Term::stderr().size().1;
        let template = if width >= 80 {
            "  ⧖ {msg}: {percent:>3}% [{bar:30}] ({elapsed_precise})"
        } else {
            "  ⧖ {percent:>3}% [{bar:10}]"
        };
        ProgressStyle::default_bar()
            .template(template)
            .ok()
            .map(|style| style.progress_chars("##."))
    }

    /// Replaces the spinner message, e.g. with a recording's elapsed time.
    pub fn set_message(&self, message: String) {
        if let Ok(bar) = self.bar.lock() {
            if let Some(active) = bar.as_ref() {
                active.pb.set_message(message);
            }
        }
    }
}

impl ProgressSink for TerminalSink {
    fn busy(&self, busy: bool) {
        let Ok(mut bar) = self.bar.lock() else {
            return;
        };
        if busy {
            if bar.is_none() {
                *bar = Some(self.spinner());
            }
        } else if let Some(active) = bar.take() {
            active.pb.finish_and_clear();
        }
    }

    fn progress(&self, percent: u32) {
        let Ok(mut bar) = self.bar.lock() else {
            return;
        };
        let active = bar.get_or_insert_with(|| self.spinner());
        if !active.determinate {
            active.pb.set_length(100);
            if let Some(style) = self.bar_style() {
                active.pb.set_style(style);
            }
            active.determinate = true;
        }
        active.pb.set_position(u64::from(percent));
    }

    fn alert(&self, message: &str) {
        let line = format!("{} {}", "✗".bright_red().bold(), message.bright_red());
        match self.bar.lock().ok().as_deref().and_then(Option::as_ref) {
            Some(active) => active.pb.println(line),
            None => eprintln!("{line}"),
        }
    }
}
