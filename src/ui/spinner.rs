//! Progress spinners and bars.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::theme::ProbeTheme;
use super::SpinnerHandle;

/// A spinner that turns into a bar once the total is known.
pub struct ProgressSpinner {
    bar: ProgressBar,
}

impl ProgressSpinner {
    /// Create a new spinner with a message.
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.magenta} {msg}")
        {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self { bar }
    }

    /// Create a spinner that doesn't show (for quiet mode).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    fn finish_with(&mut self, line: String) {
        if let Ok(style) = ProgressStyle::default_spinner().template("{msg}") {
            self.bar.set_style(style);
        }
        self.bar.finish_with_message(line);
    }
}

/// Switch `bar` to a determinate bar of `total` items.
pub fn show_as_bar(bar: &ProgressBar, total: u64) {
    if bar.length() == Some(total) {
        return;
    }
    bar.set_length(total);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.magenta} {msg} [{bar:24.magenta/dim}] {pos}/{len}")
    {
        bar.set_style(style.progress_chars("█░ "));
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        self.finish_with(ProbeTheme::detect().format_success(msg));
    }

    fn finish_error(&mut self, msg: &str) {
        self.finish_with(ProbeTheme::detect().format_error(msg));
    }

    fn finish_clear(&mut self) {
        self.bar.finish_and_clear();
    }

    fn progress_bar(&self) -> Option<ProgressBar> {
        Some(self.bar.clone())
    }
}
