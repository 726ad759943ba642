//! Non-interactive UI for CI/headless environments.

use super::{OutputMode, ProgressSpinner, SpinnerHandle, UserInterface};
use crate::error::Result;

/// UI implementation for non-interactive mode.
///
/// Plain text, no progress bars, and every confirmation takes its
/// default answer.
pub struct NonInteractiveUI {
    mode: OutputMode,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        tracing::debug!("Answering '{}' with default {}", question, default);
        Ok(default)
    }

    fn start_spinner(&mut self, _message: &str) -> Box<dyn SpinnerHandle> {
        Box::new(ProgressSpinner::hidden())
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_uses_default() {
        let mut ui = NonInteractiveUI::new(OutputMode::Normal);
        assert!(ui.confirm("Clear?", true).unwrap());
        assert!(!ui.confirm("Clear?", false).unwrap());
    }

    #[test]
    fn never_interactive() {
        let ui = NonInteractiveUI::new(OutputMode::Verbose);
        assert!(!ui.is_interactive());
        assert_eq!(ui.output_mode(), OutputMode::Verbose);
    }

    #[test]
    fn spinner_is_hidden() {
        let mut ui = NonInteractiveUI::new(OutputMode::Normal);
        let mut spinner = ui.start_spinner("Checking");
        spinner.finish_clear();
    }
}
