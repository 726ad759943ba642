//! Visual theme and styling.

use console::Style;

use crate::cache::Lookup;
use crate::probe::Existence;

/// Colors and icons for terminal output.
#[derive(Debug, Clone)]
pub struct ProbeTheme {
    /// Found packages and success messages (green).
    pub success: Style,
    /// Warnings and inconclusive probes (orange).
    pub warning: Style,
    /// Errors and missing packages (red bold).
    pub error: Style,
    /// Secondary text.
    pub dim: Style,
    /// Versions and other key values (bold).
    pub highlight: Style,
    /// Headers (magenta bold).
    pub header: Style,
}

impl Default for ProbeTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeTheme {
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().magenta(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
        }
    }

    /// Pick colored or plain depending on the terminal.
    pub fn detect() -> Self {
        if should_use_colors() {
            Self::new()
        } else {
            Self::plain()
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(title))
    }

    /// Icon for a probe outcome.
    pub fn existence_icon(&self, existence: Existence) -> String {
        match existence {
            Existence::Found => self.success.apply_to("✓").to_string(),
            Existence::Missing => self.error.apply_to("✗").to_string(),
            Existence::Unknown => self.warning.apply_to("?").to_string(),
        }
    }

    /// Styled `true` / `false` / `unknown` / `not recorded`.
    pub fn format_lookup(&self, lookup: Lookup) -> String {
        let style = match lookup {
            Lookup::Recorded(Existence::Found) => &self.success,
            Lookup::Recorded(Existence::Missing) => &self.error,
            Lookup::Recorded(Existence::Unknown) => &self.warning,
            Lookup::NotRecorded => &self.dim,
        };
        style.apply_to(lookup.label()).to_string()
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_formats_messages() {
        let theme = ProbeTheme::plain();
        assert_eq!(theme.format_success("Complete"), "✓ Complete");
        assert_eq!(theme.format_warning("Caution"), "⚠ Caution");
        assert_eq!(theme.format_error("Failed"), "✗ Failed");
    }

    #[test]
    fn existence_icons() {
        let theme = ProbeTheme::plain();
        assert_eq!(theme.existence_icon(Existence::Found), "✓");
        assert_eq!(theme.existence_icon(Existence::Missing), "✗");
        assert_eq!(theme.existence_icon(Existence::Unknown), "?");
    }

    #[test]
    fn lookup_labels_are_plain_text() {
        let theme = ProbeTheme::plain();
        assert_eq!(theme.format_lookup(Lookup::Recorded(Existence::Found)), "true");
        assert_eq!(theme.format_lookup(Lookup::NotRecorded), "not recorded");
    }

    #[test]
    fn colored_theme_keeps_text() {
        let theme = ProbeTheme::new();
        assert!(theme.format_error("boom").contains("boom"));
    }
}
