//! Output verbosity.

use std::str::FromStr;

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Show every package, including found ones.
    Verbose,
    /// Show problems and summaries.
    #[default]
    Normal,
    /// Show the final answer only.
    Quiet,
    /// Show nothing except errors.
    Silent,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbose" => Ok(Self::Verbose),
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            "silent" => Ok(Self::Silent),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl OutputMode {
    /// Whether per-package lines for found packages are shown.
    pub fn shows_details(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Whether progress bars are shown.
    pub fn shows_spinners(&self) -> bool {
        matches!(self, Self::Verbose | Self::Normal)
    }

    /// Whether status messages are shown.
    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Silent)
    }
}
