//! Existence probing for package URLs.
//!
//! This module provides:
//! - [`Target`] and [`ProbeResult`], the unit of work and its outcome
//! - [`Existence`], the tri-state verdict of a probe
//! - [`AdmissionGate`], the concurrency limit shared by one batch
//! - [`RetryPolicy`], the retry/backoff wrapper around each attempt
//! - [`Prober`], which runs HEAD checks for a batch of targets

pub mod gate;
pub mod prober;
pub mod retry;

pub use gate::{AdmissionGate, Concurrency};
pub use prober::{BatchProgress, Prober, ProberOptions};
pub use retry::{Attempt, Exhausted, RetryPolicy};

use serde::{Deserialize, Serialize};

use crate::version::Version;

/// One concrete URL to probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub version: Version,
    pub category: String,
    pub name: String,
    pub url: String,
}

/// Tri-state outcome of a probe.
///
/// `Unknown` means the probe could not decide; it is never the same as
/// `Missing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Existence {
    /// Definitive 200 response.
    Found,
    /// Definitive non-200 response or connection failure.
    Missing,
    /// Timeout, exhausted retries or an unexpected error.
    Unknown,
}

impl Existence {
    /// `Some(true)`, `Some(false)` or `None`.
    pub fn as_option(self) -> Option<bool> {
        match self {
            Self::Found => Some(true),
            Self::Missing => Some(false),
            Self::Unknown => None,
        }
    }

    pub fn from_option(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Found,
            Some(false) => Self::Missing,
            None => Self::Unknown,
        }
    }

    pub fn is_found(self) -> bool {
        self == Self::Found
    }

    /// Lowercase label used in listings.
    pub fn label(self) -> &'static str {
        match self {
            Self::Found => "true",
            Self::Missing => "false",
            Self::Unknown => "unknown",
        }
    }
}

impl Serialize for Existence {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Existence {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<bool>::deserialize(deserializer).map(Self::from_option)
    }
}

/// Outcome of probing one [`Target`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub version: Version,
    pub category: String,
    pub name: String,
    pub url: String,
    pub exists: Existence,
    pub status_code: Option<u16>,
    pub error: Option<String>,
    /// HTTP attempts spent on this target.
    #[serde(skip)]
    pub attempts: u32,
}

impl ProbeResult {
    fn from_target(target: &Target, exists: Existence, attempts: u32) -> Self {
        Self {
            version: target.version,
            category: target.category.clone(),
            name: target.name.clone(),
            url: target.url.clone(),
            exists,
            status_code: None,
            error: None,
            attempts,
        }
    }

    /// A definitive HTTP answer.
    pub fn with_status(target: &Target, status: u16, attempts: u32) -> Self {
        let exists = if status == 200 {
            Existence::Found
        } else {
            Existence::Missing
        };
        Self {
            status_code: Some(status),
            ..Self::from_target(target, exists, attempts)
        }
    }

    /// A definitive negative without a status (connection failure).
    pub fn missing(target: &Target, error: impl Into<String>, attempts: u32) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::from_target(target, Existence::Missing, attempts)
        }
    }

    /// An indeterminate outcome.
    pub fn unknown(target: &Target, error: impl Into<String>, attempts: u32) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::from_target(target, Existence::Unknown, attempts)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Target {
        Target {
            version: Version::new(7, 5, 0, 12),
            category: "core".into(),
            name: "pkgA".into(),
            url: "https://h/7.5.0/12/pkgA.zip".into(),
        }
    }

    #[test]
    fn existence_option_round_trip() {
        for e in [Existence::Found, Existence::Missing, Existence::Unknown] {
            assert_eq!(Existence::from_option(e.as_option()), e);
        }
    }

    #[test]
    fn existence_serializes_as_nullable_bool() {
        assert_eq!(serde_json::to_string(&Existence::Found).unwrap(), "true");
        assert_eq!(serde_json::to_string(&Existence::Missing).unwrap(), "false");
        assert_eq!(serde_json::to_string(&Existence::Unknown).unwrap(), "null");
    }

    #[test]
    fn status_200_is_found() {
        let r = ProbeResult::with_status(&target(), 200, 1);
        assert_eq!(r.exists, Existence::Found);
        assert_eq!(r.status_code, Some(200));
        assert!(r.error.is_none());
    }

    #[test]
    fn other_status_is_missing() {
        for status in [204, 301, 403, 404, 500] {
            let r = ProbeResult::with_status(&target(), status, 1);
            assert_eq!(r.exists, Existence::Missing, "status {}", status);
        }
    }

    #[test]
    fn unknown_keeps_reason() {
        let r = ProbeResult::unknown(&target(), "Timeout", 3);
        assert_eq!(r.exists, Existence::Unknown);
        assert_eq!(r.error.as_deref(), Some("Timeout"));
        assert_eq!(r.attempts, 3);
        assert!(r.status_code.is_none());
    }
}
