//! Configuration schema definitions for pkgprobe.
//!
//! [`ProbeConfig`] maps the YAML file format, where every key is optional.
//! [`Settings`] is the fully resolved form the rest of the crate consumes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::probe::{Concurrency, ProberOptions, RetryPolicy};

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: f64 = 10.0;

/// Longest accepted per-request timeout in seconds (one day).
pub const MAX_TIMEOUT_SECONDS: f64 = 86_400.0;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Root structure of `.pkgprobe/config.yml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Download host substituted for `{host}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Path to the package catalog (YAML or JSON).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,

    /// Directory holding availability tables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Number, `unlimited`, or absent for unlimited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<Concurrency>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    /// Overall limit for one command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_seconds: Option<u64>,
}

/// Values that override whatever the config files say.
///
/// Filled from the environment and from command-line flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub catalog: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub max_concurrency: Option<Concurrency>,
    pub timeout_seconds: Option<f64>,
    pub max_retries: Option<u32>,
    pub deadline_seconds: Option<u64>,
}

impl ConfigOverrides {
    /// Layer `other` on top of `self`.
    pub fn merge(self, other: ConfigOverrides) -> Self {
        Self {
            host: other.host.or(self.host),
            catalog: other.catalog.or(self.catalog),
            cache_dir: other.cache_dir.or(self.cache_dir),
            max_concurrency: other.max_concurrency.or(self.max_concurrency),
            timeout_seconds: other.timeout_seconds.or(self.timeout_seconds),
            max_retries: other.max_retries.or(self.max_retries),
            deadline_seconds: other.deadline_seconds.or(self.deadline_seconds),
        }
    }
}

impl ProbeConfig {
    /// Apply overrides in place.
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(host) = &overrides.host {
            self.host = Some(host.clone());
        }
        if let Some(catalog) = &overrides.catalog {
            self.catalog = Some(catalog.clone());
        }
        if let Some(dir) = &overrides.cache_dir {
            self.cache_dir = Some(dir.clone());
        }
        if let Some(limit) = overrides.max_concurrency {
            self.max_concurrency = Some(limit);
        }
        if let Some(timeout) = overrides.timeout_seconds {
            self.timeout_seconds = Some(timeout);
        }
        if let Some(retries) = overrides.max_retries {
            self.max_retries = Some(retries);
        }
        if let Some(deadline) = overrides.deadline_seconds {
            self.deadline_seconds = Some(deadline);
        }
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Host without trailing slash.
    pub host: String,
    pub catalog: PathBuf,
    pub cache_dir: PathBuf,
    pub max_concurrency: Concurrency,
    pub timeout_seconds: f64,
    pub max_retries: u32,
    pub deadline_seconds: Option<u64>,
}

impl Settings {
    /// Options for a [`Prober`](crate::probe::Prober) built from these settings.
    ///
    /// Timeouts above [`MAX_TIMEOUT_SECONDS`] are capped. Non-positive or
    /// NaN timeouts fall back to the default.
    pub fn prober_options(&self) -> ProberOptions {
        let seconds = if self.timeout_seconds > 0.0 {
            self.timeout_seconds.min(MAX_TIMEOUT_SECONDS)
        } else {
            DEFAULT_TIMEOUT_SECONDS
        };
        let timeout = Duration::try_from_secs_f64(seconds)
            .unwrap_or(Duration::from_secs_f64(DEFAULT_TIMEOUT_SECONDS));
        ProberOptions {
            concurrency: self.max_concurrency,
            timeout,
            retry: RetryPolicy::new(self.max_retries),
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_seconds.map(Duration::from_secs)
    }
}
