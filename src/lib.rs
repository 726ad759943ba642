//! pkgprobe - Release artifact availability prober.
//!
//! pkgprobe expands a catalog of URL templates into concrete download
//! URLs for a build, checks each one with a HEAD request, and records the
//! outcome in a per-family CSV cache so later runs can answer from disk or
//! resume where the last scan stopped.
//!
//! # Modules
//!
//! - [`cache`] - CSV availability tables, one per version family
//! - [`catalog`] - Package catalog loading and URL template expansion
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, layering, and validation
//! - [`error`] - Error types and result aliases
//! - [`orchestrator`] - Probe runs, reports, and rechecks
//! - [`probe`] - Concurrent HEAD-based existence checks with retries
//! - [`scanner`] - Search for the newest fully published build
//! - [`ui`] - Spinners, reports, and terminal output
//! - [`version`] - Four-component version numbers
//!
//! # Example
//!
//! ```
//! use pkgprobe::catalog::{TargetCatalog, TargetFilter};
//! use pkgprobe::version::Version;
//! use std::path::Path;
//!
//! let catalog = TargetCatalog::parse(
//!     "core:\n  pkgA: \"{host}/{version}/{build}/pkgA.zip\"\n",
//!     Path::new("catalog.yml"),
//!     "https://downloads.example.com",
//! )
//! .unwrap();
//!
//! let version: Version = "7.5.0.12".parse().unwrap();
//! let targets = catalog.expand(&version, &TargetFilter::default());
//! assert_eq!(targets[0].url, "https://downloads.example.com/7.5.0/12/pkgA.zip");
//! ```
//!
//! For probing against a live server, see the integration tests.

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod probe;
pub mod scanner;
pub mod ui;
pub mod version;

pub use error::{ProbeError, Result};
