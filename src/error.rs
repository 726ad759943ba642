//! Error types for pkgprobe operations.
//!
//! This module defines [`ProbeError`], the primary error type used throughout
//! the library, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Per-target probe failures never surface here; they are encoded in
//!   [`ProbeResult`](crate::probe::ProbeResult)
//! - Catalog and cache failures are structural and abort the current call
//! - Use `anyhow::Error` (via `ProbeError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pkgprobe operations.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// The package catalog could not be loaded.
    #[error("Failed to load catalog {path}: {message}")]
    CatalogLoad { path: PathBuf, message: String },

    /// A version string did not match the expected dotted-numeric shape.
    #[error("Invalid version '{input}': expected {expected}")]
    InvalidVersion {
        input: String,
        expected: &'static str,
    },

    /// Reading or writing an availability table failed.
    #[error("Cache I/O error at {path}: {source}")]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An availability table contains rows that cannot be decoded.
    #[error("Malformed cache table {path}: {message}")]
    CacheFormat { path: PathBuf, message: String },

    /// The whole operation ran past its configured deadline.
    #[error("Operation did not finish within {seconds}s")]
    DeadlineExceeded { seconds: u64 },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProbeError {
    /// Wrap an I/O error raised while touching a cache table.
    pub fn cache_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheIo {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for pkgprobe operations.
pub type Result<T> = std::result::Result<T, ProbeError>;
