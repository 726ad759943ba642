//! Persisted probe results.

use serde::{Deserialize, Serialize};

use crate::probe::{Existence, ProbeResult};
use crate::version::Version;

/// Column order of every availability table.
pub const COLUMNS: [&str; 8] = [
    "version",
    "build",
    "category",
    "name",
    "url",
    "exists",
    "status_code",
    "error",
];

/// One line of an availability table.
///
/// Rows are keyed by `(version, category, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRow {
    pub version: Version,
    pub build: u32,
    pub category: String,
    pub name: String,
    pub url: String,
    /// Empty in the file when the probe was indeterminate.
    pub exists: Option<bool>,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

impl CacheRow {
    /// The uniqueness key of this row.
    pub fn key(&self) -> (&Version, &str, &str) {
        (&self.version, &self.category, &self.name)
    }

    pub fn existence(&self) -> Existence {
        Existence::from_option(self.exists)
    }

    /// Whether the row passes optional name/category filters.
    pub fn matches(&self, name: Option<&str>, category: Option<&str>) -> bool {
        name.is_none_or(|n| self.name == n) && category.is_none_or(|c| self.category == c)
    }
}

impl From<&ProbeResult> for CacheRow {
    fn from(result: &ProbeResult) -> Self {
        Self {
            version: result.version,
            build: result.version.build,
            category: result.category.clone(),
            name: result.name.clone(),
            url: result.url.clone(),
            exists: result.exists.as_option(),
            status_code: result.status_code,
            error: result.error.clone(),
        }
    }
}
