//! Persistent record of past probe results.
//!
//! Results are stored as one CSV table per version family
//! (`<major.minor.patch>.csv`). Writes only add rows that are not yet
//! recorded; explicit updates replace them. Every read-merge-write cycle
//! holds an advisory lock on a sibling `.lock` file.

pub mod lock;
pub mod row;
pub mod store;
pub mod table;

pub use lock::TableLock;
pub use row::{CacheRow, COLUMNS};
pub use store::{AvailabilityCache, FamilySummary};
pub use table::{CacheTable, Lookup};

/// Get the default cache directory.
pub fn default_cache_dir() -> std::path::PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("pkgprobe")
        .join("reports")
}
