//! File-backed availability cache.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::{ProbeError, Result};
use crate::version::{BaseVersion, Version};

use super::lock::TableLock;
use super::row::CacheRow;
use super::table::{CacheTable, Lookup};

/// Extension of availability tables.
const TABLE_EXTENSION: &str = "csv";

/// Summary of one stored family, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct FamilySummary {
    pub base: BaseVersion,
    pub path: PathBuf,
    pub rows: usize,
    pub versions: usize,
    pub last_checked: Option<Version>,
    pub size_bytes: u64,
    pub modified: Option<DateTime<Local>>,
}

/// Store of past probe results, one CSV table per version family.
///
/// The handle is cheap to clone; every operation goes back to disk.
#[derive(Debug, Clone)]
pub struct AvailabilityCache {
    root: PathBuf,
}

impl AvailabilityCache {
    /// Create a cache rooted at `root`. Nothing is created until the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the table for a family.
    pub fn table_path(&self, base: BaseVersion) -> PathBuf {
        self.root.join(format!("{}.{}", base, TABLE_EXTENSION))
    }

    fn lock_path(&self, base: BaseVersion) -> PathBuf {
        self.root.join(format!("{}.{}.lock", base, TABLE_EXTENSION))
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| ProbeError::cache_io(&self.root, e))
    }

    /// Load a family's table, repairing it on disk if needed.
    pub fn open(&self, base: BaseVersion) -> Result<CacheTable> {
        let path = self.table_path(base);
        if !path.exists() {
            return Ok(CacheTable::empty(path, base));
        }

        let _lock = TableLock::acquire(&self.lock_path(base))?;
        let (table, repaired) = CacheTable::read(&path, base)?;
        if repaired {
            tracing::warn!("Repaired corrupt cache table {}", path.display());
            table.save()?;
        }
        Ok(table)
    }

    /// Run a read-modify-write cycle on one family under its lock.
    fn modify<T>(&self, base: BaseVersion, f: impl FnOnce(&mut CacheTable) -> T) -> Result<T> {
        self.ensure_dir()?;
        let _lock = TableLock::acquire(&self.lock_path(base))?;

        let path = self.table_path(base);
        let (mut table, _) = CacheTable::read(&path, base)?;
        let out = f(&mut table);
        table.save()?;
        Ok(out)
    }

    /// Insert rows whose key is not yet recorded. Existing rows win.
    ///
    /// Returns the number of rows actually inserted.
    pub fn write(&self, rows: &[CacheRow]) -> Result<usize> {
        let mut inserted = 0;
        for (base, rows) in group_by_family(rows) {
            let n = self.modify(base, |table| table.insert_missing(rows))?;
            tracing::debug!("Cached {} new rows for {}", n, base);
            inserted += n;
        }
        Ok(inserted)
    }

    /// Insert or replace rows by key.
    pub fn update(&self, rows: &[CacheRow]) -> Result<usize> {
        let mut written = 0;
        for (base, rows) in group_by_family(rows) {
            let n = self.modify(base, |table| table.upsert(rows))?;
            tracing::debug!("Updated {} rows for {}", n, base);
            written += n;
        }
        Ok(written)
    }

    pub fn lookup(
        &self,
        version: &Version,
        name: Option<&str>,
        category: Option<&str>,
    ) -> Result<Lookup> {
        Ok(self.open(version.base())?.lookup(version, name, category))
    }

    pub fn last_version_with_status(
        &self,
        base: BaseVersion,
        name: Option<&str>,
        category: Option<&str>,
        require_all: bool,
    ) -> Result<Option<Version>> {
        Ok(self
            .open(base)?
            .last_version_with_status(name, category, require_all))
    }

    pub fn latest_versions(&self, base: BaseVersion, count: usize) -> Result<Vec<Version>> {
        Ok(self.open(base)?.latest_versions(count))
    }

    pub fn last_checked_version(&self, base: BaseVersion) -> Result<Option<Version>> {
        Ok(self.open(base)?.last_checked_version())
    }

    pub fn versions(&self, base: BaseVersion) -> Result<Vec<Version>> {
        Ok(self.open(base)?.versions())
    }

    /// Families with a table on disk, ascending.
    ///
    /// Files whose stem is not a `major.minor.patch` family are ignored.
    pub fn families(&self) -> Result<Vec<BaseVersion>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut families = Vec::new();
        let entries = fs::read_dir(&self.root).map_err(|e| ProbeError::cache_io(&self.root, e))?;
        for entry in entries {
            let path = entry.map_err(|e| ProbeError::cache_io(&self.root, e))?.path();
            if path.extension().is_none_or(|e| e != TABLE_EXTENSION) {
                continue;
            }
            if let Some(base) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<BaseVersion>().ok())
            {
                families.push(base);
            }
        }

        families.sort();
        Ok(families)
    }

    /// Describe one stored family.
    pub fn summary(&self, base: BaseVersion) -> Result<FamilySummary> {
        let table = self.open(base)?;
        let path = self.table_path(base);
        let metadata = fs::metadata(&path).ok();

        Ok(FamilySummary {
            base,
            rows: table.len(),
            versions: table.versions().len(),
            last_checked: table.last_checked_version(),
            size_bytes: metadata.as_ref().map(|m| m.len()).unwrap_or(0),
            modified: metadata
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Local>::from),
            path,
        })
    }

    /// Remove one family's table, or every table when `base` is `None`.
    ///
    /// Returns the number of tables removed.
    pub fn clear(&self, base: Option<BaseVersion>) -> Result<usize> {
        let targets = match base {
            Some(base) => vec![base],
            None => self.families()?,
        };

        let mut removed = 0;
        for base in targets {
            let path = self.table_path(base);
            if path.exists() {
                fs::remove_file(&path).map_err(|e| ProbeError::cache_io(&path, e))?;
                removed += 1;
            }
            let lock = self.lock_path(base);
            if lock.exists() {
                let _ = fs::remove_file(&lock);
            }
        }
        Ok(removed)
    }
}

fn group_by_family(rows: &[CacheRow]) -> BTreeMap<BaseVersion, Vec<&CacheRow>> {
    let mut groups: BTreeMap<BaseVersion, Vec<&CacheRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.version.base()).or_default().push(row);
    }
    groups
}
