//! In-memory view of one availability table.
//!
//! A [`CacheTable`] holds every row recorded for one version family and
//! answers the point and range queries the scanner and CLI need. Disk I/O
//! lives here too, but locking is the caller's job (see
//! [`AvailabilityCache`](super::AvailabilityCache)).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ProbeError, Result};
use crate::probe::Existence;
use crate::version::{BaseVersion, Version};

use super::row::{CacheRow, COLUMNS};

/// Answer to a point query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// At least one matching row exists.
    Recorded(Existence),
    /// Nothing matching has been recorded.
    NotRecorded,
}

impl Lookup {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Recorded(e) => e.label(),
            Self::NotRecorded => "not recorded",
        }
    }
}

/// All rows for one version family.
#[derive(Debug, Clone)]
pub struct CacheTable {
    path: PathBuf,
    base: BaseVersion,
    rows: Vec<CacheRow>,
}

impl CacheTable {
    /// An empty table that will be stored at `path`.
    pub fn empty(path: impl Into<PathBuf>, base: BaseVersion) -> Self {
        Self {
            path: path.into(),
            base,
            rows: Vec::new(),
        }
    }

    /// Read a table from disk.
    ///
    /// A missing file yields an empty table. The boolean is `true` when the
    /// on-disk content needed repair (corrupt trailing row or missing
    /// header) and should be rewritten.
    pub fn read(path: &Path, base: BaseVersion) -> Result<(Self, bool)> {
        let raw = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok((Self::empty(path, base), false));
            }
            Err(e) => return Err(ProbeError::cache_io(path, e)),
        };
        // Non-UTF-8 bytes become U+FFFD, which the trailing-row check treats as corrupt.
        let text = String::from_utf8_lossy(&raw);
        let (content, repaired) = heal(&text);

        let mut table = Self::empty(path, base);
        if content.is_empty() {
            return Ok((table, repaired));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers().map_err(|e| format_error(path, e))?;
        if headers.iter().ne(COLUMNS.iter().copied()) {
            return Err(ProbeError::CacheFormat {
                path: path.to_path_buf(),
                message: format!(
                    "unexpected header '{}', expected '{}'",
                    headers.iter().collect::<Vec<_>>().join(","),
                    COLUMNS.join(",")
                ),
            });
        }

        for record in reader.deserialize::<CacheRow>() {
            table.rows.push(record.map_err(|e| format_error(path, e))?);
        }

        Ok((table, repaired))
    }

    /// Write the table, header first, replacing the file atomically.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ProbeError::cache_io(parent, e))?;
        }

        let tmp = self.path.with_extension("csv.tmp");
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&tmp)
            .map_err(|e| format_error(&tmp, e))?;
        writer
            .write_record(COLUMNS)
            .map_err(|e| format_error(&tmp, e))?;
        for row in &self.rows {
            writer.serialize(row).map_err(|e| format_error(&tmp, e))?;
        }
        writer.flush().map_err(|e| ProbeError::cache_io(&tmp, e))?;
        drop(writer);

        fs::rename(&tmp, &self.path).map_err(|e| ProbeError::cache_io(&self.path, e))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base(&self) -> BaseVersion {
        self.base
    }

    pub fn rows(&self) -> &[CacheRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn position(&self, row: &CacheRow) -> Option<usize> {
        self.rows.iter().position(|r| r.key() == row.key())
    }

    /// Append rows whose key is new; existing keys are left untouched.
    ///
    /// Returns the number of rows inserted.
    pub fn insert_missing<'a>(&mut self, rows: impl IntoIterator<Item = &'a CacheRow>) -> usize {
        let mut inserted = 0;
        for row in rows {
            if self.position(row).is_none() {
                self.rows.push(row.clone());
                inserted += 1;
            }
        }
        inserted
    }

    /// Overwrite rows with a matching key, append the rest.
    ///
    /// Returns the number of rows written.
    pub fn upsert<'a>(&mut self, rows: impl IntoIterator<Item = &'a CacheRow>) -> usize {
        let mut written = 0;
        for row in rows {
            match self.position(row) {
                Some(i) => self.rows[i] = row.clone(),
                None => self.rows.push(row.clone()),
            }
            written += 1;
        }
        written
    }

    /// Whether any row was recorded for `version`.
    pub fn contains_version(&self, version: &Version) -> bool {
        self.rows.iter().any(|r| r.version == *version)
    }

    /// Recorded outcome for a version, optionally narrowed to one package.
    ///
    /// Several matching rows are folded together: any `false` wins, then
    /// all-`true` is `true`, anything else is unknown.
    pub fn lookup(&self, version: &Version, name: Option<&str>, category: Option<&str>) -> Lookup {
        let mut matched = self
            .rows
            .iter()
            .filter(|r| r.version == *version && r.matches(name, category))
            .map(CacheRow::existence)
            .peekable();

        if matched.peek().is_none() {
            return Lookup::NotRecorded;
        }

        let states: Vec<Existence> = matched.collect();
        if states.contains(&Existence::Missing) {
            Lookup::Recorded(Existence::Missing)
        } else if states.iter().all(|e| e.is_found()) {
            Lookup::Recorded(Existence::Found)
        } else {
            Lookup::Recorded(Existence::Unknown)
        }
    }

    /// Newest version whose matching rows report availability.
    ///
    /// With `require_all`, no matching row may be `false`; otherwise a
    /// single `true` suffices. Unknown rows neither confirm nor deny, but a
    /// version always needs at least one `true` row.
    pub fn last_version_with_status(
        &self,
        name: Option<&str>,
        category: Option<&str>,
        require_all: bool,
    ) -> Option<Version> {
        let mut by_version: BTreeMap<Version, (bool, bool)> = BTreeMap::new();
        for row in self.rows.iter().filter(|r| r.matches(name, category)) {
            let (any_found, any_missing) = by_version.entry(row.version).or_default();
            match row.existence() {
                Existence::Found => *any_found = true,
                Existence::Missing => *any_missing = true,
                Existence::Unknown => {}
            }
        }

        by_version
            .into_iter()
            .rev()
            .find(|(_, (any_found, any_missing))| *any_found && !(require_all && *any_missing))
            .map(|(version, _)| version)
    }

    /// Distinct recorded versions, ascending.
    pub fn versions(&self) -> Vec<Version> {
        let mut versions: Vec<Version> = self.rows.iter().map(|r| r.version).collect();
        versions.sort();
        versions.dedup();
        versions
    }

    /// The `count` newest recorded versions, newest first.
    pub fn latest_versions(&self, count: usize) -> Vec<Version> {
        self.versions().into_iter().rev().take(count).collect()
    }

    /// Version of the highest build recorded, whatever its outcome.
    pub fn last_checked_version(&self) -> Option<Version> {
        self.rows.iter().map(|r| r.version).max()
    }
}

fn format_error(path: &Path, err: csv::Error) -> ProbeError {
    ProbeError::CacheFormat {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Drop a corrupt trailing row and report whether anything changed.
///
/// A row is corrupt when every field is blank or when it contains
/// non-ASCII characters. An empty file has lost its header and is also
/// reported as repaired.
fn heal(text: &str) -> (String, bool) {
    let mut lines: Vec<&str> = text.lines().collect();
    if lines.iter().all(|l| l.trim().is_empty()) {
        return (String::new(), true);
    }

    let mut repaired = false;
    if lines.len() > 1 && lines.last().is_some_and(|l| is_corrupt(l)) {
        lines.pop();
        repaired = true;
    }

    let mut content = lines.join("\n");
    content.push('\n');
    (content, repaired)
}

fn is_corrupt(line: &str) -> bool {
    !line.is_ascii() || line.split(',').all(|field| field.trim().is_empty())
}
