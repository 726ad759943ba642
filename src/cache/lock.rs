//! Advisory lock guarding a table's read-merge-write cycle.
//!
//! The lock lives in a sibling `<table>.lock` file so the table itself can
//! be replaced by rename while the lock is held.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{ProbeError, Result};

/// Exclusive lock held until dropped.
#[derive(Debug)]
pub struct TableLock {
    file: File,
    path: PathBuf,
}

impl TableLock {
    /// Block until the exclusive lock on `path` is acquired.
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|e| ProbeError::cache_io(path, e))?;

        file.lock_exclusive()
            .map_err(|e| ProbeError::cache_io(path, e))?;
        tracing::trace!("Acquired cache lock {}", path.display());

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TableLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
