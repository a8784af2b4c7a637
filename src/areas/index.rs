//! Staging list persistence
//!
//! The index file holds the ordered list of staged entries in the binary
//! format implemented by [`crate::artifacts::index::codec`]. Reads take a
//! shared lock on the file; writes go through `index.lock` under an
//! exclusive lock and replace the index with a rename, so readers only
//! ever observe a complete file.

use crate::artifacts::index::codec;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::errors::{Error, Result};
use file_guard::Lock;
use std::io::{Read, Write};
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

const LOCK_SUFFIX: &str = "lock";

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.git/index`)
    path: Box<Path>,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension(LOCK_SUFFIX)
    }

    /// Read the staging list
    ///
    /// A missing or empty index file is an empty list. Any corruption aborts
    /// the read without returning a partial list.
    pub fn load(&self) -> Result<Vec<IndexEntry>> {
        let mut index_file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no index file, staging list is empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(Error::io(&*self.path, e)),
        };

        let mut lock = file_guard::lock(&mut index_file, Lock::Shared, 0, 1)
            .map_err(|e| Error::io(&*self.path, e))?;

        let mut data = Vec::new();
        lock.deref_mut()
            .read_to_end(&mut data)
            .map_err(|e| Error::io(&*self.path, e))?;

        if data.is_empty() {
            return Ok(Vec::new());
        }

        let entries = codec::decode(&data)?;
        tracing::debug!(entries = entries.len(), "index loaded");

        Ok(entries)
    }

    /// Replace the staging list on disk
    ///
    /// The encoded list is written to `index.lock`, flushed and renamed over
    /// the index. A failed encode leaves the existing index untouched, and an
    /// `index.lock` held by another writer fails the save.
    pub fn save(&self, entries: &[IndexEntry]) -> Result<()> {
        let data = codec::encode(entries)?;
        let lock_path = self.lock_path();

        let mut lock_file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .map_err(|e| Error::io(&lock_path, e))?;

        let result = Self::write_locked(&mut lock_file, &lock_path, &data).and_then(|_| {
            std::fs::rename(&lock_path, &self.path).map_err(|e| Error::io(&*self.path, e))
        });

        if result.is_err() {
            let _ = std::fs::remove_file(&lock_path);
        } else {
            tracing::debug!(entries = entries.len(), bytes = data.len(), "index saved");
        }

        result
    }

    fn write_locked(file: &mut std::fs::File, path: &Path, data: &[u8]) -> Result<()> {
        let mut lock =
            file_guard::lock(file, Lock::Exclusive, 0, 1).map_err(|e| Error::io(path, e))?;

        lock.deref_mut()
            .write_all(data)
            .map_err(|e| Error::io(path, e))?;
        lock.deref_mut().sync_all().map_err(|e| Error::io(path, e))
    }
}
