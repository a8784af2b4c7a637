//! HEAD and branch tips
//!
//! `HEAD` normally holds `ref: refs/heads/<branch>`; the branch file holds
//! the 40-hex id of the latest commit. A `HEAD` holding an id directly is
//! treated as detached and updated in place.

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Branch HEAD points at in a fresh repository
pub const DEFAULT_BRANCH: &str = "master";

/// Symbolic reference links are followed at most this deep
const MAX_SYMREF_DEPTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
enum SymRefOrOid {
    SymRef(String),
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read(path: &Path) -> Result<Option<SymRefOrOid>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(path, e)),
        };
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_regex = regex::Regex::new(SYMREF_REGEX)
            .map_err(|e| Error::malformed(format!("invalid symref pattern: {e}")))?;

        match symref_regex.captures(content) {
            Some(symref_match) => Ok(Some(SymRefOrOid::SymRef(symref_match[1].to_string()))),
            None => Ok(Some(SymRefOrOid::Oid(ObjectId::try_parse(content.to_string())?))),
        }
    }
}

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the control directory (typically `.git`)
    path: Box<Path>,
}

impl Refs {
    pub fn head_path(&self) -> PathBuf {
        self.path.join(HEAD_REF_NAME)
    }

    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.refs_path().join("heads")
    }

    /// Point HEAD at `branch` unless HEAD already exists
    pub fn init_head(&self, branch: &str) -> Result<()> {
        let head_path = self.head_path();
        if head_path.exists() {
            tracing::debug!(path = %head_path.display(), "HEAD already present");
            return Ok(());
        }

        self.write_ref_file(&head_path, &format!("ref: refs/heads/{branch}\n"))
    }

    /// Name of the reference a commit on HEAD would advance
    ///
    /// `refs/heads/<branch>` when HEAD is symbolic, `HEAD` when detached.
    pub fn current_ref(&self) -> Result<String> {
        let mut current = HEAD_REF_NAME.to_string();

        for _ in 0..MAX_SYMREF_DEPTH {
            match SymRefOrOid::read(&self.path.join(&current))? {
                Some(SymRefOrOid::SymRef(target)) => current = target,
                Some(SymRefOrOid::Oid(_)) | None => return Ok(current),
            }
        }

        Err(Error::malformed(format!("symbolic reference chain too deep at {current}")))
    }

    /// Commit id HEAD resolves to, `None` on an unborn branch
    pub fn read_head(&self) -> Result<Option<ObjectId>> {
        let current = self.current_ref()?;

        match SymRefOrOid::read(&self.path.join(&current))? {
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            Some(SymRefOrOid::SymRef(_)) | None => Ok(None),
        }
    }

    /// Move whatever HEAD resolves to onto `oid`
    pub fn update_head(&self, oid: &ObjectId) -> Result<()> {
        let current = self.current_ref()?;
        tracing::debug!(reference = %current, oid = %oid, "updating reference");

        self.write_ref_file(&self.path.join(current), &format!("{oid}\n"))
    }

    /// Replace a ref file through `<name>.lock` and a rename
    fn write_ref_file(&self, path: &Path, content: &str) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::malformed(format!("invalid ref path {}", path.display())))?;
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;

        let lock_path = path.with_extension("lock");
        let mut lock_file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .map_err(|e| Error::io(&lock_path, e))?;

        let result = file_guard::lock(&mut lock_file, Lock::Exclusive, 0, 1)
            .and_then(|mut lock| {
                lock.deref_mut().write_all(content.as_bytes())?;
                lock.deref_mut().sync_all()
            })
            .map_err(|e| Error::io(&lock_path, e))
            .and_then(|_| std::fs::rename(&lock_path, path).map_err(|e| Error::io(path, e)));

        if result.is_err() {
            let _ = std::fs::remove_file(&lock_path);
        }

        result
    }
}
