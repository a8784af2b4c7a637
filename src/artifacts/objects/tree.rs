//! Tree object
//!
//! Trees represent one directory level. Each entry names a child object by
//! digest; subdirectory content is only referenced, never inlined.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<octal mode> <name>\0<20-byte-sha1>`
//!
//! Entries are serialized in the order they are held. Trees built from the
//! index are sorted by raw path bytes first.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

/// A single `mode path -> oid` record
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub mode: EntryMode,
    #[new(into)]
    pub path: String,
    pub oid: ObjectId,
}

impl TreeEntry {
    pub fn object_type(&self) -> ObjectType {
        match self.mode {
            EntryMode::Directory => ObjectType::Tree,
            EntryMode::Gitlink => ObjectType::Commit,
            EntryMode::File(_) | EntryMode::Symlink => ObjectType::Blob,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Tree { entries }
    }

    /// Build a single-level tree from staged entries
    ///
    /// Mode and object id are copied verbatim; entries are ordered by raw
    /// path bytes so that the same staging list always yields the same tree.
    pub fn build<'e>(entries: impl IntoIterator<Item = &'e IndexEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| {
                TreeEntry::new(
                    entry.metadata.mode,
                    entry.name.clone(),
                    entry.oid.clone(),
                )
            })
            .collect();

        Tree::new(entries).sorted()
    }

    /// Canonical order: lexicographic by raw path bytes
    pub fn sorted(mut self) -> Self {
        self.entries
            .sort_by(|a, b| a.path.as_bytes().cmp(b.path.as_bytes()));
        self
    }

    pub fn entries(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> impl Iterator<Item = TreeEntry> {
        self.entries.into_iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> Result<Bytes> {
        let mut content_bytes = Vec::new();

        for entry in &self.entries {
            let header = format!("{:o} {}", entry.mode.as_u32(), entry.path);
            content_bytes
                .write_all(header.as_bytes())
                .and_then(|_| content_bytes.write_all(&[0]))
                .and_then(|_| entry.oid.write_h40_to(&mut content_bytes))
                .map_err(|e| Error::malformed(format!("unable to write tree entry: {e}")))?;
        }

        Ok(Bytes::from(content_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let mut entries = Vec::new();

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            // Read "mode " (space-delimited)
            let n = read_until(&mut reader, b' ', &mut mode_bytes)?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if mode_bytes.pop() != Some(b' ') {
                return Err(Error::malformed("unexpected EOF in tree entry mode"));
            }

            let mode_str = std::str::from_utf8(&mode_bytes)
                .map_err(|_| Error::malformed("tree entry mode is not valid UTF-8"))?;
            let mode = EntryMode::from_octal_str(mode_str)?;

            // Read "name\0"
            name_bytes.clear();
            read_until(&mut reader, b'\0', &mut name_bytes)?;
            if name_bytes.pop() != Some(b'\0') {
                return Err(Error::malformed("unexpected EOF in tree entry name"));
            }
            let name = String::from_utf8(name_bytes.clone())
                .map_err(|_| Error::malformed("tree entry name is not valid UTF-8"))?;

            let oid = ObjectId::read_h40_from(&mut reader)?;

            entries.push(TreeEntry::new(mode, name, oid));
        }

        Ok(Tree { entries })
    }
}

fn read_until(reader: &mut impl BufRead, delimiter: u8, buffer: &mut Vec<u8>) -> Result<usize> {
    reader
        .read_until(delimiter, buffer)
        .map_err(|e| Error::malformed(format!("unable to read tree payload: {e}")))
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                format!(
                    "{} {} {}\t{}",
                    entry.mode,
                    entry.object_type(),
                    entry.oid,
                    entry.path
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}
