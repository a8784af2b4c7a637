//! Index entry representation
//!
//! Each entry in the index represents a tracked file with:
//! - File path
//! - Content hash (object ID)
//! - File metadata (mode, size, timestamps, device and inode numbers)
//!
//! ## Entry Format
//!
//! ```text
//! ctime secs, ctime nsecs, mtime secs, mtime nsecs   4 x u32
//! dev, ino, mode, uid, gid, size                     6 x u32
//! object id                                          20 raw bytes
//! flags                                              u16
//! path, then 1-8 NUL bytes up to the next multiple of 8
//! ```
//!
//! All integers are big-endian.

use crate::artifacts::index::entry_flags::EntryFlags;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use byteorder::{ByteOrder, NetworkEndian, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Size of the fixed fields preceding the path
pub const ENTRY_FIXED_SIZE: usize = 62;

/// Minimum size of an index entry in bytes (one-byte path, padded)
pub const ENTRY_MIN_SIZE: usize = 64;

/// Total on-disk size of an entry whose path is `path_len` bytes long
///
/// The smallest multiple of 8 that leaves room for at least one NUL.
pub fn entry_size(path_len: usize) -> usize {
    (ENTRY_FIXED_SIZE + path_len + ENTRY_BLOCK) / ENTRY_BLOCK * ENTRY_BLOCK
}

/// Index entry representing a tracked file
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// File path relative to repository root, `/`-separated
    #[new(into)]
    pub name: String,
    /// SHA-1 hash of file content
    pub oid: ObjectId,
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    /// Recompute the path-length bits of the flags from the current name
    pub fn with_path_flags(mut self) -> Self {
        self.metadata.flags = EntryFlags::for_path(self.name.len(), self.metadata.flags.stage())
            | (self.metadata.flags & (EntryFlags::ASSUME_VALID | EntryFlags::EXTENDED));
        self
    }

    pub fn stage(&self) -> u8 {
        self.metadata.flags.stage()
    }
}

/// File metadata stored in index entries
///
/// Values are stored truncated to 32 bits, the same way the on-disk format
/// holds them, so that an entry read back compares equal to the one written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Change time (seconds since Unix epoch)
    pub ctime: u32,
    /// Change time nanoseconds
    pub ctime_nsec: u32,
    /// Modification time (seconds since Unix epoch)
    pub mtime: u32,
    /// Modification time nanoseconds
    pub mtime_nsec: u32,
    pub dev: u32,
    pub ino: u32,
    pub mode: EntryMode,
    pub uid: u32,
    pub gid: u32,
    /// File size in bytes
    pub size: u32,
    pub flags: EntryFlags,
}

impl Packable for IndexEntry {
    fn serialize(&self) -> Result<Bytes> {
        let mut entry_bytes = Vec::with_capacity(entry_size(self.name.len()));

        self.write_fields(&mut entry_bytes)
            .map_err(|e| Error::malformed(format!("unable to pack entry {}: {e}", self.name)))?;

        // There must be at least one null byte at the end
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }
}

impl IndexEntry {
    fn write_fields(&self, out: &mut Vec<u8>) -> std::io::Result<()> {
        let metadata = &self.metadata;

        out.write_u32::<NetworkEndian>(metadata.ctime)?;
        out.write_u32::<NetworkEndian>(metadata.ctime_nsec)?;
        out.write_u32::<NetworkEndian>(metadata.mtime)?;
        out.write_u32::<NetworkEndian>(metadata.mtime_nsec)?;
        out.write_u32::<NetworkEndian>(metadata.dev)?;
        out.write_u32::<NetworkEndian>(metadata.ino)?;
        out.write_u32::<NetworkEndian>(metadata.mode.as_u32())?;
        out.write_u32::<NetworkEndian>(metadata.uid)?;
        out.write_u32::<NetworkEndian>(metadata.gid)?;
        out.write_u32::<NetworkEndian>(metadata.size)?;
        self.oid.write_h40_to(out)?;
        out.write_u16::<NetworkEndian>(metadata.flags.bits())?;
        out.write_all(self.name.as_bytes())
    }
}

impl Unpackable for IndexEntry {
    /// Expects exactly one entry: fixed fields, path, and its padding
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| Error::TruncatedIndex(format!("unable to read entry: {e}")))?;

        if bytes.len() < ENTRY_MIN_SIZE {
            return Err(Error::TruncatedIndex(format!(
                "entry is {} bytes, expected at least {ENTRY_MIN_SIZE}",
                bytes.len()
            )));
        }

        let ctime = NetworkEndian::read_u32(&bytes[0..4]);
        let ctime_nsec = NetworkEndian::read_u32(&bytes[4..8]);
        let mtime = NetworkEndian::read_u32(&bytes[8..12]);
        let mtime_nsec = NetworkEndian::read_u32(&bytes[12..16]);
        let dev = NetworkEndian::read_u32(&bytes[16..20]);
        let ino = NetworkEndian::read_u32(&bytes[20..24]);
        let mode = EntryMode::try_from(NetworkEndian::read_u32(&bytes[24..28]))?;
        let uid = NetworkEndian::read_u32(&bytes[28..32]);
        let gid = NetworkEndian::read_u32(&bytes[32..36]);
        let size = NetworkEndian::read_u32(&bytes[36..40]);
        let oid = ObjectId::read_h40_from(&mut &bytes[40..60])?;
        let flags = EntryFlags::from_bits_retain(NetworkEndian::read_u16(&bytes[60..62]));

        // Extract the entry name, which is null-terminated
        let name_end = bytes[ENTRY_FIXED_SIZE..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::TruncatedIndex("missing null terminator in entry name".into()))?;
        let name = String::from_utf8(bytes[ENTRY_FIXED_SIZE..ENTRY_FIXED_SIZE + name_end].to_vec())
            .map_err(|_| Error::malformed("invalid UTF-8 in entry name"))?;

        Ok(IndexEntry {
            name,
            oid,
            metadata: EntryMetadata {
                ctime,
                ctime_nsec,
                mtime,
                mtime_nsec,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
                flags,
            },
        })
    }
}
