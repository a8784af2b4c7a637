//! Object identifier (SHA-1 digest)
//!
//! Object IDs are 40-character lowercase hexadecimal strings. They are both the
//! identity of an object and its storage address.
//!
//! ## Storage
//!
//! Objects are stored in `.git/objects/<first-2-chars>/<remaining-38-chars>`

use crate::artifacts::objects::{OBJECT_ID_LENGTH, RAW_OBJECT_ID_LENGTH};
use crate::errors::{Error, Result};
use std::io;
use std::path::PathBuf;

/// Object identifier (SHA-1 digest in hex form)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    ///
    /// Accepts upper or lower case hex; the stored form is always lowercase.
    pub fn try_parse(id: String) -> Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(Error::malformed(format!(
                "invalid object ID length {}: {id:?}",
                id.len()
            )));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::malformed(format!(
                "invalid object ID characters: {id:?}"
            )));
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Build an object ID from a raw 20-byte digest
    pub fn from_raw(raw: &[u8; RAW_OBJECT_ID_LENGTH]) -> Self {
        Self(raw.iter().map(|byte| format!("{byte:02x}")).collect())
    }

    /// Convert back to the raw 20-byte digest
    pub fn to_raw(&self) -> [u8; RAW_OBJECT_ID_LENGTH] {
        let mut raw = [0u8; RAW_OBJECT_ID_LENGTH];
        for (i, byte) in raw.iter_mut().enumerate() {
            // the hex form is validated on construction
            *byte = u8::from_str_radix(&self.0[i * 2..i * 2 + 2], 16).unwrap_or_default();
        }
        raw
    }

    /// Write the object ID in binary format (20 bytes)
    ///
    /// Used when serializing tree entries and index entries.
    pub fn write_h40_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_raw())
    }

    /// Read an object ID from binary format (20 bytes)
    ///
    /// Fails with `Malformed` if fewer than 20 bytes are available.
    pub fn read_h40_from<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut raw = [0u8; RAW_OBJECT_ID_LENGTH];
        reader
            .read_exact(&mut raw)
            .map_err(|_| Error::malformed("unexpected EOF in object id"))?;

        Ok(Self::from_raw(&raw))
    }

    /// Convert to the fan-out path used for object storage
    ///
    /// `abc123...` becomes `ab/c123...`
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First 7 characters of the hash
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
