use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::errors::{Error, Result};
use byteorder::{ByteOrder, NetworkEndian, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexHeader {
    pub(crate) marker: [u8; 4],
    pub(crate) version: u32,
    pub(crate) entries_count: u32,
}

impl IndexHeader {
    pub(crate) fn for_entries(entries_count: u32) -> Self {
        IndexHeader {
            marker: *SIGNATURE,
            version: VERSION,
            entries_count,
        }
    }

    /// Reject anything but a version 2 `DIRC` header
    pub(crate) fn validate(&self) -> Result<()> {
        if &self.marker != SIGNATURE {
            return Err(Error::BadSignature(self.marker.to_vec()));
        }

        if self.version != VERSION {
            return Err(Error::UnsupportedVersion(self.version));
        }

        Ok(())
    }
}

impl Packable for IndexHeader {
    fn serialize(&self) -> Result<Bytes> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes
            .write_all(&self.marker)
            .and_then(|_| bytes.write_u32::<NetworkEndian>(self.version))
            .and_then(|_| bytes.write_u32::<NetworkEndian>(self.entries_count))
            .map_err(|e| Error::malformed(format!("unable to pack index header: {e}")))?;

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for IndexHeader {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let mut bytes = [0u8; HEADER_SIZE];
        reader
            .read_exact(&mut bytes)
            .map_err(|_| Error::TruncatedIndex("index header is shorter than 12 bytes".into()))?;

        let mut marker = [0u8; 4];
        marker.copy_from_slice(&bytes[0..4]);
        let version = NetworkEndian::read_u32(&bytes[4..8]);
        let entries_count = NetworkEndian::read_u32(&bytes[8..12]);

        Ok(IndexHeader {
            marker,
            version,
            entries_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn packs_signature_version_and_count() {
        let bytes = IndexHeader::for_entries(3).serialize().unwrap();
        assert_eq!(bytes.as_ref(), b"DIRC\x00\x00\x00\x02\x00\x00\x00\x03");

        let header = IndexHeader::deserialize(bytes.as_ref()).unwrap();
        assert_eq!(header, IndexHeader::for_entries(3));
        assert!(header.validate().is_ok());
    }

    #[test]
    fn rejects_wrong_signature() {
        let header = IndexHeader::new(*b"DIRX", VERSION, 0);
        assert!(matches!(header.validate(), Err(Error::BadSignature(s)) if s == b"DIRX"));
    }

    #[test]
    fn rejects_other_versions() {
        let header = IndexHeader::new(*SIGNATURE, 3, 0);
        assert!(matches!(header.validate(), Err(Error::UnsupportedVersion(3))));
    }
}
