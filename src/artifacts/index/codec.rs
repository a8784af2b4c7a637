//! Binary encoding of the staging list
//!
//! Decoding fails closed: any structural violation aborts the whole read and
//! no partially decoded list is ever returned.

use crate::artifacts::index::checksum::{self, Checksum};
use crate::artifacts::index::index_entry::{ENTRY_FIXED_SIZE, IndexEntry, entry_size};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{CHECKSUM_SIZE, HEADER_SIZE};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::errors::{Error, Result};
use bytes::Bytes;

/// Header, entries in list order, trailing checksum
pub fn encode(entries: &[IndexEntry]) -> Result<Bytes> {
    let entries_count = u32::try_from(entries.len())
        .map_err(|_| Error::malformed(format!("too many index entries: {}", entries.len())))?;

    let mut writer = Checksum::new(Vec::new());
    write(&mut writer, &IndexHeader::for_entries(entries_count).serialize()?)?;

    for entry in entries {
        if entry.name.as_bytes().contains(&0) {
            return Err(Error::malformed(format!(
                "entry path contains a NUL byte: {:?}",
                entry.name
            )));
        }
        write(&mut writer, &entry.serialize()?)?;
    }

    writer
        .write_checksum()
        .map(Bytes::from)
        .map_err(|e| Error::malformed(format!("unable to write index checksum: {e}")))
}

fn write(writer: &mut Checksum<Vec<u8>>, data: &[u8]) -> Result<()> {
    writer
        .write(data)
        .map_err(|e| Error::malformed(format!("unable to write index data: {e}")))
}

pub fn decode(data: &[u8]) -> Result<Vec<IndexEntry>> {
    if data.len() < HEADER_SIZE + CHECKSUM_SIZE {
        return Err(Error::TruncatedIndex(format!(
            "index is {} bytes, expected at least {}",
            data.len(),
            HEADER_SIZE + CHECKSUM_SIZE
        )));
    }

    let content = checksum::verify(data)?;

    let header = IndexHeader::deserialize(&content[..HEADER_SIZE])?;
    header.validate()?;

    let body = &content[HEADER_SIZE..];
    let mut offset = 0;
    let mut entries = Vec::with_capacity(header.entries_count.min(1024) as usize);

    for position in 0..header.entries_count {
        let remaining = &body[offset..];
        if remaining.len() < ENTRY_FIXED_SIZE {
            return Err(truncated(position, header.entries_count));
        }

        let name_len = remaining[ENTRY_FIXED_SIZE..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| truncated(position, header.entries_count))?;
        let stride = entry_size(name_len);
        if remaining.len() < stride {
            return Err(truncated(position, header.entries_count));
        }

        entries.push(IndexEntry::deserialize(&remaining[..stride])?);
        offset += stride;
    }

    // anything between the last entry and the checksum is extension data,
    // which is not interpreted
    if offset < body.len() {
        tracing::trace!(bytes = body.len() - offset, "ignoring index extension data");
    }

    Ok(entries)
}

fn truncated(position: u32, entries_count: u32) -> Error {
    Error::TruncatedIndex(format!(
        "entry {} of {entries_count} runs past the end of the index",
        position + 1
    ))
}
