//! Trailing SHA-1 over the whole index file

use crate::artifacts::index::CHECKSUM_SIZE;
use crate::errors::{Error, Result};
use sha1::{Digest, Sha1};
use std::io::Write;

/// Writer that hashes every byte passing through it
#[derive(Debug)]
pub struct Checksum<W: Write> {
    writer: W,
    digest: Sha1,
}

impl<W: Write> Checksum<W> {
    pub fn new(writer: W) -> Self {
        Checksum {
            writer,
            digest: Sha1::new(),
        }
    }

    pub fn write(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.writer.write_all(data)?;
        self.digest.update(data);
        Ok(())
    }

    /// Append the digest of everything written so far and hand back the writer
    pub fn write_checksum(mut self) -> std::io::Result<W> {
        let checksum = self.digest.finalize();
        self.writer.write_all(checksum.as_slice())?;

        Ok(self.writer)
    }
}

/// Split off the trailing checksum and verify it against the preceding bytes
///
/// Returns the verified content without its checksum.
pub fn verify(data: &[u8]) -> Result<&[u8]> {
    if data.len() < CHECKSUM_SIZE {
        return Err(Error::TruncatedIndex(format!(
            "{} bytes cannot hold a checksum",
            data.len()
        )));
    }

    let (content, expected_checksum) = data.split_at(data.len() - CHECKSUM_SIZE);
    let actual_checksum = Sha1::digest(content);

    if expected_checksum != actual_checksum.as_slice() {
        return Err(Error::ChecksumMismatch);
    }

    Ok(content)
}
